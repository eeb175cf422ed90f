//! The ledger engine — one call per loan view.
//!
//! PIPELINE (fixed order):
//!   1. Snapshot      — read every relevant table once
//!   2. Identity map  — contact canonicalization + per-viewer naming
//!   3. Collector     — extraction across households, dedup by movement
//!   4. Netting       — one signed balance per counterparty
//!   5. View builder  — cards, direction groups, entries, flags
//!
//! RULES:
//!   - Balances are computed on read, never stored or cached.
//!   - All stages consume the one snapshot taken at step 1.
//!   - Bad rows degrade with a warning; they never fail the whole view.

use crate::{
    collector,
    error::LedgerResult,
    identity::IdentityMap,
    netting,
    snapshot::ViewSnapshot,
    store::LedgerStore,
    view::{self, LoanView},
};

pub struct LedgerEngine {
    pub store: LedgerStore,
}

impl LedgerEngine {
    /// Open (or create) a file-backed ledger and apply migrations.
    pub fn open(path: &str) -> LedgerResult<Self> {
        let store = LedgerStore::open(path)?;
        store.migrate()?;
        Ok(Self { store })
    }

    /// Fresh in-memory ledger (used in tests).
    pub fn in_memory() -> LedgerResult<Self> {
        let store = LedgerStore::in_memory()?;
        store.migrate()?;
        Ok(Self { store })
    }

    /// The viewer's loan view: one card per counterparty with a non-zero
    /// net balance, drawn from the viewer's own households and from every
    /// household where the viewer is a linked contact.
    pub fn loan_view(&self, viewer_user_id: &str) -> LedgerResult<LoanView> {
        let snap = ViewSnapshot::load(&self.store, viewer_user_id)?;
        let identity = IdentityMap::new(&snap);
        let obligations = collector::collect(&identity, &snap);
        log::debug!(
            "viewer {viewer_user_id}: {} obligations from {} households",
            obligations.len(),
            snap.households.len()
        );
        let nets = netting::net_by_counterparty(viewer_user_id, obligations)?;
        Ok(view::build(&snap, &identity, nets))
    }

    /// The loan view serialized to the wire shape consumed by the
    /// presentation layer. With no intervening writes, repeated calls
    /// return byte-identical strings.
    pub fn loan_view_json(&self, viewer_user_id: &str) -> LedgerResult<String> {
        let view = self.loan_view(viewer_user_id)?;
        Ok(serde_json::to_string(&view)?)
    }
}
