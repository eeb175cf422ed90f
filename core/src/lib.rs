//! prestamos-core — the cross-household debt ledger.
//!
//! Households record shared expenses as SPLIT movements; this crate
//! resolves who is who across household boundaries, nets every pairwise
//! debt into one balance per counterparty, and shapes the result for
//! display with per-viewer naming, provenance, and mutability flags.

pub mod collector;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod guard;
pub mod identity;
pub mod netting;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod view;
