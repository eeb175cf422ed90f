//! Cross-household collection.
//!
//! A debt recorded in a foreign household is still the viewer's debt. The
//! snapshot already holds the viewer's own households plus every household
//! linking the viewer as a contact; this module unions their extractions
//! and guarantees each movement contributes exactly once.

use std::collections::HashSet;

use crate::{
    extraction::{self, Obligation},
    identity::IdentityMap,
    snapshot::ViewSnapshot,
};

/// Obligations across every snapshotted household, exactly once per
/// movement even if a household were somehow reached through two paths.
pub fn collect(identity: &IdentityMap, snap: &ViewSnapshot) -> Vec<Obligation> {
    dedup_by_movement(
        snap.households
            .iter()
            .map(|h| extraction::extract_household(identity, h)),
    )
}

/// Keep each movement's obligations from the first batch that carries
/// them; later batches re-mentioning the same movement are dropped. A
/// movement's own sibling obligations (one per participant) all survive.
fn dedup_by_movement<I>(batches: I) -> Vec<Obligation>
where
    I: IntoIterator<Item = Vec<Obligation>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for batch in batches {
        let mut fresh: HashSet<String> = HashSet::new();
        for ob in batch {
            if seen.contains(&ob.movement_id) {
                log::debug!("movement {} already collected, dropping duplicate", ob.movement_id);
                continue;
            }
            fresh.insert(ob.movement_id.clone());
            out.push(ob);
        }
        seen.extend(fresh);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::dedup_by_movement;
    use crate::extraction::Obligation;
    use crate::types::Party;

    fn ob(movement_id: &str, amount: i64) -> Obligation {
        Obligation {
            debtor: Party::User("u-debtor".into()),
            creditor: Party::User("u-creditor".into()),
            amount,
            movement_id: movement_id.into(),
            source_household: "h-1".into(),
        }
    }

    #[test]
    fn sibling_obligations_of_one_movement_all_survive() {
        let merged = dedup_by_movement(vec![vec![ob("m-1", 10), ob("m-1", 20)]]);
        assert_eq!(merged.len(), 2, "both participants' obligations must survive");
    }

    #[test]
    fn movement_seen_in_two_batches_is_kept_once() {
        let merged = dedup_by_movement(vec![
            vec![ob("m-1", 10), ob("m-1", 20)],
            vec![ob("m-1", 10), ob("m-2", 5)],
        ]);
        let from_m1 = merged.iter().filter(|o| o.movement_id == "m-1").count();
        assert_eq!(from_m1, 2, "second path's copy of m-1 must be dropped");
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn distinct_movements_pass_through() {
        let merged = dedup_by_movement(vec![vec![ob("m-1", 10)], vec![ob("m-2", 20)]]);
        assert_eq!(merged.len(), 2);
    }
}
