//! Pairwise netting: every obligation between the viewer and one
//! counterparty collapses into a single signed balance, summed across all
//! source households at once, never per household.

use std::collections::BTreeMap;

use crate::{
    error::{LedgerError, LedgerResult},
    extraction::Obligation,
    types::{Amount, Party},
};

/// One viewer↔counterparty pair after netting.
///
/// Sign convention: `net > 0` means the counterparty owes the viewer,
/// `net < 0` means the viewer owes the counterparty. Fully settled pairs
/// (`net == 0`) are dropped before this struct is ever built.
#[derive(Debug, Clone)]
pub struct CounterpartyNet {
    pub counterparty: Party,
    pub net: Amount,
    /// Obligations where the counterparty is the debtor.
    pub owed_to_viewer: Vec<Obligation>,
    pub owed_to_viewer_total: Amount,
    /// Obligations where the viewer is the debtor.
    pub owed_by_viewer: Vec<Obligation>,
    pub owed_by_viewer_total: Amount,
}

/// Group collected obligations by canonical counterparty and reduce each
/// group to one signed net. Obligations not touching the viewer are
/// skipped; the view is strictly pairwise with the viewer. Sums run in
/// i128 so intermediate totals never wrap; a result outside the amount
/// range is an error, not a silent truncation.
pub fn net_by_counterparty(
    viewer_user_id: &str,
    obligations: Vec<Obligation>,
) -> LedgerResult<Vec<CounterpartyNet>> {
    let mut pairs: BTreeMap<Party, PairAccumulator> = BTreeMap::new();
    for ob in obligations {
        if ob.creditor.is_user(viewer_user_id) {
            let acc = pairs.entry(ob.debtor.clone()).or_default();
            acc.owed_to_viewer_total += i128::from(ob.amount);
            acc.owed_to_viewer.push(ob);
        } else if ob.debtor.is_user(viewer_user_id) {
            let acc = pairs.entry(ob.creditor.clone()).or_default();
            acc.owed_by_viewer_total += i128::from(ob.amount);
            acc.owed_by_viewer.push(ob);
        }
    }

    let mut nets = Vec::new();
    for (counterparty, acc) in pairs {
        let net = acc.owed_to_viewer_total - acc.owed_by_viewer_total;
        if net == 0 {
            continue; // fully settled, no card
        }
        nets.push(CounterpartyNet {
            counterparty,
            net: to_amount(net)?,
            owed_to_viewer_total: to_amount(acc.owed_to_viewer_total)?,
            owed_by_viewer_total: to_amount(acc.owed_by_viewer_total)?,
            owed_to_viewer: acc.owed_to_viewer,
            owed_by_viewer: acc.owed_by_viewer,
        });
    }
    Ok(nets)
}

#[derive(Default)]
struct PairAccumulator {
    owed_to_viewer: Vec<Obligation>,
    owed_to_viewer_total: i128,
    owed_by_viewer: Vec<Obligation>,
    owed_by_viewer_total: i128,
}

fn to_amount(v: i128) -> LedgerResult<Amount> {
    Amount::try_from(v).map_err(|_| LedgerError::BalanceOverflow)
}

#[cfg(test)]
mod tests {
    use super::net_by_counterparty;
    use crate::error::LedgerError;
    use crate::extraction::Obligation;
    use crate::types::Party;

    fn ob(debtor: &str, creditor: &str, amount: i64, movement_id: &str) -> Obligation {
        Obligation {
            debtor: Party::User(debtor.into()),
            creditor: Party::User(creditor.into()),
            amount,
            movement_id: movement_id.into(),
            source_household: "h-1".into(),
        }
    }

    #[test]
    fn opposite_directions_collapse_to_one_signed_net() {
        let nets = net_by_counterparty(
            "alice",
            vec![ob("bob", "alice", 1000, "m-1"), ob("alice", "bob", 300, "m-2")],
        )
        .unwrap();
        assert_eq!(nets.len(), 1, "one counterparty means one pair");
        assert_eq!(nets[0].net, 700);
        assert_eq!(nets[0].owed_to_viewer_total, 1000);
        assert_eq!(nets[0].owed_by_viewer_total, 300);
    }

    #[test]
    fn settled_pair_is_dropped() {
        let nets = net_by_counterparty(
            "alice",
            vec![ob("bob", "alice", 500, "m-1"), ob("alice", "bob", 500, "m-2")],
        )
        .unwrap();
        assert!(nets.is_empty(), "x == y must produce no card");
    }

    #[test]
    fn obligations_between_third_parties_are_ignored() {
        let nets = net_by_counterparty("alice", vec![ob("bob", "carol", 900, "m-1")]).unwrap();
        assert!(nets.is_empty());
    }

    #[test]
    fn ghosts_in_different_households_stay_separate_pairs() {
        let ghost = |h: &str| Party::Ghost {
            household_id: h.into(),
            contact_id: "c-roomie".into(),
        };
        let make = |h: &str, movement: &str| Obligation {
            debtor: ghost(h),
            creditor: Party::User("alice".into()),
            amount: 100,
            movement_id: movement.into(),
            source_household: h.into(),
        };
        let nets =
            net_by_counterparty("alice", vec![make("h-1", "m-1"), make("h-2", "m-2")]).unwrap();
        assert_eq!(nets.len(), 2, "same contact id in two households is two people");
    }

    #[test]
    fn totals_beyond_the_amount_range_error_instead_of_wrapping() {
        let err = net_by_counterparty(
            "alice",
            vec![
                ob("bob", "alice", i64::MAX, "m-1"),
                ob("bob", "alice", i64::MAX, "m-2"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow));
    }
}
