//! Presentation tree: counterparty card → direction group → movement entry.
//!
//! Net amounts surface as absolute values with an explicit direction.
//! Entries carry provenance (source household, only when foreign) and the
//! mutability flag, so callers never re-derive either. All ordering is
//! total: two queries with no intervening writes serialize identically.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    extraction::Obligation,
    guard,
    identity::IdentityMap,
    netting::CounterpartyNet,
    snapshot::ViewSnapshot,
    store::Movement,
    types::{Amount, MovementId, Party},
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub cards: Vec<LoanCard>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanCard {
    /// The viewer's own label for the counterparty.
    pub counterparty_name: String,
    /// Absolute value of the net; the direction carries the sign.
    pub net_amount: Amount,
    pub net_direction: Direction,
    /// True iff any contributing movement was recorded outside the
    /// viewer's own households.
    pub is_cross_household: bool,
    pub directions: Vec<DirectionGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    CounterpartyOwesViewer,
    ViewerOwesCounterparty,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionGroup {
    pub direction: Direction,
    /// Gross total of this group alone, independent of the card's net.
    pub subtotal: Amount,
    pub movements: Vec<MovementEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementEntry {
    pub id: MovementId,
    pub description: String,
    pub amount: Amount,
    /// Present only when the movement was recorded outside the viewer's
    /// own households.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_household_name: Option<String>,
    pub mutable: bool,
}

/// Shape netted balances for display. Cards sort by display name (then
/// counterparty identity on name collisions); entries by creation time
/// then movement id.
pub fn build(snap: &ViewSnapshot, identity: &IdentityMap, nets: Vec<CounterpartyNet>) -> LoanView {
    let mut movements: HashMap<&str, &Movement> = HashMap::new();
    for h in &snap.households {
        for m in &h.movements {
            movements.insert(m.movement_id.as_str(), m);
        }
    }

    let mut cards: Vec<(String, Party, LoanCard)> = Vec::with_capacity(nets.len());
    for net in nets {
        let name = identity.display_name(&net.counterparty);
        let is_cross_household = net
            .owed_to_viewer
            .iter()
            .chain(&net.owed_by_viewer)
            .any(|ob| !snap.is_member_household(&ob.source_household));
        let (net_amount, net_direction) = if net.net > 0 {
            (net.net, Direction::CounterpartyOwesViewer)
        } else {
            (-net.net, Direction::ViewerOwesCounterparty)
        };

        // Empty groups are omitted; the card's net is non-zero, so at
        // least one group always remains.
        let mut directions = Vec::new();
        if !net.owed_to_viewer.is_empty() {
            directions.push(direction_group(
                snap,
                &movements,
                Direction::CounterpartyOwesViewer,
                net.owed_to_viewer_total,
                net.owed_to_viewer,
            ));
        }
        if !net.owed_by_viewer.is_empty() {
            directions.push(direction_group(
                snap,
                &movements,
                Direction::ViewerOwesCounterparty,
                net.owed_by_viewer_total,
                net.owed_by_viewer,
            ));
        }

        cards.push((
            name.clone(),
            net.counterparty,
            LoanCard {
                counterparty_name: name,
                net_amount,
                net_direction,
                is_cross_household,
                directions,
            },
        ));
    }

    cards.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    LoanView {
        cards: cards.into_iter().map(|(_, _, card)| card).collect(),
    }
}

fn direction_group(
    snap: &ViewSnapshot,
    movements: &HashMap<&str, &Movement>,
    direction: Direction,
    subtotal: Amount,
    obligations: Vec<Obligation>,
) -> DirectionGroup {
    let mut entries: Vec<(String, MovementId, MovementEntry)> =
        Vec::with_capacity(obligations.len());
    for ob in obligations {
        let Some(m) = movements.get(ob.movement_id.as_str()).copied() else {
            // Obligations are built from this same snapshot, so the lookup
            // cannot miss; omit rather than guess if it ever does.
            log::warn!(
                "movement {} vanished from the snapshot, omitting entry",
                ob.movement_id
            );
            continue;
        };
        let mutable = guard::movement_mutable(&ob.source_household, &snap.memberships);
        let source_household_name = if snap.is_member_household(&ob.source_household) {
            None
        } else {
            snap.household(&ob.source_household).map(|h| h.name.clone())
        };
        entries.push((
            m.created_at.clone(),
            ob.movement_id.clone(),
            MovementEntry {
                id: ob.movement_id,
                description: m.description.clone(),
                amount: ob.amount,
                source_household_name,
                mutable,
            },
        ));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    DirectionGroup {
        direction,
        subtotal,
        movements: entries.into_iter().map(|(_, _, e)| e).collect(),
    }
}
