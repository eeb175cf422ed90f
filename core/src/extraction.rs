//! Split extraction: one household's SPLIT movements become pairwise
//! obligations, one per non-payer participant.
//!
//! RULE: a movement with unusable data is omitted with a warning, never a
//! failure. The rest of the view always builds.

use crate::{
    identity::IdentityMap,
    snapshot::HouseholdData,
    store::Movement,
    types::{Amount, HouseholdId, MovementId, Party, BPS_SCALE},
};

/// A directed debt implied by one participant's share of one movement.
/// Derived on read, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Obligation {
    pub debtor: Party,
    pub creditor: Party,
    pub amount: Amount,
    pub movement_id: MovementId,
    pub source_household: HouseholdId,
}

/// Extract the obligations implied by one household's SPLIT movements.
pub fn extract_household(identity: &IdentityMap, household: &HouseholdData) -> Vec<Obligation> {
    let mut out = Vec::new();
    for m in &household.movements {
        extract_movement(identity, household, m, &mut out);
    }
    out
}

fn extract_movement(
    identity: &IdentityMap,
    household: &HouseholdData,
    m: &Movement,
    out: &mut Vec<Obligation>,
) {
    let Some(payer_ref) = m.payer_ref() else {
        log::warn!("movement {} has no usable payer, skipping", m.movement_id);
        return;
    };
    let Some(payer) = identity.canonicalize(&household.household_id, &payer_ref) else {
        return;
    };
    if m.amount_minor < 0 {
        log::warn!("movement {} has a negative amount, skipping", m.movement_id);
        return;
    }
    if m.participants.iter().any(|p| p.share_bps < 0) {
        log::warn!("movement {} has a negative share, skipping", m.movement_id);
        return;
    }
    let total_bps: i64 = m.participants.iter().map(|p| p.share_bps).sum();
    if !(BPS_SCALE - 1..=BPS_SCALE + 1).contains(&total_bps) {
        log::warn!(
            "movement {} shares sum to {total_bps} bps, expected {BPS_SCALE}, skipping",
            m.movement_id
        );
        return;
    }

    let weights: Vec<i64> = m.participants.iter().map(|p| p.share_bps).collect();
    let shares = apportion(m.amount_minor, &weights);

    for (p, share) in m.participants.iter().zip(shares) {
        let Some(r) = p.party_ref() else {
            log::warn!(
                "movement {} participant at position {} has no usable reference, omitting",
                m.movement_id,
                p.position
            );
            continue;
        };
        let Some(party) = identity.canonicalize(&household.household_id, &r) else {
            continue;
        };
        if party == payer {
            // Self-split: the payer's own share never becomes a debt.
            continue;
        }
        out.push(Obligation {
            debtor: party,
            creditor: payer.clone(),
            amount: share,
            movement_id: m.movement_id.clone(),
            source_household: household.household_id.clone(),
        });
    }
}

/// Split `total` minor units across integer `weights` so the pieces sum
/// exactly to `total`. Each piece starts at its floored proportional cut;
/// leftover units go to the largest remainders, earliest position on ties.
fn apportion(total: Amount, weights: &[i64]) -> Vec<Amount> {
    let weight_sum: i64 = weights.iter().sum();
    if weights.is_empty() || weight_sum <= 0 {
        return vec![0; weights.len()];
    }
    let total_w = i128::from(total);
    let sum_w = i128::from(weight_sum);

    let mut pieces: Vec<Amount> = Vec::with_capacity(weights.len());
    let mut remainders: Vec<(i128, usize)> = Vec::with_capacity(weights.len());
    let mut allocated: i128 = 0;
    for (i, w) in weights.iter().enumerate() {
        let exact = total_w * i128::from(*w);
        let base = exact / sum_w;
        pieces.push(base as Amount);
        remainders.push((exact % sum_w, i));
        allocated += base;
    }

    let mut leftover = total_w - allocated;
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, i) in remainders {
        if leftover == 0 {
            break;
        }
        pieces[i] += 1;
        leftover -= 1;
    }
    pieces
}
