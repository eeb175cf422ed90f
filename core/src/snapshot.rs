//! Per-request read snapshot.
//!
//! Every table feeding one loan view is read exactly once, up front, and
//! all later stages (extraction, netting, presentation) consume this one
//! snapshot. A write landing mid-query can therefore never produce a card
//! whose net disagrees with the entries shown under it.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::{LedgerError, LedgerResult},
    store::{Contact, LedgerStore, Membership, Movement},
    types::{HouseholdId, UserId},
};

/// Everything one household contributes to a loan view.
#[derive(Debug, Clone)]
pub struct HouseholdData {
    pub household_id: HouseholdId,
    pub name: String,
    pub contacts: Vec<Contact>,
    /// SPLIT movements only, participants embedded.
    pub movements: Vec<Movement>,
}

#[derive(Debug)]
pub struct ViewSnapshot {
    pub viewer: UserId,
    /// The viewer's own memberships, earliest joined first.
    pub memberships: Vec<Membership>,
    /// Member households first (join order), then households that link the
    /// viewer as a contact (id order). Each household appears once even
    /// when reached both ways.
    pub households: Vec<HouseholdData>,
    /// Registered account names for every user id the snapshot mentions.
    pub user_names: BTreeMap<UserId, String>,
}

impl ViewSnapshot {
    pub fn load(store: &LedgerStore, viewer: &str) -> LedgerResult<Self> {
        // Unknown viewers fail early; everything past this point degrades.
        let viewer_name =
            store
                .get_display_name(viewer)?
                .ok_or_else(|| LedgerError::ViewerNotFound {
                    user_id: viewer.to_string(),
                })?;

        let memberships = store.memberships_for_user(viewer)?;
        let linking = store.find_households_linking_user(viewer)?;

        let mut ordered: Vec<HouseholdId> = Vec::new();
        let mut seen: BTreeSet<HouseholdId> = BTreeSet::new();
        for m in &memberships {
            if seen.insert(m.household_id.clone()) {
                ordered.push(m.household_id.clone());
            }
        }
        for h in linking {
            if seen.insert(h.clone()) {
                ordered.push(h);
            }
        }

        let mut households = Vec::with_capacity(ordered.len());
        for household_id in ordered {
            let name = match store.household_name(&household_id)? {
                Some(n) => n,
                None => {
                    log::warn!("household {household_id} is referenced but missing, skipping");
                    continue;
                }
            };
            households.push(HouseholdData {
                contacts: store.list_contacts(&household_id)?,
                movements: store.list_split_movements(&household_id)?,
                household_id,
                name,
            });
        }

        // Collect every user id in sight so naming never goes back to the
        // database mid-build.
        let mut user_ids: BTreeSet<UserId> = BTreeSet::new();
        for h in &households {
            for c in &h.contacts {
                if let Some(u) = &c.linked_user_id {
                    user_ids.insert(u.clone());
                }
            }
            for m in &h.movements {
                if let Some(u) = &m.payer_user_id {
                    user_ids.insert(u.clone());
                }
                for p in &m.participants {
                    if let Some(u) = &p.participant_user_id {
                        user_ids.insert(u.clone());
                    }
                }
            }
        }
        let mut user_names = BTreeMap::new();
        user_names.insert(viewer.to_string(), viewer_name);
        for id in user_ids {
            if user_names.contains_key(&id) {
                continue;
            }
            // Ids pointing at no account stay absent; naming falls back to
            // the raw id with a warning at presentation time.
            if let Some(name) = store.get_display_name(&id)? {
                user_names.insert(id, name);
            }
        }

        Ok(Self {
            viewer: viewer.to_string(),
            memberships,
            households,
            user_names,
        })
    }

    /// True when the household is one the viewer belongs to.
    pub fn is_member_household(&self, household_id: &str) -> bool {
        self.memberships
            .iter()
            .any(|m| m.household_id == household_id)
    }

    pub fn household(&self, household_id: &str) -> Option<&HouseholdData> {
        self.households
            .iter()
            .find(|h| h.household_id == household_id)
    }
}
