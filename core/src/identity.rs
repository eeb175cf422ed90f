//! Contact identity resolution and per-viewer naming.
//!
//! Identity and display naming are two separate steps. A person has one
//! global identity, but as many household-local labels as there are
//! contact books mentioning them. Resolution of a raw movement reference
//! to a canonical `Party` happens per recording household; naming happens
//! per viewer, always from the viewer's own contact books.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::{
    snapshot::ViewSnapshot,
    store::Contact,
    types::{Party, PartyRef},
};

pub struct IdentityMap<'a> {
    snap: &'a ViewSnapshot,
    /// (household, contact) -> contact record.
    contacts_by_id: HashMap<(&'a str, &'a str), &'a Contact>,
    /// (household, linked user) -> the contact chosen to represent that
    /// user in that household. When several contacts link to the same user
    /// the most recently created one wins.
    links_by_user: HashMap<(&'a str, &'a str), &'a Contact>,
}

impl<'a> IdentityMap<'a> {
    pub fn new(snap: &'a ViewSnapshot) -> Self {
        let mut contacts_by_id = HashMap::new();
        let mut links_by_user: HashMap<(&str, &str), &Contact> = HashMap::new();
        for h in &snap.households {
            for c in &h.contacts {
                contacts_by_id.insert((h.household_id.as_str(), c.contact_id.as_str()), c);
                let Some(user_id) = &c.linked_user_id else {
                    continue;
                };
                if !c.link_valid {
                    continue;
                }
                match links_by_user.entry((h.household_id.as_str(), user_id.as_str())) {
                    Entry::Vacant(e) => {
                        e.insert(c);
                    }
                    Entry::Occupied(mut e) => {
                        // Duplicate links inside one household are a data
                        // anomaly. Resolve deterministically, never fail.
                        log::warn!(
                            "household {} holds multiple contacts linked to user {user_id}, \
                             keeping the most recently created",
                            h.household_id
                        );
                        let cur = *e.get();
                        let newer = (c.created_at.as_str(), c.contact_id.as_str())
                            > (cur.created_at.as_str(), cur.contact_id.as_str());
                        if newer {
                            e.insert(c);
                        }
                    }
                }
            }
        }
        Self {
            snap,
            contacts_by_id,
            links_by_user,
        }
    }

    /// Resolve a raw movement-side reference into a canonical party, from
    /// the point of view of the recording household. Returns None when the
    /// reference cannot be resolved at all; callers omit that obligation.
    pub fn canonicalize(&self, household_id: &str, r: &PartyRef) -> Option<Party> {
        match r {
            PartyRef::User(u) => Some(Party::User(u.clone())),
            PartyRef::Contact(contact_id) => {
                let contact = match self
                    .contacts_by_id
                    .get(&(household_id, contact_id.as_str()))
                {
                    Some(c) => *c,
                    None => {
                        log::warn!(
                            "household {household_id} movement references missing \
                             contact {contact_id}, omitting"
                        );
                        return None;
                    }
                };
                match &contact.linked_user_id {
                    Some(u) if contact.link_valid => Some(Party::User(u.clone())),
                    Some(u) => {
                        // The linked account no longer exists. The contact
                        // still identifies a real household-local person.
                        log::warn!(
                            "contact {contact_id} links to missing user {u}, \
                             treating as unlinked"
                        );
                        Some(Party::Ghost {
                            household_id: household_id.to_string(),
                            contact_id: contact_id.clone(),
                        })
                    }
                    None => Some(Party::Ghost {
                        household_id: household_id.to_string(),
                        contact_id: contact_id.clone(),
                    }),
                }
            }
        }
    }

    /// The label the viewer's own households use for this party, falling
    /// back to the registered account name. Never a foreign household's
    /// label — except for ghosts, which exist only in their owning
    /// household's book and have no other name anywhere.
    pub fn display_name(&self, party: &Party) -> String {
        match party {
            Party::User(u) => {
                for m in &self.snap.memberships {
                    if let Some(c) = self
                        .links_by_user
                        .get(&(m.household_id.as_str(), u.as_str()))
                    {
                        return c.name.clone();
                    }
                }
                match self.snap.user_names.get(u) {
                    Some(name) => name.clone(),
                    None => {
                        log::warn!("no registered name for user {u}, falling back to the id");
                        u.clone()
                    }
                }
            }
            Party::Ghost {
                household_id,
                contact_id,
            } => {
                match self
                    .contacts_by_id
                    .get(&(household_id.as_str(), contact_id.as_str()))
                {
                    Some(c) => c.name.clone(),
                    None => {
                        log::warn!(
                            "ghost contact {contact_id} missing from household \
                             {household_id}, falling back to the id"
                        );
                        contact_id.clone()
                    }
                }
            }
        }
    }

    /// True when some household of the viewer holds a contact linked to
    /// this user.
    pub fn is_linked_contact(&self, user_id: &str) -> bool {
        self.snap.memberships.iter().any(|m| {
            self.links_by_user
                .contains_key(&(m.household_id.as_str(), user_id))
        })
    }
}
