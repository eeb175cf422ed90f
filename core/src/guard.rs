//! Mutability boundary for movement entries.

use crate::store::Membership;

/// A movement is mutable for the viewer iff it was recorded in a household
/// the viewer belongs to with the write role. Foreign movements are always
/// read-only no matter the viewer's roles elsewhere.
///
/// Recomputed per query from the snapshot's memberships and never cached
/// alongside balances: a role change flips this flag without moving any
/// net. Enforcement against actual writes lives with the movement-mutation
/// layer; this is the single source of the flag.
pub fn movement_mutable(source_household: &str, memberships: &[Membership]) -> bool {
    memberships
        .iter()
        .any(|m| m.household_id == source_household && m.role.can_write())
}

#[cfg(test)]
mod tests {
    use super::movement_mutable;
    use crate::store::Membership;
    use crate::types::Role;

    fn member(household_id: &str, role: Role) -> Membership {
        Membership {
            household_id: household_id.into(),
            user_id: "u-1".into(),
            role,
            joined_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn write_role_at_home_allows_mutation() {
        assert!(movement_mutable("h-1", &[member("h-1", Role::Owner)]));
        assert!(movement_mutable("h-1", &[member("h-1", Role::Member)]));
    }

    #[test]
    fn read_only_role_at_home_denies_mutation() {
        assert!(!movement_mutable("h-1", &[member("h-1", Role::Viewer)]));
    }

    #[test]
    fn foreign_household_is_never_mutable() {
        // Owner of h-1, but the movement lives in h-2.
        assert!(!movement_mutable("h-2", &[member("h-1", Role::Owner)]));
    }

    #[test]
    fn no_memberships_means_nothing_is_mutable() {
        assert!(!movement_mutable("h-1", &[]));
    }
}
