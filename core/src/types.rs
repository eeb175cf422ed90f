//! Shared primitive types used across the whole ledger.

/// A stable, unique identifier for a registered account.
pub type UserId = String;
pub type HouseholdId = String;
pub type ContactId = String;
pub type MovementId = String;

/// Money in integral minor currency units. Never floating point.
pub type Amount = i64;

/// One basis point = 1/10000 of a movement's total.
pub const BPS_SCALE: i64 = 10_000;

/// Canonical identity of a person on either side of an obligation.
///
/// A linked contact resolves to `User`, so the same account is one party
/// no matter which household recorded the movement. An unlinked contact
/// is a `Ghost`: it exists only inside its owning household, and ghosts
/// from different households are never the same person unless a link
/// proves otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Party {
    User(UserId),
    Ghost {
        household_id: HouseholdId,
        contact_id: ContactId,
    },
}

impl Party {
    pub fn is_user(&self, user_id: &str) -> bool {
        matches!(self, Party::User(id) if id == user_id)
    }
}

/// Raw person reference as recorded on a movement row, before the
/// recording household's contact book has been consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartyRef {
    User(UserId),
    Contact(ContactId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKind {
    Household,
    Split,
    DebtPayment,
}

impl MovementKind {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            MovementKind::Household => "HOUSEHOLD",
            MovementKind::Split => "SPLIT",
            MovementKind::DebtPayment => "DEBT_PAYMENT",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "HOUSEHOLD" => Some(MovementKind::Household),
            "SPLIT" => Some(MovementKind::Split),
            "DEBT_PAYMENT" => Some(MovementKind::DebtPayment),
            _ => None,
        }
    }
}

/// Membership role within a household. Owners and members may record and
/// mutate movements; viewers are read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Member,
    Viewer,
}

impl Role {
    pub fn can_write(&self) -> bool {
        matches!(self, Role::Owner | Role::Member)
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Member => "member",
            Role::Viewer => "viewer",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Role::Owner),
            "member" => Some(Role::Member),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}
