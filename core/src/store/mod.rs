//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Engine modules call store methods — they never execute SQL directly.

mod contact;
mod movement;

use rusqlite::{params, Connection, OptionalExtension};

use crate::{
    error::LedgerResult,
    types::{Amount, ContactId, HouseholdId, MovementId, MovementKind, PartyRef, Role, UserId},
};

pub struct LedgerStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl LedgerStore {
    pub fn open(path: &str) -> LedgerResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> LedgerResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    /// For file-based databases, this opens the same file.
    pub fn reopen(&self) -> LedgerResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> LedgerResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_contacts.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_movements.sql"))?;
        Ok(())
    }

    // ── Users ──────────────────────────────────────────────────

    pub fn insert_user(
        &self,
        user_id: &str,
        name: &str,
        email: &str,
        created_at: &str,
    ) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT INTO users (user_id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, name, email, created_at],
        )?;
        Ok(())
    }

    /// Registered account name, used as the naming fallback when the
    /// viewer's own households hold no contact for this user.
    pub fn get_display_name(&self, user_id: &str) -> LedgerResult<Option<String>> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    // ── Households ─────────────────────────────────────────────

    pub fn insert_household(
        &self,
        household_id: &str,
        name: &str,
        created_at: &str,
    ) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT INTO households (household_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![household_id, name, created_at],
        )?;
        Ok(())
    }

    pub fn household_name(&self, household_id: &str) -> LedgerResult<Option<String>> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM households WHERE household_id = ?1",
                params![household_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    // ── Memberships ────────────────────────────────────────────

    pub fn add_member(
        &self,
        household_id: &str,
        user_id: &str,
        role: Role,
        joined_at: &str,
    ) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT INTO household_members (household_id, user_id, role, joined_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![household_id, user_id, role.as_db_str(), joined_at],
        )?;
        Ok(())
    }

    /// Change an existing member's role (e.g. downgrade to read-only).
    pub fn set_member_role(
        &self,
        household_id: &str,
        user_id: &str,
        role: Role,
    ) -> LedgerResult<()> {
        self.conn.execute(
            "UPDATE household_members SET role = ?1
             WHERE household_id = ?2 AND user_id = ?3",
            params![role.as_db_str(), household_id, user_id],
        )?;
        Ok(())
    }

    /// All households the user belongs to, earliest joined first.
    /// An unrecognized role string degrades to read-only.
    pub fn memberships_for_user(&self, user_id: &str) -> LedgerResult<Vec<Membership>> {
        let mut stmt = self.conn.prepare(
            "SELECT household_id, user_id, role, joined_at
             FROM household_members WHERE user_id = ?1
             ORDER BY joined_at ASC, household_id ASC",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                let role_s: String = row.get(2)?;
                Ok(Membership {
                    household_id: row.get(0)?,
                    user_id: row.get(1)?,
                    role: Role::from_db_str(&role_s).unwrap_or_else(|| {
                        log::warn!("unrecognized role '{role_s}', treating as viewer");
                        Role::Viewer
                    }),
                    joined_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn has_write_role(&self, user_id: &str, household_id: &str) -> LedgerResult<bool> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM household_members
             WHERE household_id = ?1 AND user_id = ?2 AND role IN ('owner', 'member')",
            params![household_id, user_id],
            |row| row.get::<_, i64>(0).map(|c| c > 0),
        )?)
    }
}

#[derive(Debug, Clone)]
pub struct Membership {
    pub household_id: HouseholdId,
    pub user_id: UserId,
    pub role: Role,
    pub joined_at: String,
}

#[derive(Debug, Clone)]
pub struct Contact {
    pub contact_id: ContactId,
    pub household_id: HouseholdId,
    pub name: String,
    pub email: Option<String>,
    pub linked_user_id: Option<UserId>,
    /// True when `linked_user_id` points at an existing users row.
    /// Always false for unlinked contacts.
    pub link_valid: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct Movement {
    pub movement_id: MovementId,
    pub household_id: HouseholdId,
    pub kind: MovementKind,
    pub description: String,
    pub amount_minor: Amount,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub payer_user_id: Option<UserId>,
    pub payer_contact_id: Option<ContactId>,
    pub created_at: String,
    pub participants: Vec<SplitParticipant>,
}

impl Movement {
    /// The payer as recorded, if exactly one of the two payer columns is set.
    pub fn payer_ref(&self) -> Option<PartyRef> {
        match (&self.payer_user_id, &self.payer_contact_id) {
            (Some(u), None) => Some(PartyRef::User(u.clone())),
            (None, Some(c)) => Some(PartyRef::Contact(c.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SplitParticipant {
    pub position: i64,
    pub participant_user_id: Option<UserId>,
    pub participant_contact_id: Option<ContactId>,
    pub share_bps: i64,
}

impl SplitParticipant {
    pub fn party_ref(&self) -> Option<PartyRef> {
        match (&self.participant_user_id, &self.participant_contact_id) {
            (Some(u), None) => Some(PartyRef::User(u.clone())),
            (None, Some(c)) => Some(PartyRef::Contact(c.clone())),
            _ => None,
        }
    }
}
