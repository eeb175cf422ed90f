use super::{Contact, LedgerStore};
use crate::error::LedgerResult;
use rusqlite::params;

impl LedgerStore {
pub fn insert_contact(
    &self,
    contact_id: &str,
    household_id: &str,
    name: &str,
    email: Option<&str>,
    linked_user_id: Option<&str>,
    created_at: &str,
) -> LedgerResult<()> {
    self.conn.execute(
        "INSERT INTO contacts (
             contact_id, household_id, name, email, linked_user_id, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![contact_id, household_id, name, email, linked_user_id, created_at],
    )?;
    Ok(())
}

/// Rename an existing contact. The label is household-local, so this
/// never touches what other households call the same person.
pub fn rename_contact(&self, contact_id: &str, name: &str) -> LedgerResult<()> {
    self.conn.execute(
        "UPDATE contacts SET name = ?1 WHERE contact_id = ?2",
        params![name, contact_id],
    )?;
    Ok(())
}

/// One household's contact book, oldest entry first. Link validity is
/// resolved against the users table in the same query so callers can
/// spot links to accounts that no longer exist.
pub fn list_contacts(&self, household_id: &str) -> LedgerResult<Vec<Contact>> {
    let mut stmt = self.conn.prepare(
        "SELECT c.contact_id, c.household_id, c.name, c.email, c.linked_user_id,
                u.user_id IS NOT NULL AS link_valid, c.created_at
         FROM contacts c
         LEFT JOIN users u ON c.linked_user_id = u.user_id
         WHERE c.household_id = ?1
         ORDER BY c.created_at ASC, c.contact_id ASC",
    )?;
    let rows = stmt
        .query_map(params![household_id], |row| {
            Ok(Contact {
                contact_id: row.get(0)?,
                household_id: row.get(1)?,
                name: row.get(2)?,
                email: row.get(3)?,
                linked_user_id: row.get(4)?,
                link_valid: row.get::<_, i64>(5)? != 0,
                created_at: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Households holding at least one contact linked to this user. These are
/// the foreign households whose split movements concern the user even
/// though the user has no membership there.
pub fn find_households_linking_user(&self, user_id: &str) -> LedgerResult<Vec<String>> {
    let mut stmt = self.conn.prepare(
        "SELECT DISTINCT household_id FROM contacts
         WHERE linked_user_id = ?1
         ORDER BY household_id ASC",
    )?;
    let rows = stmt
        .query_map(params![user_id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Count contacts in a household (test helper).
pub fn contact_count(&self, household_id: &str) -> LedgerResult<i64> {
    Ok(self.conn.query_row(
        "SELECT COUNT(*) FROM contacts WHERE household_id = ?1",
        params![household_id],
        |row| row.get(0),
    )?)
}
}
