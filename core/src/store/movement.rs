use super::{LedgerStore, Movement, SplitParticipant};
use crate::{error::LedgerResult, types::MovementKind};
use rusqlite::params;
use std::collections::HashMap;

impl LedgerStore {
pub fn insert_movement(&self, m: &Movement) -> LedgerResult<()> {
    self.conn.execute(
        "INSERT INTO movements (
             movement_id, household_id, kind, description, amount_minor,
             category, payment_method, payer_user_id, payer_contact_id, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            m.movement_id,
            m.household_id,
            m.kind.as_db_str(),
            m.description,
            m.amount_minor,
            m.category,
            m.payment_method,
            m.payer_user_id,
            m.payer_contact_id,
            m.created_at,
        ],
    )?;
    for p in &m.participants {
        self.conn.execute(
            "INSERT INTO movement_participants (
                 movement_id, position, participant_user_id, participant_contact_id, share_bps
             ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                m.movement_id,
                p.position,
                p.participant_user_id,
                p.participant_contact_id,
                p.share_bps,
            ],
        )?;
    }
    Ok(())
}

pub fn delete_movement(&self, movement_id: &str) -> LedgerResult<()> {
    // Participants go with it via ON DELETE CASCADE.
    self.conn.execute(
        "DELETE FROM movements WHERE movement_id = ?1",
        params![movement_id],
    )?;
    Ok(())
}

/// One household's SPLIT movements with participants embedded, ordered by
/// creation time then id. HOUSEHOLD and DEBT_PAYMENT rows never surface
/// here; they carry no pairwise obligations.
pub fn list_split_movements(&self, household_id: &str) -> LedgerResult<Vec<Movement>> {
    let mut stmt = self.conn.prepare(
        "SELECT movement_id, household_id, description, amount_minor,
                category, payment_method, payer_user_id, payer_contact_id, created_at
         FROM movements
         WHERE household_id = ?1 AND kind = 'SPLIT'
         ORDER BY created_at ASC, movement_id ASC",
    )?;
    let mut movements = stmt
        .query_map(params![household_id], |row| {
            Ok(Movement {
                movement_id: row.get(0)?,
                household_id: row.get(1)?,
                kind: MovementKind::Split,
                description: row.get(2)?,
                amount_minor: row.get(3)?,
                category: row.get(4)?,
                payment_method: row.get(5)?,
                payer_user_id: row.get(6)?,
                payer_contact_id: row.get(7)?,
                created_at: row.get(8)?,
                participants: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = self.conn.prepare(
        "SELECT p.movement_id, p.position, p.participant_user_id,
                p.participant_contact_id, p.share_bps
         FROM movement_participants p
         JOIN movements m ON p.movement_id = m.movement_id
         WHERE m.household_id = ?1 AND m.kind = 'SPLIT'
         ORDER BY p.movement_id ASC, p.position ASC",
    )?;
    let mut by_movement: HashMap<String, Vec<SplitParticipant>> = HashMap::new();
    let participants = stmt
        .query_map(params![household_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                SplitParticipant {
                    position: row.get(1)?,
                    participant_user_id: row.get(2)?,
                    participant_contact_id: row.get(3)?,
                    share_bps: row.get(4)?,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for (movement_id, p) in participants {
        by_movement.entry(movement_id).or_default().push(p);
    }
    for m in &mut movements {
        if let Some(ps) = by_movement.remove(&m.movement_id) {
            m.participants = ps;
        }
    }
    Ok(movements)
}

/// Count movements of any kind in a household (test helper).
pub fn movement_count(&self, household_id: &str) -> LedgerResult<i64> {
    Ok(self.conn.query_row(
        "SELECT COUNT(*) FROM movements WHERE household_id = ?1",
        params![household_id],
        |row| row.get(0),
    )?)
}
}
