//! Scenario loading and demo-data seeding for the loan-view runner.
//!
//! A scenario is JSON: users, then households carrying their members,
//! contacts and movements. Omitted movement ids are minted as UUIDs;
//! timestamps come from a fixed base clock so seeded ledgers stay
//! comparable across runs.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use prestamos_core::{
    engine::LedgerEngine,
    store::{Movement, SplitParticipant},
    types::{MovementKind, Role},
};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize, Default)]
pub struct Scenario {
    #[serde(default)]
    pub users: Vec<UserSpec>,
    #[serde(default)]
    pub households: Vec<HouseholdSpec>,
}

#[derive(Deserialize)]
pub struct UserSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct HouseholdSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberSpec>,
    #[serde(default)]
    pub contacts: Vec<ContactSpec>,
    #[serde(default)]
    pub movements: Vec<MovementSpec>,
}

#[derive(Deserialize)]
pub struct MemberSpec {
    pub user: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "member".to_string()
}

#[derive(Deserialize)]
pub struct ContactSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linked_user: Option<String>,
}

#[derive(Deserialize)]
pub struct MovementSpec {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub description: String,
    pub amount_minor: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payer_user: Option<String>,
    #[serde(default)]
    pub payer_contact: Option<String>,
    #[serde(default)]
    pub participants: Vec<ParticipantSpec>,
}

fn default_kind() -> String {
    "SPLIT".to_string()
}

#[derive(Deserialize)]
pub struct ParticipantSpec {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    pub share_bps: i64,
}

/// Two one-owner households that each keep the other owner as a linked
/// contact, plus a third household splitting against a ghost.
const BUILTIN_JSON: &str = r#"{
  "users": [
    {"id": "u-jose",   "name": "Jose"},
    {"id": "u-maria",  "name": "Maria"},
    {"id": "u-carmen", "name": "Carmen"}
  ],
  "households": [
    {
      "id": "h-jose", "name": "Casa Jose",
      "members":  [{"user": "u-jose", "role": "owner"}],
      "contacts": [{"id": "c-maria", "name": "Maria Isabel", "linked_user": "u-maria"}],
      "movements": [
        {"id": "m-groceries", "description": "Groceries", "amount_minor": 2000000,
         "payer_user": "u-jose", "category": "food",
         "participants": [{"user": "u-jose", "share_bps": 5000},
                          {"contact": "c-maria", "share_bps": 5000}]}
      ]
    },
    {
      "id": "h-maria", "name": "Casa Maria",
      "members":  [{"user": "u-maria", "role": "owner"}],
      "contacts": [{"id": "c-jose", "name": "Josecito", "linked_user": "u-jose"}],
      "movements": [
        {"id": "m-dinner", "description": "Dinner out", "amount_minor": 600000,
         "payer_user": "u-maria", "category": "food",
         "participants": [{"user": "u-maria", "share_bps": 5000},
                          {"contact": "c-jose", "share_bps": 5000}]}
      ]
    },
    {
      "id": "h-carmen", "name": "Piso Carmen",
      "members":  [{"user": "u-carmen", "role": "owner"}],
      "contacts": [{"id": "c-abuela", "name": "Abuela Pili"}],
      "movements": [
        {"id": "m-pharmacy", "description": "Pharmacy run", "amount_minor": 45500,
         "payer_user": "u-carmen", "category": "health",
         "participants": [{"user": "u-carmen", "share_bps": 5000},
                          {"contact": "c-abuela", "share_bps": 5000}]}
      ]
    }
  ]
}"#;

pub fn builtin() -> Result<Scenario> {
    serde_json::from_str(BUILTIN_JSON).context("Built-in scenario failed to parse")
}

pub fn from_file(path: &str) -> Result<Scenario> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading scenario file '{path}'"))?;
    serde_json::from_str(&text).with_context(|| format!("Parsing scenario file '{path}'"))
}

/// Insert every row a scenario describes, in declaration order.
pub fn apply(engine: &LedgerEngine, scenario: &Scenario) -> Result<()> {
    if scenario.households.is_empty() {
        log::warn!("scenario defines no households, nothing to seed");
    }
    let mut clock = SeedClock::new("2026-01-01T08:00:00Z")?;

    for u in &scenario.users {
        let email = u
            .email
            .clone()
            .unwrap_or_else(|| format!("{}@example.com", u.id));
        engine
            .store
            .insert_user(&u.id, &u.name, &email, &clock.tick())?;
    }

    for h in &scenario.households {
        engine.store.insert_household(&h.id, &h.name, &clock.tick())?;
        for m in &h.members {
            let role = Role::from_db_str(&m.role)
                .with_context(|| format!("Unknown role '{}' in household '{}'", m.role, h.id))?;
            engine.store.add_member(&h.id, &m.user, role, &clock.tick())?;
        }
        for c in &h.contacts {
            engine.store.insert_contact(
                &c.id,
                &h.id,
                &c.name,
                c.email.as_deref(),
                c.linked_user.as_deref(),
                &clock.tick(),
            )?;
        }
        for spec in &h.movements {
            let movement = build_movement(&h.id, spec, &mut clock)?;
            engine.store.insert_movement(&movement)?;
        }
    }
    Ok(())
}

fn build_movement(
    household_id: &str,
    spec: &MovementSpec,
    clock: &mut SeedClock,
) -> Result<Movement> {
    let kind = MovementKind::from_db_str(&spec.kind)
        .with_context(|| format!("Unknown movement kind '{}'", spec.kind))?;
    let participants = spec
        .participants
        .iter()
        .enumerate()
        .map(|(i, p)| SplitParticipant {
            position: i as i64,
            participant_user_id: p.user.clone(),
            participant_contact_id: p.contact.clone(),
            share_bps: p.share_bps,
        })
        .collect();
    Ok(Movement {
        movement_id: spec
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        household_id: household_id.to_string(),
        kind,
        description: spec.description.clone(),
        amount_minor: spec.amount_minor,
        category: spec.category.clone(),
        payment_method: spec.payment_method.clone(),
        payer_user_id: spec.payer_user.clone(),
        payer_contact_id: spec.payer_contact.clone(),
        created_at: clock.tick(),
        participants,
    })
}

/// Generate `count` extra households, each with one owner, a few ghost
/// contacts and a handful of splits. Same seed, same ledger. Returns the
/// generated owner ids so the caller can render their views too.
pub fn seed_random(engine: &LedgerEngine, seed: u64, count: u64) -> Result<Vec<String>> {
    let mut rng = DemoRng::new(seed);
    // Generated rows start a month after scenario rows.
    let mut clock = SeedClock::new("2026-02-01T08:00:00Z")?;
    let mut owners = Vec::new();

    for n in 0..count {
        let owner_id = format!("u-gen-{n}");
        let owner_name = rng.pick(FIRST_NAMES);
        engine.store.insert_user(
            &owner_id,
            owner_name,
            &format!("{owner_id}@example.com"),
            &clock.tick(),
        )?;

        let household_id = format!("h-gen-{n}");
        let household_name = format!(
            "{} {}",
            rng.pick(HOUSEHOLD_PREFIXES),
            rng.pick(HOUSEHOLD_SUFFIXES)
        );
        engine
            .store
            .insert_household(&household_id, &household_name, &clock.tick())?;
        engine
            .store
            .add_member(&household_id, &owner_id, Role::Owner, &clock.tick())?;

        let contact_total = 1 + rng.below(3);
        let mut contact_ids = Vec::new();
        for c in 0..contact_total {
            let contact_id = format!("c-gen-{n}-{c}");
            engine.store.insert_contact(
                &contact_id,
                &household_id,
                rng.pick(FIRST_NAMES),
                None,
                None,
                &clock.tick(),
            )?;
            contact_ids.push(contact_id);
        }

        let movement_total = 2 + rng.below(4);
        for m in 0..movement_total {
            let amount = 500 + rng.below(200_000) as i64;
            let three_way = contact_ids.len() >= 2 && rng.below(2) == 1;
            let mut participants = vec![SplitParticipant {
                position: 0,
                participant_user_id: Some(owner_id.clone()),
                participant_contact_id: None,
                share_bps: if three_way { 3400 } else { 5000 },
            }];
            let first = rng.below(contact_ids.len() as u64) as usize;
            participants.push(SplitParticipant {
                position: 1,
                participant_user_id: None,
                participant_contact_id: Some(contact_ids[first].clone()),
                share_bps: if three_way { 3300 } else { 5000 },
            });
            if three_way {
                // Any second ghost distinct from the first.
                let second = (first + 1) % contact_ids.len();
                participants.push(SplitParticipant {
                    position: 2,
                    participant_user_id: None,
                    participant_contact_id: Some(contact_ids[second].clone()),
                    share_bps: 3300,
                });
            }
            engine.store.insert_movement(&Movement {
                movement_id: format!("m-gen-{n}-{m}"),
                household_id: household_id.clone(),
                kind: MovementKind::Split,
                description: format!("{} (week {})", rng.pick(EXPENSES), m + 1),
                amount_minor: amount,
                category: None,
                payment_method: None,
                payer_user_id: Some(owner_id.clone()),
                payer_contact_id: None,
                created_at: clock.tick(),
                participants,
            })?;
        }
        owners.push(owner_id);
    }
    Ok(owners)
}

/// Fixed-base clock handing out one timestamp per row, one minute apart.
struct SeedClock {
    at: DateTime<Utc>,
}

impl SeedClock {
    fn new(base: &str) -> Result<Self> {
        let at = base
            .parse::<DateTime<Utc>>()
            .with_context(|| format!("Bad base timestamp '{base}'"))?;
        Ok(Self { at })
    }

    fn tick(&mut self) -> String {
        let stamp = self.at.to_rfc3339_opts(SecondsFormat::Secs, true);
        self.at = self.at + Duration::minutes(1);
        stamp
    }
}

/// Seeded generator for demo data.
struct DemoRng {
    inner: Pcg64Mcg,
}

impl DemoRng {
    fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    fn below(&mut self, n: u64) -> u64 {
        self.inner.next_u64() % n
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[self.below(options.len() as u64) as usize]
    }
}

const FIRST_NAMES: &[&str] = &[
    "Lucia", "Mateo", "Sofia", "Diego", "Valentina", "Tomas", "Camila", "Andres", "Paula",
    "Nico", "Emma", "Bruno",
];

const HOUSEHOLD_PREFIXES: &[&str] = &["Casa", "Piso", "Depto", "Chalet"];

const HOUSEHOLD_SUFFIXES: &[&str] = &["Norte", "Sur", "Centro", "del Rio", "Azul", "Verde"];

const EXPENSES: &[&str] = &[
    "Groceries",
    "Utilities",
    "Taxi share",
    "Concert tickets",
    "Weekend trip",
    "Pizza night",
    "Pharmacy",
    "Internet bill",
];
