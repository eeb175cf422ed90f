//! Integration tests for obligation extraction as seen through the view:
//!
//!   - Payers never owe themselves
//!   - Zero-percent shares surface as zero-amount entries, not as noise
//!   - Malformed movements (no payer, bad share sums, negative shares)
//!     drop out without taking healthy movements with them
//!   - Remainder cents land on the earliest positions
//!   - Plain household expenses and debt payments stay out of the ledger

use prestamos_core::{
    engine::LedgerEngine,
    store::{Movement, SplitParticipant},
    types::{MovementKind, Role},
    view::Direction,
};

fn ts(day: u32) -> String {
    format!("2026-06-{day:02}T12:00:00Z")
}

fn user_share(position: i64, user_id: &str, share_bps: i64) -> SplitParticipant {
    SplitParticipant {
        position,
        participant_user_id: Some(user_id.into()),
        participant_contact_id: None,
        share_bps,
    }
}

fn contact_share(position: i64, contact_id: &str, share_bps: i64) -> SplitParticipant {
    SplitParticipant {
        position,
        participant_user_id: None,
        participant_contact_id: Some(contact_id.into()),
        share_bps,
    }
}

fn movement(
    movement_id: &str,
    kind: MovementKind,
    amount_minor: i64,
    payer: (Option<&str>, Option<&str>),
    participants: Vec<SplitParticipant>,
    created_at: &str,
) -> Movement {
    Movement {
        movement_id: movement_id.into(),
        household_id: "h-casa".into(),
        kind,
        description: format!("movement {movement_id}"),
        amount_minor,
        category: None,
        payment_method: None,
        payer_user_id: payer.0.map(Into::into),
        payer_contact_id: payer.1.map(Into::into),
        created_at: created_at.into(),
        participants,
    }
}

/// One household, the viewer as owner, plus three ghost contacts to split
/// against. Tests add their own movements.
fn casa() -> LedgerEngine {
    let engine = LedgerEngine::in_memory().expect("in-memory ledger");
    let s = &engine.store;
    s.insert_user("u-lena", "Lena", "lena@example.com", &ts(1)).unwrap();
    s.insert_household("h-casa", "La Casa", &ts(1)).unwrap();
    s.add_member("h-casa", "u-lena", Role::Owner, &ts(1)).unwrap();
    s.insert_contact("c-uno", "h-casa", "Uno", None, None, &ts(1)).unwrap();
    s.insert_contact("c-dos", "h-casa", "Dos", None, None, &ts(1)).unwrap();
    s.insert_contact("c-tres", "h-casa", "Tres", None, None, &ts(1)).unwrap();
    engine
}

/// The payer's own share never becomes a debt to themselves.
#[test]
fn payer_share_is_not_a_debt() {
    let engine = casa();
    engine
        .store
        .insert_movement(&movement(
            "m-1",
            MovementKind::Split,
            900,
            (Some("u-lena"), None),
            vec![
                user_share(0, "u-lena", 5000),
                contact_share(1, "c-uno", 2500),
                contact_share(2, "c-dos", 2500),
            ],
            &ts(2),
        ))
        .unwrap();

    let view = engine.loan_view("u-lena").unwrap();
    assert_eq!(view.cards.len(), 2, "only the two contacts owe anything");
    for card in &view.cards {
        assert_eq!(card.net_amount, 225, "2500 bps of 900: {}", card.counterparty_name);
        assert_ne!(card.counterparty_name, "Lena");
    }
}

/// A 0 bps participant still appears in the card's entry list, with amount
/// zero, whenever other movements give the pair a card to appear on.
#[test]
fn zero_percent_share_keeps_the_movement_visible() {
    let engine = casa();
    engine
        .store
        .insert_movement(&movement(
            "m-half",
            MovementKind::Split,
            800,
            (Some("u-lena"), None),
            vec![user_share(0, "u-lena", 5000), contact_share(1, "c-uno", 5000)],
            &ts(2),
        ))
        .unwrap();
    engine
        .store
        .insert_movement(&movement(
            "m-free",
            MovementKind::Split,
            600,
            (Some("u-lena"), None),
            vec![
                user_share(0, "u-lena", 5000),
                contact_share(1, "c-uno", 0),
                contact_share(2, "c-dos", 5000),
            ],
            &ts(3),
        ))
        .unwrap();

    let view = engine.loan_view("u-lena").unwrap();
    let uno = view
        .cards
        .iter()
        .find(|c| c.counterparty_name == "Uno")
        .expect("card for Uno");
    assert_eq!(uno.net_amount, 400, "only m-half carries money for Uno");

    let group = &uno.directions[0];
    assert_eq!(group.direction, Direction::CounterpartyOwesViewer);
    assert_eq!(group.movements.len(), 2, "the free ride still shows up");
    let free = group.movements.iter().find(|e| e.id == "m-free").expect("m-free entry");
    assert_eq!(free.amount, 0);
}

/// Splits with no payer cannot say who is owed; they are dropped while
/// their neighbors keep working.
#[test]
fn payerless_split_is_ignored() {
    let engine = casa();
    engine
        .store
        .insert_movement(&movement(
            "m-orphan",
            MovementKind::Split,
            1_000,
            (None, None),
            vec![contact_share(0, "c-uno", 10_000)],
            &ts(2),
        ))
        .unwrap();
    engine
        .store
        .insert_movement(&movement(
            "m-good",
            MovementKind::Split,
            500,
            (Some("u-lena"), None),
            vec![user_share(0, "u-lena", 5000), contact_share(1, "c-uno", 5000)],
            &ts(3),
        ))
        .unwrap();

    let view = engine.loan_view("u-lena").unwrap();
    assert_eq!(view.cards.len(), 1);
    assert_eq!(view.cards[0].net_amount, 250, "only the healthy split counts");
    let ids: Vec<&str> = view.cards[0].directions[0]
        .movements
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(ids, vec!["m-good"]);
}

/// Shares that do not sum to (about) 100% poison the whole movement.
#[test]
fn bad_share_sum_drops_the_whole_movement() {
    let engine = casa();
    engine
        .store
        .insert_movement(&movement(
            "m-over",
            MovementKind::Split,
            1_000,
            (Some("u-lena"), None),
            vec![user_share(0, "u-lena", 6000), contact_share(1, "c-uno", 6000)],
            &ts(2),
        ))
        .unwrap();
    engine
        .store
        .insert_movement(&movement(
            "m-under",
            MovementKind::Split,
            1_000,
            (Some("u-lena"), None),
            vec![user_share(0, "u-lena", 4000), contact_share(1, "c-uno", 4000)],
            &ts(3),
        ))
        .unwrap();

    let view = engine.loan_view("u-lena").unwrap();
    assert!(view.cards.is_empty(), "neither 120% nor 80% splits may count");
}

/// Off-by-one basis point sums survive; data entry rounding is tolerated.
#[test]
fn share_sum_within_one_bps_is_accepted() {
    let engine = casa();
    engine
        .store
        .insert_movement(&movement(
            "m-9999",
            MovementKind::Split,
            10_000,
            (Some("u-lena"), None),
            vec![
                user_share(0, "u-lena", 3333),
                contact_share(1, "c-uno", 3333),
                contact_share(2, "c-dos", 3333),
            ],
            &ts(2),
        ))
        .unwrap();

    let view = engine.loan_view("u-lena").unwrap();
    assert_eq!(view.cards.len(), 2, "9999 bps total is close enough");
}

/// A negative share is nonsense and disqualifies its movement.
#[test]
fn negative_share_drops_the_whole_movement() {
    let engine = casa();
    engine
        .store
        .insert_movement(&movement(
            "m-neg",
            MovementKind::Split,
            1_000,
            (Some("u-lena"), None),
            vec![user_share(0, "u-lena", 11_000), contact_share(1, "c-uno", -1_000)],
            &ts(2),
        ))
        .unwrap();

    let view = engine.loan_view("u-lena").unwrap();
    assert!(view.cards.is_empty());
}

/// 100 cents over three equal shares: every remainder ties, so the spare
/// cent lands on the earliest position and the sum stays exact.
#[test]
fn remainder_cents_land_on_earliest_positions() {
    let engine = casa();
    engine
        .store
        .insert_movement(&movement(
            "m-thirds",
            MovementKind::Split,
            100,
            (Some("u-lena"), None),
            vec![
                contact_share(0, "c-uno", 3333),
                contact_share(1, "c-dos", 3333),
                contact_share(2, "c-tres", 3333),
            ],
            &ts(2),
        ))
        .unwrap();

    let view = engine.loan_view("u-lena").unwrap();
    let amount_of = |name: &str| {
        view.cards
            .iter()
            .find(|c| c.counterparty_name == name)
            .unwrap_or_else(|| panic!("card for {name}"))
            .net_amount
    };
    assert_eq!(amount_of("Uno") + amount_of("Dos") + amount_of("Tres"), 100);
    assert_eq!(amount_of("Uno"), 34);
    assert_eq!(amount_of("Dos"), 33);
    assert_eq!(amount_of("Tres"), 33);
}

/// Ordinary household expenses and debt repayments are bookkeeping, not
/// debt sources.
#[test]
fn only_split_movements_generate_debt() {
    let engine = casa();
    engine
        .store
        .insert_movement(&movement(
            "m-house",
            MovementKind::Household,
            5_000,
            (Some("u-lena"), None),
            vec![],
            &ts(2),
        ))
        .unwrap();
    engine
        .store
        .insert_movement(&movement(
            "m-payback",
            MovementKind::DebtPayment,
            5_000,
            (Some("u-lena"), None),
            vec![contact_share(0, "c-uno", 10_000)],
            &ts(3),
        ))
        .unwrap();

    let view = engine.loan_view("u-lena").unwrap();
    assert!(view.cards.is_empty(), "HOUSEHOLD and DEBT_PAYMENT rows never owe anyone");
}

/// Negative amounts (refunds entered as splits) are rejected as sources.
#[test]
fn negative_amount_split_is_ignored() {
    let engine = casa();
    engine
        .store
        .insert_movement(&movement(
            "m-refund",
            MovementKind::Split,
            -400,
            (Some("u-lena"), None),
            vec![user_share(0, "u-lena", 5000), contact_share(1, "c-uno", 5000)],
            &ts(2),
        ))
        .unwrap();

    let view = engine.loan_view("u-lena").unwrap();
    assert!(view.cards.is_empty());
}
