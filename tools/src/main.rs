//! loanview-runner: headless demo runner for the prestamos ledger.
//!
//! Usage:
//!   loanview-runner --db ledger.db --viewer u-jose
//!   loanview-runner --scenario demo.json --json
//!   loanview-runner --seed 7 --extra-households 3

mod scenario;

use anyhow::Result;
use prestamos_core::{engine::LedgerEngine, view::Direction};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let extra = parse_arg(&args, "--extra-households", 0u64);
    let json_mode = args.iter().any(|a| a == "--json");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let scenario_path = args
        .windows(2)
        .find(|w| w[0] == "--scenario")
        .map(|w| w[1].as_str());
    let viewer = args
        .windows(2)
        .find(|w| w[0] == "--viewer")
        .map(|w| w[1].as_str());

    if !json_mode {
        println!("prestamos — loan-view runner");
        println!("  db:               {db}");
        println!("  seed:             {seed}");
        println!("  extra households: {extra}");
        println!();
    }

    let engine = LedgerEngine::open(db)?;

    let scenario = match scenario_path {
        Some(path) => scenario::from_file(path)?,
        None => scenario::builtin()?,
    };
    scenario::apply(&engine, &scenario)?;
    let generated = scenario::seed_random(&engine, seed, extra)?;

    let viewers: Vec<String> = match viewer {
        Some(id) => vec![id.to_string()],
        None => scenario
            .users
            .iter()
            .map(|u| u.id.clone())
            .chain(generated)
            .collect(),
    };

    for user_id in &viewers {
        if json_mode {
            println!("{}", engine.loan_view_json(user_id)?);
        } else {
            print_view(&engine, user_id)?;
        }
    }

    if !json_mode {
        print_totals(&engine, &scenario, extra)?;
    }
    Ok(())
}

fn print_view(engine: &LedgerEngine, user_id: &str) -> Result<()> {
    let view = engine.loan_view(user_id)?;
    println!("=== LOAN VIEW: {user_id} ===");
    if view.cards.is_empty() {
        println!("  (all settled)");
    }
    for card in &view.cards {
        let headline = match card.net_direction {
            Direction::CounterpartyOwesViewer => "owes you",
            Direction::ViewerOwesCounterparty => "you owe",
        };
        let scope = if card.is_cross_household {
            "  [cross-household]"
        } else {
            ""
        };
        println!(
            "  {} — {headline} {}{scope}",
            card.counterparty_name, card.net_amount
        );
        for group in &card.directions {
            let label = match group.direction {
                Direction::CounterpartyOwesViewer => "owed to you",
                Direction::ViewerOwesCounterparty => "owed by you",
            };
            println!("    {label}: {}", group.subtotal);
            for entry in &group.movements {
                let origin = entry
                    .source_household_name
                    .as_deref()
                    .map(|n| format!("  @ {n}"))
                    .unwrap_or_default();
                let lock = if entry.mutable { "" } else { "  (read-only)" };
                println!("      {:>10}  {}{origin}{lock}", entry.amount, entry.description);
            }
        }
    }
    println!();
    Ok(())
}

fn print_totals(engine: &LedgerEngine, scenario: &scenario::Scenario, extra: u64) -> Result<()> {
    let mut household_ids: Vec<String> =
        scenario.households.iter().map(|h| h.id.clone()).collect();
    household_ids.extend((0..extra).map(|n| format!("h-gen-{n}")));

    let mut contacts = 0;
    let mut movements = 0;
    for id in &household_ids {
        contacts += engine.store.contact_count(id)?;
        movements += engine.store.movement_count(id)?;
    }

    println!("=== LEDGER TOTALS ===");
    println!("  households: {}", household_ids.len());
    println!("  contacts:   {contacts}");
    println!("  movements:  {movements}");
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
