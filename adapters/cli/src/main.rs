#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Farm Royale battles and manages the collection.

mod battle;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use farm_royale_app::{App, Config, GameStore, JsonFileStore, MemoryStore};
use farm_royale_core::{CardId, Event, ResourceType};
use farm_royale_system_economy::ResourceLedger;
use farm_royale_world::query;

/// Farm Royale battle core driven from the terminal.
#[derive(Parser, Debug)]
#[command(name = "farm-royale", version, about)]
struct Args {
    /// Seed for every random roll of the session.
    #[arg(long, default_value_t = 0x6661_726d)]
    seed: u64,

    /// JSON file holding the player's progression. Without it nothing is persisted.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,

    #[command(subcommand)]
    command: Action,
}

/// Available actions.
#[derive(Subcommand, Debug)]
enum Action {
    /// Play one scripted battle.
    Battle {
        /// How the scripted battle ends.
        #[arg(long, value_enum, default_value = "win")]
        strategy: battle::Strategy,
    },
    /// Upgrade a card, paying its coin cost.
    Upgrade {
        /// Identifier of the card to upgrade.
        #[arg(long)]
        card: u32,
    },
    /// Print trophies, currency, deck and collection.
    Status,
}

/// Entry point for the Farm Royale command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = Config::new(args.seed);
    let mut store: Box<dyn GameStore> = match &args.save {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };
    let mut app = App::load(config, store.as_ref())?;

    match args.command {
        Action::Battle { strategy } => {
            let _ = app.subscribe(|event| {
                match event {
                    Event::TowerDestroyed { side, remaining } => {
                        println!("{side:?} tower destroyed, {remaining} left");
                    }
                    Event::ArenaChanged { from, to } => {
                        println!("arena {from} -> {to}");
                    }
                    _ => {}
                }
                Ok(())
            });

            let frame = Duration::from_millis(args.frame_ms);
            let report = battle::run(&mut app, strategy, frame)?;
            println!(
                "{:?} after {:.1}s: {:+} trophies, {} cards played",
                report.outcome,
                report.elapsed.as_secs_f32(),
                report.trophy_delta,
                report.cards_played
            );
            for (resource, amount) in app.latest_rewards().resources() {
                println!("  +{amount} {resource:?}");
            }
            println!("  +{} experience", app.latest_rewards().experience());
        }
        Action::Upgrade { card } => {
            let level = app.upgrade_card(CardId::new(card))?;
            println!(
                "card {card} is now level {level}; {} coins left",
                app.wallet().amount(ResourceType::Coins)
            );
        }
        Action::Status => print_status(&app),
    }

    app.save(store.as_mut())
}

fn print_status(app: &App) {
    let world = app.world();
    println!(
        "trophies {} (arena {}), level {} ({} xp)",
        query::trophies(world),
        query::arena_level(world),
        app.level().level(),
        app.level().experience()
    );
    for (resource, amount) in app.wallet().balances() {
        println!("{resource:?}: {amount}");
    }

    let deck: Vec<String> = query::deck(world)
        .iter()
        .map(|card| card.get().to_string())
        .collect();
    println!("deck: [{}]", deck.join(", "));

    for card in query::cards(world) {
        println!(
            "#{:<3} {:<16} {:?} lvl {} cost {} copies {}/{} upgrade {} coins",
            card.id().get(),
            card.name(),
            card.kind(),
            card.level(),
            card.cost(),
            card.owned(),
            card.required_for_upgrade(),
            card.upgrade_cost()
        );
    }
}
