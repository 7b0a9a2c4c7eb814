use std::time::Duration;

use farm_royale_core::{ArenaPoint, Command, Event, TowerSide, HAND_SIZE};
use farm_royale_system_elixir_regeneration::{Config as RegenerationConfig, ElixirRegeneration};
use farm_royale_world::{self as world, query, Config, World};

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    elixir_samples: Vec<f32>,
    trophies: u32,
}

#[test]
fn deterministic_replay_produces_identical_battles() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::BattleSettled { .. })));
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::CardPlayed { .. })));
}

#[test]
fn regeneration_accumulates_at_the_normal_rate() {
    let mut world = World::with_config(Config::new(3));
    let mut regeneration = ElixirRegeneration::new(RegenerationConfig::default());
    let mut events = Vec::new();

    pump(&mut world, &mut regeneration, Command::StartBattle, &mut events);
    for _ in 0..16 {
        pump(
            &mut world,
            &mut regeneration,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );
    }

    let elixir = query::session(&world).elixir;
    assert!((elixir - 6.4).abs() < 1e-4, "elixir {elixir}");
}

#[test]
fn regeneration_caps_at_maximum_and_stops_after_the_battle() {
    let mut world = World::with_config(Config::new(3));
    let mut regeneration = ElixirRegeneration::new(RegenerationConfig::default());
    let mut events = Vec::new();

    pump(&mut world, &mut regeneration, Command::StartBattle, &mut events);
    pump(
        &mut world,
        &mut regeneration,
        Command::Tick {
            dt: Duration::from_secs(30),
        },
        &mut events,
    );
    assert!((query::session(&world).elixir - 10.0).abs() < f32::EPSILON);

    pump(
        &mut world,
        &mut regeneration,
        Command::EndBattle { player_won: true },
        &mut events,
    );
    assert!(!regeneration.is_running());

    events.clear();
    pump(
        &mut world,
        &mut regeneration,
        Command::Tick {
            dt: Duration::from_secs(5),
        },
        &mut events,
    );
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ElixirChanged { .. })));
}

#[test]
fn final_minute_steps_use_the_accelerated_rate() {
    let mut world = World::with_config(Config::new(3));
    let mut regeneration = ElixirRegeneration::new(RegenerationConfig::default());
    let mut events = Vec::new();

    pump(&mut world, &mut regeneration, Command::StartBattle, &mut events);
    for slot in 0..HAND_SIZE {
        pump(
            &mut world,
            &mut regeneration,
            Command::PlayCard {
                slot,
                position: ArenaPoint::default(),
            },
            &mut events,
        );
    }
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(119),
        },
        &mut Vec::new(),
    );
    let before = query::session(&world).elixir;

    pump(
        &mut world,
        &mut regeneration,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
        &mut events,
    );

    let after = query::session(&world).elixir;
    assert!(before < 9.0, "elixir {before}");
    assert!((after - before - 0.70).abs() < 1e-4, "gained {}", after - before);
}

fn pump(
    world: &mut World,
    regeneration: &mut ElixirRegeneration,
    command: Command,
    log: &mut Vec<Event>,
) {
    let mut pending = vec![command];
    while !pending.is_empty() {
        let mut events = Vec::new();
        for command in pending.drain(..) {
            world::apply(world, command, &mut events);
        }
        regeneration.handle(&events, &mut pending);
        log.extend(events);
    }
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::with_config(Config::new(0xfa57));
    let mut regeneration = ElixirRegeneration::new(RegenerationConfig::default());
    let mut events = Vec::new();
    let mut elixir_samples = Vec::new();

    for command in commands {
        pump(&mut world, &mut regeneration, command, &mut events);
        elixir_samples.push(query::session(&world).elixir);
    }

    ReplayOutcome {
        events,
        elixir_samples,
        trophies: query::trophies(&world),
    }
}

fn scripted_commands() -> Vec<Command> {
    let tick = Command::Tick {
        dt: Duration::from_millis(500),
    };
    let mut commands = vec![Command::StartBattle];
    for round in 0..12 {
        commands.extend(std::iter::repeat(tick.clone()).take(6));
        commands.push(Command::PlayCard {
            slot: round % HAND_SIZE,
            position: ArenaPoint::new(round as f32, 2.0),
        });
    }
    commands.extend(std::iter::repeat(Command::DestroyTower { side: TowerSide::Enemy }).take(3));
    commands.push(tick);
    commands
}
