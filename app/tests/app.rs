use std::{cell::RefCell, rc::Rc, time::Duration};

use anyhow::bail;
use farm_royale_app::{App, Config, GameStore, JsonFileStore, MemoryStore, SaveData};
use farm_royale_core::{
    ArenaPoint, BattleOutcome, BattleRecord, CardId, Command, Event, ResourceType, TowerSide,
};
use farm_royale_system_economy::ResourceLedger;
use farm_royale_world::{query, Config as WorldConfig};

fn app() -> App {
    App::new(Config::new(0xab))
}

fn register_copy(app: &mut App, id: CardId) {
    let card = query::card(app.world(), id).expect("known card").clone();
    let events = app.submit(Command::RegisterCard { card });
    assert_eq!(events, vec![Event::CardRegistered { card: id }]);
}

#[test]
fn ticks_drive_regeneration_through_the_pump() {
    let mut app = app();
    let _ = app.submit(Command::StartBattle);

    let events = app.submit(Command::Tick {
        dt: Duration::from_secs(4),
    });

    let regenerated = events
        .iter()
        .filter(|event| matches!(event, Event::ElixirChanged { .. }))
        .count();
    assert_eq!(regenerated, 4);
    assert!((query::session(app.world()).elixir - 6.4).abs() < 1e-4);
}

#[test]
fn settlement_is_credited_to_the_wallet() {
    let mut app = app();
    let _ = app.submit(Command::StartBattle);

    let events = app.submit(Command::EndBattle { player_won: false });

    assert!(events.contains(&Event::BattleSettled {
        outcome: BattleOutcome::Defeat,
        trophy_delta: 0
    }));
    assert_eq!(app.wallet().amount(ResourceType::Coins), 110);
    assert_eq!(app.latest_rewards().resource(ResourceType::Coins), 10);
    assert_eq!(app.level().experience(), 10);
}

#[test]
fn listeners_observe_events_even_when_one_fails() {
    let mut app = app();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let _ = app.subscribe(|_| bail!("always failing"));
    let sink = Rc::clone(&seen);
    let _ = app.subscribe(move |event| {
        sink.borrow_mut().push(event.clone());
        Ok(())
    });

    let _ = app.submit(Command::StartBattle);

    let seen = seen.borrow();
    assert_eq!(seen.first(), Some(&Event::BattleStarted));
    assert!(seen
        .iter()
        .any(|event| matches!(event, Event::BattleTimeChanged { .. })));
}

#[test]
fn unsubscribed_listener_stops_receiving_events() {
    let mut app = app();
    let calls = Rc::new(RefCell::new(0_u32));
    let counter = Rc::clone(&calls);
    let id = app.subscribe(move |_| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    let _ = app.submit(Command::StartBattle);
    let after_start = *calls.borrow();
    assert!(app.unsubscribe(id));
    let _ = app.submit(Command::EndBattle { player_won: true });

    assert!(after_start > 0);
    assert_eq!(*calls.borrow(), after_start);
}

#[test]
fn upgrade_without_copies_keeps_coins() {
    let mut app = app();

    let error = app.upgrade_card(CardId::new(0)).expect_err("one copy only");

    assert!(format!("{error:#}").contains("card 0"));
    assert_eq!(app.wallet().amount(ResourceType::Coins), 100);
}

#[test]
fn upgrade_spends_coins_and_copies() {
    let mut app = app();
    register_copy(&mut app, CardId::new(0));

    let level = app.upgrade_card(CardId::new(0)).expect("affordable upgrade");

    assert_eq!(level, 2);
    assert_eq!(app.wallet().amount(ResourceType::Coins), 0);
    let card = query::card(app.world(), CardId::new(0)).expect("known card");
    assert_eq!(card.owned(), 0);
    assert_eq!(card.upgrade_cost(), 400);
}

#[test]
fn unaffordable_upgrade_keeps_copies() {
    let mut app = App::from_save(
        Config::new(1),
        SaveData {
            coins: 99,
            ..SaveData::default()
        },
    );
    register_copy(&mut app, CardId::new(2));

    let error = app.upgrade_card(CardId::new(2)).expect_err("too expensive");

    assert!(format!("{error}").contains("costs 100 coins"));
    assert_eq!(app.wallet().amount(ResourceType::Coins), 99);
    let card = query::card(app.world(), CardId::new(2)).expect("known card");
    assert_eq!(card.level(), 1);
    assert_eq!(card.owned(), 2);
}

#[test]
fn unknown_card_cannot_be_upgraded() {
    let mut app = app();
    assert!(app.upgrade_card(CardId::new(404)).is_err());
    assert_eq!(app.wallet().amount(ResourceType::Coins), 100);
}

#[test]
fn empty_store_starts_a_new_player() {
    let store = MemoryStore::new();

    let app = App::load(Config::new(3), &store).expect("load succeeds");

    assert_eq!(app.wallet().amount(ResourceType::Coins), 100);
    assert_eq!(app.wallet().amount(ResourceType::Gems), 5);
    assert_eq!(query::trophies(app.world()), 0);
    assert_eq!(app.level().level(), 1);
}

#[test]
fn progression_survives_a_save_and_load() {
    let mut app = app();
    let _ = app.submit(Command::StartBattle);
    let _ = app.submit(Command::EndBattle { player_won: true });
    let mut store = MemoryStore::new();

    app.save(&mut store).expect("save succeeds");
    let restored = App::load(Config::new(7), &store).expect("load succeeds");

    assert_eq!(restored.save_data(), app.save_data());
}

#[test]
fn json_store_restores_recomputed_arena() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let mut store = JsonFileStore::new(dir.path().join("player.json"));
    store
        .save(&SaveData {
            battle: BattleRecord {
                trophies: 650,
                arena_level: 9,
                ..BattleRecord::default()
            },
            coins: 12,
            gems: 1,
            player_level: 4,
            experience: 5,
        })
        .expect("save succeeds");

    let app = App::load(Config::new(3), &store).expect("load succeeds");

    assert_eq!(query::arena_level(app.world()), 3);
    assert_eq!(query::deck(app.world()).len(), 8);
    assert_eq!(app.wallet().amount(ResourceType::Coins), 12);
    assert_eq!(app.level().level(), 4);
}

fn stored_card(id: u32, level: u32, cost: u32, owned: u32, required: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": format!("Stored {id}"),
        "level": level,
        "cost": cost,
        "kind": "Troop",
        "stats": {
            "damage": 10,
            "health": 100,
            "attack_speed": 1.0,
            "range": 1.0,
            "movement_speed": 1.0,
            "flying": false,
            "splash": false,
            "splash_radius": 0.0
        },
        "owned": owned,
        "required_for_upgrade": required
    })
}

#[test]
fn corrupt_saved_cards_load_with_valid_progress() {
    let save = serde_json::json!({
        "battle": {
            "trophies": 0,
            "arena_level": 1,
            "cards": [stored_card(0, 0, 0, 0, 0), stored_card(1, u32::MAX, 2, 0, 1)],
            "deck": []
        },
        "coins": 1000,
        "gems": 0,
        "player_level": 1,
        "experience": 0
    });
    let data: SaveData = serde_json::from_value(save).expect("well-formed save");
    let mut app = App::from_save(Config::new(9), data);

    let zeroed = query::card(app.world(), CardId::new(0)).expect("restored card");
    assert_eq!(
        (zeroed.level(), zeroed.cost(), zeroed.required_for_upgrade()),
        (1, 1, 1)
    );
    assert!(!zeroed.can_upgrade());
    assert_eq!(
        query::upgrade_cost(app.world(), CardId::new(1)),
        Ok(u64::MAX)
    );

    assert!(app.upgrade_card(CardId::new(0)).is_err());
    assert_eq!(app.wallet().amount(ResourceType::Coins), 1000);

    let _ = app.submit(Command::StartBattle);
    let played = app.submit(Command::PlayCard {
        slot: 0,
        position: ArenaPoint::default(),
    });
    assert!(played.iter().any(|event| matches!(
        event,
        Event::CardPlayed { card, .. } if *card == CardId::new(0)
    )));
    assert!((query::session(app.world()).elixir - 4.0).abs() < f32::EPSILON);
}

#[test]
fn adjusted_config_reaches_world_and_regeneration() {
    let world = WorldConfig::new(6)
        .with_battle_duration(Duration::from_secs(3))
        .with_towers_per_side(1);
    let config = Config::new(6)
        .with_world(world)
        .with_regeneration_interval(Duration::from_millis(500));
    let mut app = App::new(config);
    let _ = app.submit(Command::StartBattle);

    let events = app.submit(Command::Tick {
        dt: Duration::from_secs(2),
    });

    let regenerated = events
        .iter()
        .filter(|event| matches!(event, Event::ElixirChanged { .. }))
        .count();
    assert_eq!(regenerated, 4);
    assert_eq!(query::session(app.world()).remaining, Duration::from_secs(1));

    let razed = app.submit(Command::DestroyTower {
        side: TowerSide::Enemy,
    });
    assert!(razed.contains(&Event::BattleEnded {
        outcome: BattleOutcome::Victory
    }));
}
