//! Scripted opponents used to play a battle from the command line.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::ValueEnum;
use farm_royale_app::App;
use farm_royale_core::{ArenaPoint, BattleOutcome, Command, Event, TowerSide, BATTLE_DURATION};
use farm_royale_world::query;
use log::debug;

const PLAY_INTERVAL: Duration = Duration::from_secs(2);
const SIEGE_START: Duration = Duration::from_secs(30);
const SIEGE_INTERVAL: Duration = Duration::from_secs(20);

/// How the scripted battle is meant to end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Strategy {
    /// Raze the enemy towers.
    Win,
    /// Lose every player tower.
    Lose,
    /// Leave the towers standing until the countdown expires.
    Timeout,
}

impl Strategy {
    const fn siege_target(self) -> Option<TowerSide> {
        match self {
            Self::Win => Some(TowerSide::Enemy),
            Self::Lose => Some(TowerSide::Player),
            Self::Timeout => None,
        }
    }
}

/// What happened during a scripted battle.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BattleReport {
    pub(crate) outcome: BattleOutcome,
    pub(crate) trophy_delta: i32,
    pub(crate) cards_played: u32,
    pub(crate) elapsed: Duration,
}

/// Plays one battle frame by frame, spending elixir on the cheapest affordable card.
pub(crate) fn run(app: &mut App, strategy: Strategy, frame: Duration) -> Result<BattleReport> {
    if frame.is_zero() {
        bail!("frame length must be positive");
    }

    let mut events = app.submit(Command::StartBattle);
    if !query::is_active(app.world()) {
        bail!("battle did not start");
    }

    let mut elapsed = Duration::ZERO;
    let mut next_play = PLAY_INTERVAL;
    let mut next_siege = SIEGE_START;
    let mut cards_played = 0;
    let frame_limit = BATTLE_DURATION.as_millis() / frame.as_millis().max(1) + 2;
    let mut frames: u128 = 0;

    while query::is_active(app.world()) {
        if frames > frame_limit {
            bail!("battle did not end after {frames} frames");
        }
        frames += 1;

        elapsed = elapsed.saturating_add(frame);
        events.extend(app.submit(Command::Tick { dt: frame }));

        if elapsed >= next_play {
            next_play = next_play.saturating_add(PLAY_INTERVAL);
            if let Some(slot) = cheapest_affordable_slot(app) {
                let played = app.submit(Command::PlayCard {
                    slot,
                    position: ArenaPoint::new(slot as f32, 8.0),
                });
                if played
                    .iter()
                    .any(|event| matches!(event, Event::CardPlayed { .. }))
                {
                    cards_played += 1;
                }
                events.extend(played);
            }
        }

        if let Some(side) = strategy.siege_target() {
            if elapsed >= next_siege && query::is_active(app.world()) {
                next_siege = next_siege.saturating_add(SIEGE_INTERVAL);
                debug!("scripted opponent destroys a {side:?} tower");
                events.extend(app.submit(Command::DestroyTower { side }));
            }
        }
    }

    let settled = events.iter().rev().find_map(|event| match event {
        Event::BattleSettled {
            outcome,
            trophy_delta,
        } => Some((*outcome, *trophy_delta)),
        _ => None,
    });
    let Some((outcome, trophy_delta)) = settled else {
        bail!("battle ended without a settlement");
    };

    Ok(BattleReport {
        outcome,
        trophy_delta,
        cards_played,
        elapsed,
    })
}

fn cheapest_affordable_slot(app: &App) -> Option<usize> {
    let elixir = query::session(app.world()).elixir;
    query::hand(app.world())
        .iter()
        .filter(|slot| slot.cost as f32 <= elixir)
        .min_by_key(|slot| (slot.cost, slot.slot))
        .map(|slot| slot.slot)
}
