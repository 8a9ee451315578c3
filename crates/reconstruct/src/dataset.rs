//! Tick-level training rows.
//!
//! Expects a stream that has been integrated with round outcomes, so every
//! tick already carries its round's winner in `round_win_status`.

use rounds_core::config::PipelineConfig;
use rounds_core::{RoundIndex, Side, Tick, TickRecord, TickStream};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One player observation labelled with the outcome of its round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingTick {
    pub tick: Tick,
    pub total_rounds_played: RoundIndex,
    pub team_name: Option<String>,
    pub identity: Option<String>,
    #[serde(rename = "X")]
    pub x: Option<f64>,
    #[serde(rename = "Y")]
    pub y: Option<f64>,
    pub health: Option<i32>,
    pub weapon_name: Option<String>,
    pub is_bomb_planted: Option<bool>,
    pub seconds_elapsed_in_round: f64,
    /// Rows per side at this tick that are alive or of unknown health.
    pub ct_alive: u32,
    pub t_alive: u32,
    /// Winner code of the round this tick belongs to.
    pub target: i32,
    pub round_win_status_label: String,
    pub round_win_reason_label: String,
}

/// Build labelled rows for every tick in an integrated stream.
pub fn build_tick_dataset(stream: &TickStream, config: &PipelineConfig) -> Vec<TrainingTick> {
    let mut alive: HashMap<Tick, (u32, u32)> = HashMap::new();
    for tick in stream.ticks.iter().filter(|t| is_alive(t)) {
        let side = tick.team_name.as_deref().and_then(|n| config.sides.side_of(n));
        let counts = alive.entry(tick.tick).or_default();
        match side {
            Some(Side::Ct) => counts.0 += 1,
            Some(Side::T) => counts.1 += 1,
            None => {}
        }
    }

    stream
        .ticks
        .iter()
        .map(|t| {
            let (ct_alive, t_alive) = alive.get(&t.tick).copied().unwrap_or_default();
            TrainingTick {
                tick: t.tick,
                total_rounds_played: t.total_rounds_played,
                team_name: t.team_name.as_deref().map(str::to_string),
                identity: t.identity.clone(),
                x: t.x,
                y: t.y,
                health: t.health,
                weapon_name: t.weapon_name.as_deref().map(str::to_string),
                is_bomb_planted: t.is_bomb_planted,
                seconds_elapsed_in_round: t.seconds_elapsed_in_round,
                ct_alive,
                t_alive,
                target: t.round_win_status,
                round_win_status_label: config.codes.winner_label(t.round_win_status).to_string(),
                round_win_reason_label: config.codes.reason_label(t.round_win_reason).to_string(),
            }
        })
        .collect()
}

fn is_alive(tick: &TickRecord) -> bool {
    tick.health.map_or(true, |h| h > 0)
}
