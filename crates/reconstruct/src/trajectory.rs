//! Per-round player trajectories for replay viewers.

use rounds_core::{Tick, TickRecord, TickStream};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sampling options for [`build_trajectories`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryOptions {
    /// Keep only ticks divisible by this value; 0 and 1 keep everything.
    pub every_n_ticks: u32,
    /// Skip rows whose health is known and not positive.
    pub alive_only: bool,
}

impl Default for TrajectoryOptions {
    fn default() -> Self {
        Self {
            every_n_ticks: 1,
            alive_only: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub tick: Tick,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerTrack {
    pub id: String,
    pub name: String,
    pub positions: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTrajectory {
    /// 1-based round number.
    pub round: u32,
    pub players: Vec<PlayerTrack>,
}

/// Group positions by round and player.
///
/// Rows without an identity or without coordinates are skipped. Players are
/// ordered by identity and positions by tick.
pub fn build_trajectories(
    stream: &TickStream,
    options: &TrajectoryOptions,
) -> Vec<RoundTrajectory> {
    let step = i64::from(options.every_n_ticks.max(1));

    stream
        .by_round()
        .into_iter()
        .filter_map(|(round_index, ticks)| {
            let mut players: BTreeMap<&str, PlayerTrack> = BTreeMap::new();

            for t in ticks {
                if t.tick % step != 0 || (options.alive_only && !is_alive(t)) {
                    continue;
                }
                let (Some(id), Some(x), Some(y)) = (t.identity.as_deref(), t.x, t.y) else {
                    continue;
                };
                let track = players.entry(id).or_insert_with(|| PlayerTrack {
                    id: id.to_string(),
                    name: t.player_name.clone().unwrap_or_else(|| id.to_string()),
                    positions: Vec::new(),
                });
                track.positions.push(Position { tick: t.tick, x, y });
            }

            if players.is_empty() {
                return None;
            }
            let players = players
                .into_values()
                .map(|mut track| {
                    track.positions.sort_by_key(|p| p.tick);
                    track
                })
                .collect();
            Some(RoundTrajectory {
                round: round_index + 1,
                players,
            })
        })
        .collect()
}

fn is_alive(tick: &TickRecord) -> bool {
    tick.health.map_or(true, |h| h > 0)
}
