//! Tick normalization.
//!
//! Turns a raw decoded stream into the canonical [`TickStream`]:
//! - checks the column schema once and records capabilities
//! - derives `seconds_elapsed_in_round` and drops the source time fields
//! - resolves player identity from the preferred column
//! - interns categorical labels (`team_name`, `weapon_name`)
//! - orders rows by `(total_rounds_played, tick, team_name)`

use rounds_core::{
    Capabilities, Error, IdentityColumn, RawTick, RawTickStream, Result, RoundIndex, Schema,
    TickRecord, TickStream,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Interns repeated categorical strings so rows share one allocation per label.
#[derive(Debug, Default)]
pub struct CategoryPool {
    values: HashMap<String, Arc<str>>,
}

impl CategoryPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle for a label.
    pub fn intern(&mut self, value: &str) -> Arc<str> {
        if let Some(existing) = self.values.get(value) {
            return Arc::clone(existing);
        }
        let shared: Arc<str> = Arc::from(value);
        self.values.insert(value.to_string(), Arc::clone(&shared));
        shared
    }

    /// Number of distinct labels seen.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Normalizer for raw tick streams.
pub struct TickNormalizer {
    identity_preference: Vec<IdentityColumn>,
}

impl TickNormalizer {
    /// Create a normalizer with an identity column preference order.
    pub fn new(identity_preference: Vec<IdentityColumn>) -> Self {
        Self { identity_preference }
    }

    /// Normalize a raw stream.
    ///
    /// Fails with `MissingColumn` when a required column is absent, and with a
    /// data error when a row lacks its tick or round index.
    pub fn normalize(&self, raw: RawTickStream) -> Result<TickStream> {
        let capabilities = Schema::check(&raw.columns, &self.identity_preference)?;

        let mut teams = CategoryPool::new();
        let mut weapons = CategoryPool::new();
        let mut ticks = Vec::with_capacity(raw.rows.len());

        for row in raw.rows {
            ticks.push(normalize_row(row, &capabilities, &mut teams, &mut weapons)?);
        }

        ticks.sort_by(|a, b| {
            let key_a = (a.total_rounds_played, a.tick, &a.team_name);
            key_a.cmp(&(b.total_rounds_played, b.tick, &b.team_name))
        });

        debug!(
            rows = ticks.len(),
            teams = teams.len(),
            weapons = weapons.len(),
            identity = ?capabilities.identity,
            "normalized tick stream"
        );

        Ok(TickStream { capabilities, ticks })
    }
}

fn normalize_row(
    row: RawTick,
    caps: &Capabilities,
    teams: &mut CategoryPool,
    weapons: &mut CategoryPool,
) -> Result<TickRecord> {
    let tick = row.tick.ok_or_else(|| Error::data("row without a tick index"))?;
    let round = row
        .total_rounds_played
        .ok_or_else(|| Error::data(format!("tick {} has no total_rounds_played", tick)))?;
    let total_rounds_played = RoundIndex::try_from(round)
        .map_err(|_| Error::data(format!("tick {} has invalid round index {}", tick, round)))?;

    let seconds_elapsed_in_round = match (row.game_time, row.round_start_time) {
        (Some(game_time), Some(start)) => (game_time - start).max(0.0),
        _ => 0.0,
    };

    let identity = match caps.identity {
        IdentityColumn::SteamId => row.steamid.map(|id| id.to_string()),
        IdentityColumn::Name => row.name.clone(),
    };

    Ok(TickRecord {
        tick,
        total_rounds_played,
        team_name: row.team_name.as_deref().map(|t| teams.intern(t)),
        identity,
        player_name: if caps.has_player_name { row.name } else { None },
        x: row.x,
        y: row.y,
        health: row.health.filter(|_| caps.has_health),
        weapon_name: row
            .weapon_name
            .as_deref()
            .filter(|_| caps.has_weapon)
            .map(|w| weapons.intern(w)),
        is_freeze_period: row.is_freeze_period.filter(|_| caps.has_freeze_flag),
        is_warmup_period: row.is_warmup_period.filter(|_| caps.has_warmup_flag),
        is_bomb_planted: row.is_bomb_planted.filter(|_| caps.has_bomb_flag),
        current_equip_value: row.current_equip_value.filter(|_| caps.has_equip_value),
        round_win_status: row.round_win_status.filter(|_| caps.has_win_status).unwrap_or(0),
        round_win_reason: row.round_win_reason.filter(|_| caps.has_win_reason).unwrap_or(0),
        seconds_elapsed_in_round,
    })
}
