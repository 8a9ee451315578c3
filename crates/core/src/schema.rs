//! Column schema for decoded tick streams.
//!
//! Decoders expose a varying set of fields depending on their version. The
//! pipeline checks that set once, at normalization entry, and works against the
//! resulting [`Capabilities`] from then on.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A field the telemetry decoder can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "tick")]
    Tick,
    #[serde(rename = "X")]
    X,
    #[serde(rename = "Y")]
    Y,
    #[serde(rename = "health")]
    Health,
    #[serde(rename = "weapon_name")]
    WeaponName,
    #[serde(rename = "is_freeze_period")]
    IsFreezePeriod,
    #[serde(rename = "is_warmup_period")]
    IsWarmupPeriod,
    #[serde(rename = "team_name")]
    TeamName,
    #[serde(rename = "round_win_status")]
    RoundWinStatus,
    #[serde(rename = "round_win_reason")]
    RoundWinReason,
    #[serde(rename = "round_start_time")]
    RoundStartTime,
    #[serde(rename = "game_time")]
    GameTime,
    #[serde(rename = "total_rounds_played")]
    TotalRoundsPlayed,
    #[serde(rename = "current_equip_value")]
    CurrentEquipValue,
    #[serde(rename = "is_bomb_planted")]
    IsBombPlanted,
    #[serde(rename = "steamid")]
    SteamId,
    #[serde(rename = "name")]
    Name,
}

impl Column {
    /// Field name as the decoder knows it.
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Tick => "tick",
            Column::X => "X",
            Column::Y => "Y",
            Column::Health => "health",
            Column::WeaponName => "weapon_name",
            Column::IsFreezePeriod => "is_freeze_period",
            Column::IsWarmupPeriod => "is_warmup_period",
            Column::TeamName => "team_name",
            Column::RoundWinStatus => "round_win_status",
            Column::RoundWinReason => "round_win_reason",
            Column::RoundStartTime => "round_start_time",
            Column::GameTime => "game_time",
            Column::TotalRoundsPlayed => "total_rounds_played",
            Column::CurrentEquipValue => "current_equip_value",
            Column::IsBombPlanted => "is_bomb_planted",
            Column::SteamId => "steamid",
            Column::Name => "name",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields requested from the decoder for round reconstruction.
pub const REQUESTED_COLUMNS: &[Column] = &[
    Column::Tick,
    Column::X,
    Column::Y,
    Column::Health,
    Column::WeaponName,
    Column::IsFreezePeriod,
    Column::IsWarmupPeriod,
    Column::TeamName,
    Column::RoundWinStatus,
    Column::RoundWinReason,
    Column::RoundStartTime,
    Column::GameTime,
    Column::TotalRoundsPlayed,
    Column::CurrentEquipValue,
    Column::IsBombPlanted,
    Column::SteamId,
    Column::Name,
];

/// Columns without which a stream cannot be processed at all.
/// The identity column is checked separately against the preference list.
pub const REQUIRED_COLUMNS: &[Column] = &[
    Column::Tick,
    Column::X,
    Column::Y,
    Column::GameTime,
    Column::RoundStartTime,
    Column::TotalRoundsPlayed,
    Column::TeamName,
];

/// Set of columns present in a decoded stream.
pub type ColumnSet = BTreeSet<Column>;

/// Column used to identify a player in rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityColumn {
    /// Stable numeric id.
    #[serde(rename = "steamid")]
    SteamId,
    /// Display name.
    Name,
}

impl IdentityColumn {
    /// The decoder column backing this identity.
    pub fn column(self) -> Column {
        match self {
            IdentityColumn::SteamId => Column::SteamId,
            IdentityColumn::Name => Column::Name,
        }
    }
}

/// What a particular decoded stream can offer the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Column used for player identity.
    pub identity: IdentityColumn,
    pub has_freeze_flag: bool,
    pub has_warmup_flag: bool,
    pub has_equip_value: bool,
    pub has_win_status: bool,
    pub has_win_reason: bool,
    pub has_health: bool,
    pub has_weapon: bool,
    pub has_bomb_flag: bool,
    pub has_player_name: bool,
}

/// Capability check performed once per stream.
pub struct Schema;

impl Schema {
    /// Verify required columns and resolve optional capabilities.
    ///
    /// The identity column is the first entry of `identity_preference` present
    /// in `columns`.
    pub fn check(
        columns: &ColumnSet,
        identity_preference: &[IdentityColumn],
    ) -> Result<Capabilities> {
        if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !columns.contains(*c)) {
            return Err(Error::MissingColumn(*missing));
        }

        let identity = identity_preference
            .iter()
            .copied()
            .find(|id| columns.contains(&id.column()))
            .ok_or_else(|| {
                let wanted = identity_preference
                    .first()
                    .map(|id| id.column())
                    .unwrap_or(Column::SteamId);
                Error::MissingColumn(wanted)
            })?;

        Ok(Capabilities {
            identity,
            has_freeze_flag: columns.contains(&Column::IsFreezePeriod),
            has_warmup_flag: columns.contains(&Column::IsWarmupPeriod),
            has_equip_value: columns.contains(&Column::CurrentEquipValue),
            has_win_status: columns.contains(&Column::RoundWinStatus),
            has_win_reason: columns.contains(&Column::RoundWinReason),
            has_health: columns.contains(&Column::Health),
            has_weapon: columns.contains(&Column::WeaponName),
            has_bomb_flag: columns.contains(&Column::IsBombPlanted),
            has_player_name: columns.contains(&Column::Name),
        })
    }
}
