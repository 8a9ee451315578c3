//! Core data types for the round reconstruction pipeline.

use crate::config::NONE_CODE;
use crate::error::FailureKind;
use crate::schema::{Capabilities, ColumnSet};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Zero-based round index as reported by `total_rounds_played`.
pub type RoundIndex = u32;

/// Decoder tick index.
pub type Tick = i64;

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Integer field that also accepts integral floats such as `100.0`, which
/// dataframe exports write for nullable integer columns.
fn integral<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + TryFrom<u64>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let value = if let Some(v) = number.as_u64() {
        <T as TryFrom<u64>>::try_from(v).ok()
    } else if let Some(v) = number.as_i64() {
        <T as TryFrom<i64>>::try_from(v).ok()
    } else {
        number
            .as_f64()
            .filter(|v| v.fract() == 0.0 && v.abs() <= MAX_EXACT_FLOAT)
            .and_then(|v| <T as TryFrom<i64>>::try_from(v as i64).ok())
    };
    value
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("expected an integer, found {}", number)))
}

/// One decoded row exactly as the decoder produced it. Any value may be null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTick {
    #[serde(deserialize_with = "integral")]
    pub tick: Option<Tick>,
    #[serde(rename = "X")]
    pub x: Option<f64>,
    #[serde(rename = "Y")]
    pub y: Option<f64>,
    #[serde(deserialize_with = "integral")]
    pub health: Option<i32>,
    pub weapon_name: Option<String>,
    pub is_freeze_period: Option<bool>,
    pub is_warmup_period: Option<bool>,
    pub team_name: Option<String>,
    #[serde(deserialize_with = "integral")]
    pub round_win_status: Option<i32>,
    #[serde(deserialize_with = "integral")]
    pub round_win_reason: Option<i32>,
    pub round_start_time: Option<f64>,
    pub game_time: Option<f64>,
    #[serde(deserialize_with = "integral")]
    pub total_rounds_played: Option<i64>,
    #[serde(deserialize_with = "integral")]
    pub current_equip_value: Option<i64>,
    pub is_bomb_planted: Option<bool>,
    #[serde(deserialize_with = "integral")]
    pub steamid: Option<u64>,
    pub name: Option<String>,
}

/// A decoded tick stream: the columns the decoder provided plus the rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTickStream {
    pub columns: ColumnSet,
    pub rows: Vec<RawTick>,
}

/// Match metadata returned by the decoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoHeader {
    pub map_name: Option<String>,
    /// Source file, attached by the pipeline.
    #[serde(default)]
    pub demo_path: Option<PathBuf>,
    /// Background image for the map, attached from the asset catalog.
    #[serde(default)]
    pub map_png_path: Option<PathBuf>,
    /// Any other header fields, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One normalized observation of one player at one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickRecord {
    pub tick: Tick,
    pub total_rounds_played: RoundIndex,
    /// Interned side label.
    pub team_name: Option<Arc<str>>,
    /// Player identity from the preferred identity column.
    pub identity: Option<String>,
    /// Display name, when the decoder provides one.
    pub player_name: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub health: Option<i32>,
    /// Interned weapon name.
    pub weapon_name: Option<Arc<str>>,
    pub is_freeze_period: Option<bool>,
    pub is_warmup_period: Option<bool>,
    pub is_bomb_planted: Option<bool>,
    pub current_equip_value: Option<i64>,
    /// Win status code, 0 when no event occurred on this tick.
    pub round_win_status: i32,
    /// Win reason code, 0 when no event occurred on this tick.
    pub round_win_reason: i32,
    /// `max(0, game_time - round_start_time)`.
    pub seconds_elapsed_in_round: f64,
}

impl TickRecord {
    /// Whether this tick carries a round win event.
    #[inline]
    pub fn has_win_event(&self) -> bool {
        self.round_win_status != NONE_CODE || self.round_win_reason != NONE_CODE
    }

    #[inline]
    pub fn in_freeze(&self) -> bool {
        self.is_freeze_period == Some(true)
    }

    /// Explicitly flagged as outside the freeze period.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.is_freeze_period == Some(false)
    }

    #[inline]
    pub fn in_warmup(&self) -> bool {
        self.is_warmup_period == Some(true)
    }
}

/// Normalized tick stream with the capabilities of its source.
#[derive(Debug, Clone)]
pub struct TickStream {
    pub capabilities: Capabilities,
    pub ticks: Vec<TickRecord>,
}

impl TickStream {
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Sorted distinct round indices present in the stream.
    pub fn round_indices(&self) -> BTreeSet<RoundIndex> {
        self.ticks.iter().map(|t| t.total_rounds_played).collect()
    }

    /// Highest round index in the stream.
    pub fn max_round(&self) -> Option<RoundIndex> {
        self.ticks.iter().map(|t| t.total_rounds_played).max()
    }

    /// Rows grouped by round index, preserving stream order within a round.
    pub fn by_round(&self) -> BTreeMap<RoundIndex, Vec<&TickRecord>> {
        let mut groups: BTreeMap<RoundIndex, Vec<&TickRecord>> = BTreeMap::new();
        for tick in &self.ticks {
            groups.entry(tick.total_rounds_played).or_default().push(tick);
        }
        groups
    }
}

/// One of the two competing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Ct,
    T,
}

/// Reconstructed result of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round_index: RoundIndex,
    /// Win status code, never the none sentinel once accepted.
    pub winner: i32,
    pub reason: i32,
}

/// Resolved outcomes keyed by round index. Unresolved rounds are absent.
pub type OutcomeMap = BTreeMap<RoundIndex, RoundOutcome>;

/// Inclusive tick range kept for one round after boundary filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundWindow {
    pub round_index: RoundIndex,
    pub first_tick: Tick,
    pub last_tick: Tick,
}

impl RoundWindow {
    pub fn contains(&self, tick: Tick) -> bool {
        tick >= self.first_tick && tick <= self.last_tick
    }
}

/// One accepted round, flattened for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// 1-based round number (`total_rounds_played + 1`).
    pub round: u32,
    pub round_winner: i32,
    pub round_reason: i32,
    pub team_ct_name: String,
    pub team_t_name: String,
    /// Ordered, de-duplicated roster.
    pub team_ct_players: Vec<String>,
    pub team_t_players: Vec<String>,
    /// `None` when the equipment column was not measured.
    pub team_ct_current_equip_value: Option<u64>,
    pub team_t_current_equip_value: Option<u64>,
    pub map_name: Option<String>,
}

impl RoundSummary {
    /// Equipment total for one side.
    pub fn equip_value(&self, side: Side) -> Option<u64> {
        match side {
            Side::Ct => self.team_ct_current_equip_value,
            Side::T => self.team_t_current_equip_value,
        }
    }

    /// Roster for one side.
    pub fn roster(&self, side: Side) -> &[String] {
        match side {
            Side::Ct => &self.team_ct_players,
            Side::T => &self.team_t_players,
        }
    }
}

/// Outcome of running the pipeline over one match file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchResult {
    Accepted {
        path: PathBuf,
        map_name: Option<String>,
        rounds: Vec<RoundSummary>,
    },
    Rejected {
        path: PathBuf,
        kind: FailureKind,
        message: String,
    },
}

impl MatchResult {
    pub fn path(&self) -> &PathBuf {
        match self {
            MatchResult::Accepted { path, .. } | MatchResult::Rejected { path, .. } => path,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, MatchResult::Accepted { .. })
    }

    /// Rows contributed by this match; empty when rejected.
    pub fn rounds(&self) -> &[RoundSummary] {
        match self {
            MatchResult::Accepted { rounds, .. } => rounds,
            MatchResult::Rejected { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tick(tick: Tick, round: RoundIndex) -> TickRecord {
        TickRecord {
            tick,
            total_rounds_played: round,
            team_name: None,
            identity: None,
            player_name: None,
            x: None,
            y: None,
            health: None,
            weapon_name: None,
            is_freeze_period: None,
            is_warmup_period: None,
            is_bomb_planted: None,
            current_equip_value: None,
            round_win_status: 0,
            round_win_reason: 0,
            seconds_elapsed_in_round: 0.0,
        }
    }

    #[test]
    fn test_raw_tick_accepts_integral_floats() {
        let row: RawTick = serde_json::from_str(
            r#"{"tick": 12.0, "health": 100.0, "round_win_status": 3.0, "round_win_reason": null,
                "total_rounds_played": 2, "current_equip_value": 4200.0,
                "steamid": 76561198000000000, "X": 1.5}"#,
        )
        .unwrap();

        assert_eq!(row.tick, Some(12));
        assert_eq!(row.health, Some(100));
        assert_eq!(row.round_win_status, Some(3));
        assert_eq!(row.round_win_reason, None);
        assert_eq!(row.total_rounds_played, Some(2));
        assert_eq!(row.current_equip_value, Some(4200));
        assert_eq!(row.steamid, Some(76561198000000000));
        assert_eq!(row.x, Some(1.5));
        assert_eq!(row.game_time, None);
    }

    #[test]
    fn test_raw_tick_rejects_fractional_or_out_of_range_integers() {
        assert!(serde_json::from_str::<RawTick>(r#"{"health": 99.5}"#).is_err());
        assert!(serde_json::from_str::<RawTick>(r#"{"health": 4294967296}"#).is_err());
        assert!(serde_json::from_str::<RawTick>(r#"{"steamid": -1}"#).is_err());
        assert!(serde_json::from_str::<RawTick>(r#"{"tick": "12"}"#).is_err());
    }

    #[test]
    fn test_win_event_detection() {
        let mut tick = make_tick(10, 0);
        assert!(!tick.has_win_event());
        tick.round_win_reason = 9;
        assert!(tick.has_win_event());
        tick.round_win_reason = 0;
        tick.round_win_status = 3;
        assert!(tick.has_win_event());
    }

    #[test]
    fn test_freeze_flags_treat_null_as_unknown() {
        let mut tick = make_tick(10, 0);
        assert!(!tick.in_freeze());
        assert!(!tick.is_live());
        tick.is_freeze_period = Some(false);
        assert!(tick.is_live());
    }

    #[test]
    fn test_raw_tick_from_partial_json() {
        let raw: RawTick =
            serde_json::from_str(r#"{"tick": 5, "X": 1.5, "team_name": "CT"}"#).unwrap();
        assert_eq!(raw.tick, Some(5));
        assert_eq!(raw.x, Some(1.5));
        assert_eq!(raw.team_name.as_deref(), Some("CT"));
        assert!(raw.current_equip_value.is_none());
    }

    #[test]
    fn test_match_result_rounds_empty_when_rejected() {
        let rejected = MatchResult::Rejected {
            path: PathBuf::from("a.json"),
            kind: FailureKind::NoResolvedOutcome,
            message: "none".to_string(),
        };
        assert!(!rejected.is_accepted());
        assert!(rejected.rounds().is_empty());

        let json = serde_json::to_value(&rejected).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["kind"], "no_resolved_outcome");
    }

    #[test]
    fn test_round_window_contains() {
        let window = RoundWindow { round_index: 0, first_tick: 100, last_tick: 200 };
        assert!(window.contains(100));
        assert!(window.contains(200));
        assert!(!window.contains(201));
    }
}
