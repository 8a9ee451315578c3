//! Per-round summaries.
//!
//! Each round is summarized at a single representative tick, chosen as:
//! 1. the earliest live tick (`is_freeze_period == false`)
//! 2. else the earliest tick past the "spawned" threshold
//! 3. else the round's earliest tick
//!
//! Equipment values are cumulative per player, so the side totals are summed
//! over the rows at that tick only.

use rounds_core::config::{PipelineConfig, SideLabels, NONE_CODE};
use rounds_core::{OutcomeMap, RoundSummary, Side, Tick, TickRecord, TickStream};
use std::collections::HashSet;
use tracing::debug;

/// Builds one [`RoundSummary`] per round of a boundary-filtered stream.
pub struct RoundSummaryBuilder {
    sides: SideLabels,
    min_elapsed_seconds: f64,
}

impl RoundSummaryBuilder {
    /// Create a builder from the pipeline configuration.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            sides: config.sides.clone(),
            min_elapsed_seconds: config.min_elapsed_seconds,
        }
    }

    /// Representative tick of one round's rows.
    pub fn representative_tick(&self, ticks: &[&TickRecord], has_freeze: bool) -> Option<Tick> {
        let live = if has_freeze { earliest(ticks, |t| t.is_live()) } else { None };
        live.or_else(|| earliest(ticks, |t| t.seconds_elapsed_in_round > self.min_elapsed_seconds))
            .or_else(|| earliest(ticks, |_| true))
    }

    /// Summaries sorted by round number. Winner and reason default to the none
    /// sentinel for rounds missing from `outcomes`.
    pub fn build(&self, stream: &TickStream, outcomes: &OutcomeMap) -> Vec<RoundSummary> {
        let has_freeze = stream.capabilities.has_freeze_flag;
        let has_equip = stream.capabilities.has_equip_value;

        let mut rows = Vec::new();
        for (round_index, ticks) in stream.by_round() {
            let Some(rep_tick) = self.representative_tick(&ticks, has_freeze) else {
                continue;
            };
            let at_tick: Vec<&TickRecord> =
                ticks.into_iter().filter(|t| t.tick == rep_tick).collect();

            let ct_rows = self.side_rows(&at_tick, Side::Ct);
            let t_rows = self.side_rows(&at_tick, Side::T);

            let (winner, reason) = outcomes
                .get(&round_index)
                .map(|o| (o.winner, o.reason))
                .unwrap_or((NONE_CODE, NONE_CODE));

            rows.push(RoundSummary {
                round: round_index + 1,
                round_winner: winner,
                round_reason: reason,
                team_ct_name: self.sides.ct.clone(),
                team_t_name: self.sides.t.clone(),
                team_ct_players: unique_roster(&ct_rows),
                team_t_players: unique_roster(&t_rows),
                team_ct_current_equip_value: has_equip.then(|| equip_total(&ct_rows)),
                team_t_current_equip_value: has_equip.then(|| equip_total(&t_rows)),
                map_name: None,
            });
        }

        debug!(rounds = rows.len(), "built round summaries");
        rows
    }

    fn side_rows<'a>(&self, rows: &[&'a TickRecord], side: Side) -> Vec<&'a TickRecord> {
        rows.iter()
            .copied()
            .filter(|t| {
                t.team_name
                    .as_deref()
                    .and_then(|name| self.sides.side_of(name))
                    == Some(side)
            })
            .collect()
    }
}

fn earliest(ticks: &[&TickRecord], pred: impl Fn(&TickRecord) -> bool) -> Option<Tick> {
    ticks.iter().filter(|t| pred(**t)).map(|t| t.tick).min()
}

/// Order-preserving distinct identities, skipping null-like values.
fn unique_roster(rows: &[&TickRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|t| t.identity.as_deref())
        .filter(|id| !id.is_empty() && *id != "None")
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Sum of known equipment values, never negative.
fn equip_total(rows: &[&TickRecord]) -> u64 {
    let total: i64 = rows.iter().filter_map(|t| t.current_equip_value).sum();
    u64::try_from(total).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rounds_core::{Capabilities, IdentityColumn, RoundOutcome};
    use std::sync::Arc;

    fn caps(has_freeze: bool, has_equip: bool) -> Capabilities {
        Capabilities {
            identity: IdentityColumn::SteamId,
            has_freeze_flag: has_freeze,
            has_warmup_flag: true,
            has_equip_value: has_equip,
            has_win_status: true,
            has_win_reason: true,
            has_health: true,
            has_weapon: false,
            has_bomb_flag: false,
            has_player_name: false,
        }
    }

    fn make_tick(
        tick: i64,
        round: u32,
        team: &str,
        id: &str,
        freeze: bool,
        equip: i64,
    ) -> TickRecord {
        TickRecord {
            tick,
            total_rounds_played: round,
            team_name: Some(Arc::from(team)),
            identity: Some(id.to_string()),
            player_name: None,
            x: Some(0.0),
            y: Some(0.0),
            health: Some(100),
            weapon_name: None,
            is_freeze_period: Some(freeze),
            is_warmup_period: Some(false),
            is_bomb_planted: None,
            current_equip_value: Some(equip),
            round_win_status: 0,
            round_win_reason: 0,
            seconds_elapsed_in_round: 0.0,
        }
    }

    fn builder() -> RoundSummaryBuilder {
        RoundSummaryBuilder::new(&PipelineConfig::default())
    }

    fn outcomes(entries: &[(u32, i32, i32)]) -> OutcomeMap {
        entries
            .iter()
            .map(|&(round_index, winner, reason)| {
                let outcome = RoundOutcome {
                    round_index,
                    winner,
                    reason,
                };
                (round_index, outcome)
            })
            .collect()
    }

    #[test]
    fn test_summary_at_first_live_tick() {
        let stream = TickStream {
            capabilities: caps(true, true),
            ticks: vec![
                // Freeze time: partial purchases.
                make_tick(10, 0, "CT", "a", true, 200),
                make_tick(10, 0, "TERRORIST", "c", true, 200),
                // First live tick.
                make_tick(20, 0, "CT", "a", false, 2000),
                make_tick(20, 0, "CT", "b", false, 2000),
                make_tick(20, 0, "TERRORIST", "c", false, 1500),
                make_tick(20, 0, "TERRORIST", "d", false, 2000),
                // Later tick must not be summed in.
                make_tick(30, 0, "CT", "a", false, 9000),
            ],
        };
        let rows = builder().build(&stream, &outcomes(&[(0, 3, 8)]));

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.round, 1);
        assert_eq!(row.round_winner, 3);
        assert_eq!(row.round_reason, 8);
        assert_eq!(row.team_ct_players, vec!["a", "b"]);
        assert_eq!(row.team_t_players, vec!["c", "d"]);
        assert_eq!(row.team_ct_current_equip_value, Some(4000));
        assert_eq!(row.team_t_current_equip_value, Some(3500));
        assert_eq!(row.map_name, None);
    }

    #[test]
    fn test_representative_tick_fallbacks() {
        let b = builder();
        let mut early = make_tick(5, 0, "CT", "a", true, 0);
        let mut spawned = make_tick(8, 0, "CT", "a", true, 0);
        spawned.seconds_elapsed_in_round = 1.5;
        early.seconds_elapsed_in_round = 0.5;

        // Every tick is in freeze: fall back to elapsed seconds.
        assert_eq!(b.representative_tick(&[&early, &spawned], true), Some(8));

        // Nothing past the threshold: fall back to the earliest tick.
        spawned.seconds_elapsed_in_round = 0.9;
        assert_eq!(b.representative_tick(&[&spawned, &early], true), Some(5));

        // Without the freeze capability live flags are ignored.
        let live = make_tick(3, 0, "CT", "a", false, 0);
        assert_eq!(b.representative_tick(&[&live, &early], false), Some(3));
        assert_eq!(b.representative_tick(&[&live, &early], true), Some(3));
        assert_eq!(b.representative_tick(&[], true), None);
    }

    #[test]
    fn test_roster_deduplicated_and_skips_null_like() {
        let mut blank = make_tick(20, 0, "CT", "", false, 0);
        blank.identity = Some(String::new());
        let mut missing = make_tick(20, 0, "CT", "x", false, 0);
        missing.identity = None;
        let stream = TickStream {
            capabilities: caps(true, true),
            ticks: vec![
                make_tick(20, 0, "CT", "b", false, 100),
                make_tick(20, 0, "CT", "a", false, 100),
                make_tick(20, 0, "CT", "b", false, 100),
                make_tick(20, 0, "CT", "None", false, 100),
                blank,
                missing,
            ],
        };
        let rows = builder().build(&stream, &outcomes(&[(0, 2, 1)]));
        assert_eq!(rows[0].team_ct_players, vec!["b", "a"]);
        assert!(rows[0].team_t_players.is_empty());
    }

    #[test]
    fn test_equipment_unknown_without_column() {
        let stream = TickStream {
            capabilities: caps(true, false),
            ticks: vec![make_tick(20, 0, "CT", "a", false, 0)],
        };
        let rows = builder().build(&stream, &outcomes(&[(0, 3, 8)]));
        assert_eq!(rows[0].team_ct_current_equip_value, None);
        assert_eq!(rows[0].team_t_current_equip_value, None);
    }

    #[test]
    fn test_missing_outcome_defaults_to_none() {
        let stream = TickStream {
            capabilities: caps(true, true),
            ticks: vec![make_tick(20, 4, "CT", "a", false, 0)],
        };
        let rows = builder().build(&stream, &OutcomeMap::new());
        assert_eq!(rows[0].round, 5);
        assert_eq!(rows[0].round_winner, NONE_CODE);
        assert_eq!(rows[0].round_reason, NONE_CODE);
    }

    #[test]
    fn test_rows_sorted_by_round() {
        let stream = TickStream {
            capabilities: caps(true, true),
            ticks: vec![
                make_tick(50, 1, "CT", "a", false, 0),
                make_tick(20, 0, "CT", "a", false, 0),
            ],
        };
        let rows = builder().build(&stream, &outcomes(&[(0, 3, 8), (1, 2, 1)]));
        let rounds: Vec<u32> = rows.iter().map(|r| r.round).collect();
        assert_eq!(rounds, vec![1, 2]);
    }
}
