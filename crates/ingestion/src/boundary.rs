//! Round boundary filtering.
//!
//! Drops the ticks of each round that precede its meaningful window (warmup,
//! pre-buy noise) while keeping the freeze/buy phase and live play. Every round
//! gets its own cutoff tick:
//! 1. earliest tick flagged `is_freeze_period`, if the stream has that flag
//! 2. else earliest tick more than `min_elapsed_seconds` into the round
//! 3. else the round's earliest tick

use rounds_core::{RoundIndex, RoundWindow, Tick, TickRecord, TickStream};
use std::collections::BTreeMap;
use tracing::debug;

/// Per-round cutoff filter.
pub struct RoundBoundaryFilter {
    min_elapsed_seconds: f64,
}

impl RoundBoundaryFilter {
    /// Create a filter using the given "spawned" threshold in seconds.
    pub fn new(min_elapsed_seconds: f64) -> Self {
        Self { min_elapsed_seconds }
    }

    /// Cutoff tick for every round in the stream. Warmup ticks are not considered.
    pub fn cutoff_ticks(&self, stream: &TickStream) -> BTreeMap<RoundIndex, Tick> {
        let has_freeze = stream.capabilities.has_freeze_flag;
        let mut cutoffs = BTreeMap::new();

        for (round, ticks) in stream.by_round() {
            let ticks: Vec<&TickRecord> = ticks.into_iter().filter(|t| !t.in_warmup()).collect();

            let freeze_start = if has_freeze {
                earliest(&ticks, |t| t.in_freeze())
            } else {
                None
            };
            let cutoff = freeze_start
                .or_else(|| {
                    earliest(&ticks, |t| t.seconds_elapsed_in_round > self.min_elapsed_seconds)
                })
                .or_else(|| earliest(&ticks, |_| true));

            if let Some(cutoff) = cutoff {
                cutoffs.insert(round, cutoff);
            }
        }

        cutoffs
    }

    /// Keep only non-warmup ticks at or after their round's cutoff.
    pub fn apply(&self, stream: TickStream) -> TickStream {
        let cutoffs = self.cutoff_ticks(&stream);
        let before = stream.ticks.len();

        let ticks: Vec<TickRecord> = stream
            .ticks
            .into_iter()
            .filter(|t| {
                !t.in_warmup()
                    && cutoffs
                        .get(&t.total_rounds_played)
                        .map_or(false, |cutoff| t.tick >= *cutoff)
            })
            .collect();

        debug!(before, after = ticks.len(), rounds = cutoffs.len(), "applied round boundaries");

        TickStream {
            capabilities: stream.capabilities,
            ticks,
        }
    }

    /// Windows of a stream that has already been filtered.
    pub fn windows(stream: &TickStream) -> Vec<RoundWindow> {
        stream
            .by_round()
            .into_iter()
            .filter_map(|(round_index, ticks)| {
                let first_tick = ticks.iter().map(|t| t.tick).min()?;
                let last_tick = ticks.iter().map(|t| t.tick).max()?;
                Some(RoundWindow {
                    round_index,
                    first_tick,
                    last_tick,
                })
            })
            .collect()
    }
}

fn earliest(ticks: &[&TickRecord], pred: impl Fn(&TickRecord) -> bool) -> Option<Tick> {
    ticks.iter().filter(|t| pred(**t)).map(|t| t.tick).min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rounds_core::{Capabilities, IdentityColumn};

    fn caps(has_freeze: bool) -> Capabilities {
        Capabilities {
            identity: IdentityColumn::SteamId,
            has_freeze_flag: has_freeze,
            has_warmup_flag: true,
            has_equip_value: true,
            has_win_status: true,
            has_win_reason: true,
            has_health: false,
            has_weapon: false,
            has_bomb_flag: false,
            has_player_name: false,
        }
    }

    fn make_tick(tick: i64, round: u32, freeze: Option<bool>, elapsed: f64) -> TickRecord {
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
            is_freeze_period: freeze,
            is_warmup_period: Some(false),
            is_bomb_planted: None,
            current_equip_value: None,
            round_win_status: 0,
            round_win_reason: 0,
            seconds_elapsed_in_round: elapsed,
        }
    }

    fn ticks_of(stream: &TickStream) -> Vec<i64> {
        stream.ticks.iter().map(|t| t.tick).collect()
    }

    #[test]
    fn test_cutoff_at_freeze_start() {
        let stream = TickStream {
            capabilities: caps(true),
            ticks: vec![
                make_tick(1, 0, Some(false), 0.0),
                make_tick(2, 0, Some(true), 0.0),
                make_tick(3, 0, Some(false), 3.0),
            ],
        };
        let filtered = RoundBoundaryFilter::new(1.0).apply(stream);
        assert_eq!(ticks_of(&filtered), vec![2, 3]);
    }

    #[test]
    fn test_fallback_to_elapsed_seconds() {
        let stream = TickStream {
            capabilities: caps(false),
            ticks: vec![
                make_tick(1, 0, None, 0.0),
                make_tick(2, 0, None, 1.0),
                make_tick(3, 0, None, 1.5),
                make_tick(4, 0, None, 5.0),
            ],
        };
        let filtered = RoundBoundaryFilter::new(1.0).apply(stream);
        assert_eq!(ticks_of(&filtered), vec![3, 4]);
    }

    #[test]
    fn test_fallback_to_round_start() {
        let stream = TickStream {
            capabilities: caps(false),
            ticks: vec![make_tick(7, 0, None, 0.0), make_tick(8, 0, None, 0.5)],
        };
        let filtered = RoundBoundaryFilter::new(1.0).apply(stream);
        assert_eq!(ticks_of(&filtered), vec![7, 8]);
    }

    #[test]
    fn test_rounds_use_independent_fallbacks() {
        // Round 0 has a freeze flag, round 1 never does.
        let stream = TickStream {
            capabilities: caps(true),
            ticks: vec![
                make_tick(1, 0, Some(false), 0.0),
                make_tick(2, 0, Some(true), 0.0),
                make_tick(10, 1, Some(false), 0.0),
                make_tick(11, 1, Some(false), 2.0),
            ],
        };
        let filter = RoundBoundaryFilter::new(1.0);
        let cutoffs = filter.cutoff_ticks(&stream);
        assert_eq!(cutoffs[&0], 2);
        assert_eq!(cutoffs[&1], 11);

        let filtered = filter.apply(stream);
        let windows = RoundBoundaryFilter::windows(&filtered);
        assert_eq!(windows.len(), 2);
        assert_eq!((windows[0].first_tick, windows[0].last_tick), (2, 2));
        assert_eq!((windows[1].first_tick, windows[1].last_tick), (11, 11));
    }

    #[test]
    fn test_warmup_ticks_dropped() {
        let mut warm = make_tick(5, 0, Some(true), 0.0);
        warm.is_warmup_period = Some(true);
        let stream = TickStream {
            capabilities: caps(true),
            ticks: vec![warm, make_tick(6, 0, Some(true), 0.0), make_tick(7, 0, Some(false), 2.0)],
        };
        let filtered = RoundBoundaryFilter::new(1.0).apply(stream);
        assert_eq!(ticks_of(&filtered), vec![6, 7]);
    }

    #[test]
    fn test_windows_are_disjoint() {
        let stream = TickStream {
            capabilities: caps(true),
            ticks: vec![
                make_tick(1, 0, Some(true), 0.0),
                make_tick(5, 0, Some(false), 2.0),
                make_tick(6, 1, Some(true), 0.0),
                make_tick(9, 1, Some(false), 2.0),
            ],
        };
        let windows = RoundBoundaryFilter::windows(&RoundBoundaryFilter::new(1.0).apply(stream));
        assert!(windows[0].last_tick < windows[1].first_tick);
    }
}
