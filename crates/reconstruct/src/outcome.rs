//! Round outcome reconstruction.
//!
//! The decoder asserts a round's win status/reason on ticks that already carry
//! the *next* round's `total_rounds_played`. Outcomes are therefore attributed
//! one round back before grouping, and each group resolves to the last non-zero
//! status and reason it observed. The exception is the stream's final round:
//! no later round exists to report it, so a win event raised after its live
//! phase began describes that round itself.
//!
//! Reconstruction runs on the whole stream (warmup excluded) before any
//! boundary filtering, so no win-event tick is lost.

use rounds_core::{OutcomeMap, RoundIndex, RoundOutcome, TickRecord, TickStream};
use std::collections::BTreeMap;
use tracing::debug;

/// Status and reason resolved for one outcome group; 0 means not observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedCodes {
    pub winner: i32,
    pub reason: i32,
}

/// Round a tick's win fields describe, for any round but the stream's last.
///
/// Ticks carrying a win event are attributed to the round before the one they
/// report; a win event reported in round 0 has no round to describe.
pub fn outcome_round(tick: &TickRecord) -> Option<RoundIndex> {
    if tick.has_win_event() {
        tick.total_rounds_played.checked_sub(1)
    } else {
        Some(tick.total_rounds_played)
    }
}

/// Group ticks by the round their win fields describe and keep the last
/// non-zero status and reason seen in each group, in stream order.
///
/// Every tick goes through [`outcome_round`] except the win events of the
/// final round that come after that round's live phase began. Those are never
/// followed by an increment, so they resolve the final round itself. The live
/// phase begins at the first tick of the final round without a win event
/// (and, when the source has a freeze flag, outside the freeze period).
///
/// This is the single place encoding the decoder's event timing. All of these
/// rules are empirical and should be revisited together if that timing changes.
pub fn attribute_win_events(
    ticks: &[&TickRecord],
    has_freeze_flag: bool,
) -> BTreeMap<RoundIndex, ResolvedCodes> {
    let final_round = ticks.iter().map(|t| t.total_rounds_played).max();
    let final_live_start = ticks
        .iter()
        .filter(|t| Some(t.total_rounds_played) == final_round)
        .filter(|t| !t.has_win_event() && (!has_freeze_flag || t.is_live()))
        .map(|t| t.tick)
        .min();

    let mut groups: BTreeMap<RoundIndex, ResolvedCodes> = BTreeMap::new();

    for tick in ticks {
        let trailing = tick.has_win_event()
            && Some(tick.total_rounds_played) == final_round
            && final_live_start.is_some_and(|start| tick.tick > start);
        let round = if trailing {
            Some(tick.total_rounds_played)
        } else {
            outcome_round(tick)
        };
        let Some(round) = round else {
            continue;
        };
        let codes = groups.entry(round).or_default();
        if tick.round_win_status != 0 {
            codes.winner = tick.round_win_status;
        }
        if tick.round_win_reason != 0 {
            codes.reason = tick.round_win_reason;
        }
    }

    groups
}

/// Reconstructs per-round outcomes from an unfiltered tick stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeReconstructor;

impl OutcomeReconstructor {
    pub fn new() -> Self {
        Self
    }

    /// Map of round index to resolved outcome. Rounds without a conclusively
    /// observed winner are absent.
    ///
    /// When the source carries a warmup flag only ticks explicitly flagged as
    /// outside warmup take part; a null flag counts as warmup.
    pub fn reconstruct(&self, stream: &TickStream) -> OutcomeMap {
        let caps = &stream.capabilities;
        let official: Vec<&TickRecord> = stream
            .ticks
            .iter()
            .filter(|t| !caps.has_warmup_flag || t.is_warmup_period == Some(false))
            .collect();

        let outcomes: OutcomeMap = attribute_win_events(&official, caps.has_freeze_flag)
            .into_iter()
            .filter(|(_, codes)| codes.winner != 0)
            .map(|(round_index, codes)| {
                (
                    round_index,
                    RoundOutcome {
                        round_index,
                        winner: codes.winner,
                        reason: codes.reason,
                    },
                )
            })
            .collect();

        debug!(
            groups = stream.round_indices().len(),
            resolved = outcomes.len(),
            "reconstructed round outcomes"
        );
        outcomes
    }
}
