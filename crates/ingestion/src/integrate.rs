//! Joins reconstructed round outcomes back onto the tick stream.

use rounds_core::{OutcomeMap, TickRecord, TickStream};
use tracing::debug;

/// Keep only ticks of rounds with a resolved outcome and stamp each tick with
/// its round's winner and reason.
///
/// Rounds without an outcome (warmup, unfinished or unofficial rounds) are
/// dropped entirely.
pub fn integrate_outcomes(stream: TickStream, outcomes: &OutcomeMap) -> TickStream {
    let before = stream.ticks.len();
    let ticks: Vec<TickRecord> = stream
        .ticks
        .into_iter()
        .filter_map(|mut tick| {
            let outcome = outcomes.get(&tick.total_rounds_played)?;
            tick.round_win_status = outcome.winner;
            tick.round_win_reason = outcome.reason;
            Some(tick)
        })
        .collect();

    debug!(before, after = ticks.len(), rounds = outcomes.len(), "integrated round outcomes");

    TickStream {
        capabilities: stream.capabilities,
        ticks,
    }
}
