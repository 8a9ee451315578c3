//! Round-level reconstruction for the round reconstruction pipeline.
//!
//! This crate handles:
//! - Outcome reconstruction from offset win events
//! - Per-round summaries at a representative tick
//! - The match-level validity gate
//! - Tick-level training rows and per-round trajectories

pub mod dataset;
pub mod gate;
pub mod outcome;
pub mod summary;
pub mod trajectory;

pub use dataset::{build_tick_dataset, TrainingTick};
pub use gate::ValidityGate;
pub use outcome::{attribute_win_events, outcome_round, OutcomeReconstructor, ResolvedCodes};
pub use summary::RoundSummaryBuilder;
pub use trajectory::{build_trajectories, PlayerTrack, Position, RoundTrajectory, TrajectoryOptions};
