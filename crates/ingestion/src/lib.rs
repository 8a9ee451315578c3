//! Data ingestion and normalization for the round reconstruction pipeline.
//!
//! This crate handles:
//! - The telemetry decoder seam (plus a JSON tick-dump decoder)
//! - Tick normalization and schema capability checks
//! - Per-round boundary filtering
//! - Joining reconstructed outcomes back onto ticks

pub mod boundary;
pub mod decoder;
pub mod integrate;
pub mod normalizer;

pub use boundary::RoundBoundaryFilter;
pub use decoder::{InMemoryDecoder, JsonDumpDecoder, TelemetryDecoder};
pub use integrate::integrate_outcomes;
pub use normalizer::{CategoryPool, TickNormalizer};
