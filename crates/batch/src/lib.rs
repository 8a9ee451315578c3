//! Batch execution for the round reconstruction pipeline.
//!
//! This crate provides:
//! - The per-match pipeline with file-boundary error capture
//! - The map asset catalog shared by all workers
//! - Recursive match file discovery
//! - The parallel batch orchestrator and its report

pub mod assets;
pub mod discovery;
pub mod orchestrator;
pub mod pipeline;
pub mod report;

pub use assets::MapAssets;
pub use discovery::discover_demos;
pub use orchestrator::{BatchOutput, BatchRunner};
pub use pipeline::{MatchPipeline, PreparedMatch};
pub use report::{BatchReport, Rejection};
