//! Batch orchestrator.
//!
//! Fans match files out over a bounded rayon pool and partitions the results.
//! A batch always completes: every file ends up either in `accepted` (through
//! its rows) or in `failed`.

use crate::assets::MapAssets;
use crate::pipeline::MatchPipeline;
use crate::report::{BatchReport, Rejection};
use chrono::Utc;
use rayon::prelude::*;
use rounds_core::{Config, Error, MatchResult, Result, RoundSummary};
use rounds_ingestion::TelemetryDecoder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Everything a batch run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// Round summaries of all accepted matches, in input order.
    pub accepted: Vec<RoundSummary>,
    /// Paths of rejected matches, in input order.
    pub failed: Vec<PathBuf>,
    /// Why each failed path was rejected.
    pub rejections: Vec<Rejection>,
    pub report: BatchReport,
}

/// Runs [`MatchPipeline`] over many files in parallel.
pub struct BatchRunner {
    pipeline: Arc<MatchPipeline>,
    pool: rayon::ThreadPool,
}

impl BatchRunner {
    /// Create a runner with `workers` threads (0 = one per core).
    pub fn new(pipeline: MatchPipeline, workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("round-recon-{}", i))
            .build()
            .map_err(|e| Error::config(format!("failed to create worker pool: {}", e)))?;

        Ok(Self {
            pipeline: Arc::new(pipeline),
            pool,
        })
    }

    /// Build a runner from configuration: loads the map asset catalog once and
    /// shares it with every worker.
    pub fn from_config(decoder: Arc<dyn TelemetryDecoder>, config: &Config) -> Result<Self> {
        let assets = MapAssets::from_config(config.assets.maps_background_dir.as_deref())?;
        let pipeline = MatchPipeline::new(decoder, Arc::new(assets), config.pipeline.clone());
        Self::new(pipeline, config.batch.workers)
    }

    pub fn pipeline(&self) -> &MatchPipeline {
        &self.pipeline
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Per-file results in input order. Blocks until every file is done.
    pub fn process_all(&self, paths: &[PathBuf]) -> Vec<MatchResult> {
        let pipeline = &self.pipeline;
        self.pool
            .install(|| paths.par_iter().map(|path| pipeline.process_match(path)).collect())
    }

    /// Process every file and partition the results.
    pub fn run(&self, paths: &[PathBuf]) -> BatchOutput {
        let started_at = Utc::now();
        info!(files = paths.len(), workers = self.workers(), "starting batch");

        let results = self.process_all(paths);
        let report = BatchReport::from_results(&results, started_at, Utc::now());

        let mut accepted = Vec::with_capacity(report.rounds_emitted);
        let mut failed = Vec::with_capacity(report.failed_files);
        let mut rejections = Vec::with_capacity(report.failed_files);
        for result in results {
            match result {
                MatchResult::Accepted { rounds, .. } => accepted.extend(rounds),
                MatchResult::Rejected { path, kind, message } => {
                    failed.push(path.clone());
                    rejections.push(Rejection { path, kind, message });
                }
            }
        }

        info!(
            accepted_files = report.accepted_files,
            failed_files = report.failed_files,
            rounds = report.rounds_emitted,
            elapsed_s = report.elapsed_seconds(),
            "batch finished"
        );

        BatchOutput {
            accepted,
            failed,
            rejections,
            report,
        }
    }
}
