//! Per-match pipeline.
//!
//! decode -> normalize -> reconstruct outcomes -> integrate -> filter round
//! boundaries -> summarize -> gate. Processing one file touches no shared
//! mutable state, so any number of pipelines may run concurrently over the same
//! decoder and asset catalog.

use crate::assets::MapAssets;
use rounds_core::config::PipelineConfig;
use rounds_core::schema::REQUESTED_COLUMNS;
use rounds_core::{
    DemoHeader, Error, FailureKind, MatchResult, OutcomeMap, Result, RoundSummary, TickStream,
};
use rounds_ingestion::{integrate_outcomes, RoundBoundaryFilter, TelemetryDecoder, TickNormalizer};
use rounds_reconstruct::{
    build_tick_dataset, build_trajectories, OutcomeReconstructor, RoundSummaryBuilder,
    RoundTrajectory, TrainingTick, TrajectoryOptions, ValidityGate,
};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// A match that has been decoded, integrated with its outcomes and
/// boundary-filtered, before summarization.
#[derive(Debug, Clone)]
pub struct PreparedMatch {
    pub header: DemoHeader,
    pub stream: TickStream,
    pub outcomes: OutcomeMap,
}

/// Runs the full reconstruction over one match file at a time.
pub struct MatchPipeline {
    decoder: Arc<dyn TelemetryDecoder>,
    assets: Arc<MapAssets>,
    config: PipelineConfig,
    normalizer: TickNormalizer,
    reconstructor: OutcomeReconstructor,
    boundary: RoundBoundaryFilter,
    summaries: RoundSummaryBuilder,
    gate: ValidityGate,
}

impl MatchPipeline {
    /// Create a pipeline over a decoder and a preloaded asset catalog.
    pub fn new(
        decoder: Arc<dyn TelemetryDecoder>,
        assets: Arc<MapAssets>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            decoder,
            assets,
            normalizer: TickNormalizer::new(config.identity_columns.clone()),
            reconstructor: OutcomeReconstructor::new(),
            boundary: RoundBoundaryFilter::new(config.min_elapsed_seconds),
            summaries: RoundSummaryBuilder::new(&config),
            gate: ValidityGate::new(config.equip_ceiling),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decode, normalize and integrate a match, ready for summarization.
    ///
    /// Fails with `NoResolvedOutcome` when no round has a resolved winner.
    pub fn prepare(&self, path: &Path) -> Result<PreparedMatch> {
        let (mut header, raw) = self.decoder.parse_match(path, REQUESTED_COLUMNS)?;
        debug!(path = %path.display(), rows = raw.rows.len(), "decoded tick stream");

        header.demo_path = Some(path.to_path_buf());
        header.map_png_path = header
            .map_name
            .as_deref()
            .and_then(|name| self.assets.get(name))
            .map(Path::to_path_buf);

        let stream = self.normalizer.normalize(raw)?;
        let outcomes = self.reconstructor.reconstruct(&stream);
        if outcomes.is_empty() {
            return Err(Error::NoResolvedOutcome);
        }

        let stream = integrate_outcomes(stream, &outcomes);
        let stream = self.boundary.apply(stream);

        Ok(PreparedMatch {
            header,
            stream,
            outcomes,
        })
    }

    /// Accepted round summaries of a match, or the reason it was rejected.
    pub fn run(&self, path: &Path) -> Result<Vec<RoundSummary>> {
        let prepared = self.prepare(path)?;

        let mut rounds = self.summaries.build(&prepared.stream, &prepared.outcomes);
        for row in &mut rounds {
            row.map_name = prepared.header.map_name.clone();
        }

        self.gate.check(&rounds)?;
        Ok(rounds)
    }

    /// Run one file and convert every failure, panics included, into a rejection.
    pub fn process_match(&self, path: &Path) -> MatchResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(path)));

        let (kind, message) = match outcome {
            Ok(Ok(rounds)) => {
                let map_name = rounds.first().and_then(|r| r.map_name.clone());
                debug!(path = %path.display(), rounds = rounds.len(), "accepted match");
                return MatchResult::Accepted {
                    path: path.to_path_buf(),
                    map_name,
                    rounds,
                };
            }
            Ok(Err(err)) => (err.kind(), err.to_string()),
            Err(payload) => (FailureKind::Panic, panic_message(payload.as_ref())),
        };

        warn!(path = %path.display(), ?kind, "rejected match: {}", message);
        MatchResult::Rejected {
            path: path.to_path_buf(),
            kind,
            message,
        }
    }

    /// Labelled tick rows of a match, for model training.
    pub fn tick_dataset(&self, path: &Path) -> Result<Vec<TrainingTick>> {
        let prepared = self.prepare(path)?;
        Ok(build_tick_dataset(&prepared.stream, &self.config))
    }

    /// Per-round player positions of a match.
    pub fn trajectories(
        &self,
        path: &Path,
        options: &TrajectoryOptions,
    ) -> Result<Vec<RoundTrajectory>> {
        let prepared = self.prepare(path)?;
        Ok(build_trajectories(&prepared.stream, options))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("pipeline panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("pipeline panicked: {}", msg)
    } else {
        "pipeline panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rounds_core::{Column, RawTickStream};
    use rounds_ingestion::InMemoryDecoder;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct PanickingDecoder;

    impl TelemetryDecoder for PanickingDecoder {
        fn parse_header(&self, _path: &Path) -> Result<DemoHeader> {
            panic!("corrupt header");
        }

        fn parse_ticks(&self, _path: &Path, _columns: &[Column]) -> Result<RawTickStream> {
            unreachable!()
        }
    }

    /// Counts how the pipeline reaches the file behind an in-memory stream.
    #[derive(Default)]
    struct CountingDecoder {
        inner: InMemoryDecoder,
        separate_reads: AtomicUsize,
        match_reads: AtomicUsize,
    }

    impl TelemetryDecoder for CountingDecoder {
        fn parse_header(&self, path: &Path) -> Result<DemoHeader> {
            self.separate_reads.fetch_add(1, Ordering::SeqCst);
            self.inner.parse_header(path)
        }

        fn parse_ticks(&self, path: &Path, columns: &[Column]) -> Result<RawTickStream> {
            self.separate_reads.fetch_add(1, Ordering::SeqCst);
            self.inner.parse_ticks(path, columns)
        }

        fn parse_match(
            &self,
            path: &Path,
            columns: &[Column],
        ) -> Result<(DemoHeader, RawTickStream)> {
            self.match_reads.fetch_add(1, Ordering::SeqCst);
            Ok((self.inner.parse_header(path)?, self.inner.parse_ticks(path, columns)?))
        }
    }

    fn make_pipeline(decoder: impl TelemetryDecoder + 'static) -> MatchPipeline {
        let assets = Arc::new(MapAssets::empty());
        MatchPipeline::new(Arc::new(decoder), assets, PipelineConfig::default())
    }

    #[test]
    fn test_each_file_is_decoded_once() {
        let decoder = Arc::new(CountingDecoder::default());
        let pipeline = MatchPipeline::new(
            decoder.clone(),
            Arc::new(MapAssets::empty()),
            PipelineConfig::default(),
        );

        let result = pipeline.process_match(Path::new("missing.json"));
        assert!(matches!(result, MatchResult::Rejected { .. }));
        assert_eq!(decoder.match_reads.load(Ordering::SeqCst), 1);
        assert_eq!(decoder.separate_reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_file_is_decode_failure() {
        let result = make_pipeline(InMemoryDecoder::new())
            .process_match(Path::new("missing.json"));
        match result {
            MatchResult::Rejected { path, kind, .. } => {
                assert_eq!(path, PathBuf::from("missing.json"));
                assert_eq!(kind, FailureKind::DecodeFailure);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_panic_becomes_rejection() {
        let result = make_pipeline(PanickingDecoder).process_match(Path::new("boom.json"));
        match result {
            MatchResult::Rejected { kind, message, .. } => {
                assert_eq!(kind, FailureKind::Panic);
                assert!(message.contains("corrupt header"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_column() {
        let mut decoder = InMemoryDecoder::new();
        let mut columns = rounds_core::ColumnSet::new();
        columns.insert(Column::Tick);
        decoder.insert(
            "thin.json",
            DemoHeader::default(),
            RawTickStream {
                columns,
                rows: Vec::new(),
            },
        );
        let result = make_pipeline(decoder).process_match(Path::new("thin.json"));
        assert!(matches!(
            result,
            MatchResult::Rejected {
                kind: FailureKind::MissingColumn,
                ..
            }
        ));
    }
}
