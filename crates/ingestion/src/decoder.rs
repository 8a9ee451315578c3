//! Telemetry decoder seam.
//!
//! The decoder itself is an external service; the pipeline only needs a header
//! and a raw tick stream per file. [`JsonDumpDecoder`] reads streams that were
//! decoded ahead of time and stored as JSON.

use rounds_core::{Column, ColumnSet, DemoHeader, Error, RawTick, RawTickStream, Result};
use serde::{de::DeserializeOwned, Deserialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source of decoded match telemetry.
pub trait TelemetryDecoder: Send + Sync {
    /// Match metadata for a file.
    fn parse_header(&self, path: &Path) -> Result<DemoHeader>;

    /// Raw tick stream restricted to the requested columns.
    fn parse_ticks(&self, path: &Path, columns: &[Column]) -> Result<RawTickStream>;

    /// Header and tick stream together. Decoders that can produce both from a
    /// single read of the file should override this.
    fn parse_match(&self, path: &Path, columns: &[Column]) -> Result<(DemoHeader, RawTickStream)> {
        Ok((self.parse_header(path)?, self.parse_ticks(path, columns)?))
    }
}

/// On-disk layout of a pre-decoded tick dump.
#[derive(Debug, Deserialize)]
struct TickDump {
    #[serde(default)]
    header: DemoHeader,
    columns: ColumnSet,
    #[serde(default)]
    ticks: Vec<RawTick>,
}

/// Header of a dump; the tick array is skipped without being materialized.
#[derive(Debug, Deserialize)]
struct HeaderOnly {
    #[serde(default)]
    header: DemoHeader,
}

/// Decoder for JSON tick dumps: `{"header": {...}, "columns": [...], "ticks": [...]}`.
#[derive(Debug, Clone, Default)]
pub struct JsonDumpDecoder;

impl JsonDumpDecoder {
    pub fn new() -> Self {
        Self
    }

    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::decode(path, e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| Error::decode(path, e.to_string()))
    }
}

impl TelemetryDecoder for JsonDumpDecoder {
    fn parse_header(&self, path: &Path) -> Result<DemoHeader> {
        Ok(self.read::<HeaderOnly>(path)?.header)
    }

    fn parse_ticks(&self, path: &Path, columns: &[Column]) -> Result<RawTickStream> {
        let dump: TickDump = self.read(path)?;
        Ok(mask_columns(dump.columns, dump.ticks, columns))
    }

    fn parse_match(&self, path: &Path, columns: &[Column]) -> Result<(DemoHeader, RawTickStream)> {
        let dump: TickDump = self.read(path)?;
        Ok((dump.header, mask_columns(dump.columns, dump.ticks, columns)))
    }
}

/// Decoder serving streams held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDecoder {
    matches: HashMap<PathBuf, (DemoHeader, RawTickStream)>,
}

impl InMemoryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stream under a path.
    pub fn insert(&mut self, path: impl Into<PathBuf>, header: DemoHeader, stream: RawTickStream) {
        self.matches.insert(path.into(), (header, stream));
    }

    fn lookup(&self, path: &Path) -> Result<&(DemoHeader, RawTickStream)> {
        self.matches
            .get(path)
            .ok_or_else(|| Error::decode(path, "no such match"))
    }
}

impl TelemetryDecoder for InMemoryDecoder {
    fn parse_header(&self, path: &Path) -> Result<DemoHeader> {
        Ok(self.lookup(path)?.0.clone())
    }

    fn parse_ticks(&self, path: &Path, columns: &[Column]) -> Result<RawTickStream> {
        let stream = &self.lookup(path)?.1;
        Ok(mask_columns(stream.columns.clone(), stream.rows.clone(), columns))
    }
}

/// Keep only the requested columns in the advertised column set.
fn mask_columns(available: ColumnSet, rows: Vec<RawTick>, requested: &[Column]) -> RawTickStream {
    let columns = available
        .into_iter()
        .filter(|c| requested.contains(c))
        .collect();
    RawTickStream { columns, rows }
}
