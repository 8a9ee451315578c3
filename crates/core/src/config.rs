//! Configuration structures for the round reconstruction pipeline.

use crate::error::{Error, Result};
use crate::schema::IdentityColumn;
use crate::types::Side;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Code used by the decoder for "no event" in both win tables.
pub const NONE_CODE: i32 = 0;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-match pipeline configuration.
    pub pipeline: PipelineConfig,
    /// Batch execution configuration.
    pub batch: BatchConfig,
    /// Static asset locations.
    pub assets: AssetsConfig,
}

impl Config {
    /// Load configuration from a JSON file. Missing sections take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()
    }
}

/// Side labels as reported in the `team_name` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideLabels {
    pub ct: String,
    pub t: String,
}

impl Default for SideLabels {
    fn default() -> Self {
        Self {
            ct: "CT".to_string(),
            t: "TERRORIST".to_string(),
        }
    }
}

impl SideLabels {
    /// Side for a `team_name` value, `None` for spectators and unknown labels.
    pub fn side_of(&self, team_name: &str) -> Option<Side> {
        if team_name == self.ct {
            Some(Side::Ct)
        } else if team_name == self.t {
            Some(Side::T)
        } else {
            None
        }
    }

    /// Label for a side.
    pub fn label(&self, side: Side) -> &str {
        match side {
            Side::Ct => &self.ct,
            Side::T => &self.t,
        }
    }
}

/// Closed enumerations mapping integer win codes to labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTables {
    /// Round win status codes.
    pub winner: BTreeMap<i32, String>,
    /// Round win reason codes.
    pub reason: BTreeMap<i32, String>,
}

impl Default for CodeTables {
    fn default() -> Self {
        let winner = [(0, "none"), (1, "draw"), (2, "t_win"), (3, "ct_win")];
        let reason = [
            (0, "none"),
            (1, "bomb_exploded"),
            (7, "bomb_defused"),
            (8, "t_killed"),
            (9, "ct_killed"),
            (12, "time_ran_out"),
        ];
        Self {
            winner: winner.iter().map(|(c, l)| (*c, l.to_string())).collect(),
            reason: reason.iter().map(|(c, l)| (*c, l.to_string())).collect(),
        }
    }
}

impl CodeTables {
    /// Label for a win status code, `"unknown"` when not in the table.
    pub fn winner_label(&self, code: i32) -> &str {
        self.winner.get(&code).map(String::as_str).unwrap_or("unknown")
    }

    /// Label for a win reason code, `"unknown"` when not in the table.
    pub fn reason_label(&self, code: i32) -> &str {
        self.reason.get(&code).map(String::as_str).unwrap_or("unknown")
    }
}

/// Per-match pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum per-side equipment value allowed in the opening round.
    pub equip_ceiling: u64,
    /// Identity columns in order of preference.
    pub identity_columns: Vec<IdentityColumn>,
    /// Side labels.
    pub sides: SideLabels,
    /// Seconds into the round after which a tick counts as "spawned".
    pub min_elapsed_seconds: f64,
    /// Win status / reason code tables.
    pub codes: CodeTables,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            equip_ceiling: 5500,
            identity_columns: vec![IdentityColumn::SteamId, IdentityColumn::Name],
            sides: SideLabels::default(),
            min_elapsed_seconds: 1.0,
            codes: CodeTables::default(),
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<()> {
        if self.equip_ceiling == 0 {
            return Err(Error::config("equip_ceiling must be positive"));
        }
        if self.identity_columns.is_empty() {
            return Err(Error::config("identity_columns must not be empty"));
        }
        if self.sides.ct == self.sides.t {
            return Err(Error::config(format!(
                "side labels must differ, both are {:?}",
                self.sides.ct
            )));
        }
        if !self.min_elapsed_seconds.is_finite() || self.min_elapsed_seconds < 0.0 {
            return Err(Error::config("min_elapsed_seconds must be a non-negative number"));
        }
        let codes = &self.codes;
        if !codes.winner.contains_key(&NONE_CODE) || !codes.reason.contains_key(&NONE_CODE) {
            return Err(Error::config("code tables must define the 0 sentinel"));
        }
        Ok(())
    }
}

/// Batch execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of parallel workers (0 = auto).
    pub workers: usize,
    /// Extension of match files picked up by discovery.
    pub demo_extension: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            demo_extension: "json".to_string(),
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory holding `<map_name>.png` background images.
    pub maps_background_dir: Option<PathBuf>,
}
