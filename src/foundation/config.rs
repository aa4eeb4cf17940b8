use crate::foundation::error::{SceneError, SceneResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Tunable constants for every pipeline stage.
///
/// All fields default, so a config file only needs to name the values it overrides.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Input size caps.
    pub limits: Limits,
    /// Geometric stabilizer thresholds.
    pub stabilizer: StabilizerOpts,
    /// Realism enrichment behavior.
    pub enrichment: EnrichmentOpts,
}

/// Caps that keep every stage bounded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Limits {
    /// Maximum number of commands per envelope, counting commands nested in batches.
    pub max_commands: usize,
    /// Maximum `batch` nesting depth (a top-level batch has depth 1).
    pub max_batch_depth: usize,
    /// Maximum shapes per object.
    pub max_shapes_per_object: usize,
    /// Number of session events retained in the log.
    pub event_log_capacity: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_commands: 200,
            max_batch_depth: 8,
            max_shapes_per_object: 60,
            event_log_capacity: 100,
        }
    }
}

/// Thresholds used by the geometric stabilizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StabilizerOpts {
    /// Local bbox minimum beyond which shapes are treated as authored in world space.
    pub rebase_near_margin: f64,
    /// Local bbox extent beyond which shapes are rebased regardless of direction.
    pub rebase_far_margin: f64,
    /// Minimum number of full-width rects that make a band stack.
    pub band_min_count: usize,
    /// Minimum rect width for a rect to count as full width.
    pub band_full_width: f64,
    /// Maximum left offset of a full-width rect.
    pub band_edge_tolerance: f64,
    /// Maximum gap or overlap between consecutive bands.
    pub band_gap_tolerance: f64,
}

impl Default for StabilizerOpts {
    fn default() -> Self {
        Self {
            rebase_near_margin: 12.0,
            rebase_far_margin: 110.0,
            band_min_count: 3,
            band_full_width: 95.0,
            band_edge_tolerance: 5.0,
            band_gap_tolerance: 3.0,
        }
    }
}

/// Realism enrichment behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnrichmentOpts {
    /// Master switch.
    pub enabled: bool,
    /// Minimum shape count per category; objects below it get the category template.
    pub min_shapes: BTreeMap<String, usize>,
}

impl Default for EnrichmentOpts {
    fn default() -> Self {
        let min_shapes = [
            ("tree", 2),
            ("house", 3),
            ("person", 4),
            ("car", 3),
            ("bush", 2),
            ("flower", 2),
            ("mountain", 2),
            ("cloud", 2),
            ("sun", 2),
            ("bird", 2),
            ("sky", 2),
            ("ground", 2),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self {
            enabled: true,
            min_shapes,
        }
    }
}

impl PipelineConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SceneResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| SceneError::config(format!("parse pipeline config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SceneError::config(format!("open pipeline config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject values that would make a stage unbounded or degenerate.
    pub fn validate(&self) -> SceneResult<()> {
        let l = &self.limits;
        if l.max_commands == 0 || l.max_batch_depth == 0 || l.event_log_capacity == 0 {
            return Err(SceneError::config(
                "limits.maxCommands, maxBatchDepth and eventLogCapacity must be > 0",
            ));
        }
        if l.max_shapes_per_object == 0 || l.max_shapes_per_object > 60 {
            return Err(SceneError::config(
                "limits.maxShapesPerObject must be in 1..=60",
            ));
        }
        let s = &self.stabilizer;
        if s.band_min_count < 2 {
            return Err(SceneError::config("stabilizer.bandMinCount must be >= 2"));
        }
        let finite_nonneg = [
            s.rebase_near_margin,
            s.rebase_far_margin,
            s.band_full_width,
            s.band_edge_tolerance,
            s.band_gap_tolerance,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0);
        if !finite_nonneg {
            return Err(SceneError::config(
                "stabilizer thresholds must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
