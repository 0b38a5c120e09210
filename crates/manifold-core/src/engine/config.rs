use crate::core::io::traits::RecordFile;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_MIN_ANCHORS: usize = 1;
pub const DEFAULT_REQUIRED_COVERAGE: f64 = 1.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode parameters: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Malformed parameter file: {0}")]
    Decode(#[from] toml::de::Error),
}

/// Thresholds applied by the finalize gate before handing anchors to belief propagation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct GatePolicy {
    /// Fewer anchors than this blocks finalization outright.
    #[serde(default = "default_min_anchors")]
    pub min_anchors: usize,
    /// Fraction of clusters that must hold an anchor to proceed without confirmation.
    /// `1.0` requires every cluster to be covered.
    #[serde(default = "default_required_coverage")]
    pub required_coverage: f64,
}

fn default_min_anchors() -> usize {
    DEFAULT_MIN_ANCHORS
}

fn default_required_coverage() -> f64 {
    DEFAULT_REQUIRED_COVERAGE
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            min_anchors: DEFAULT_MIN_ANCHORS,
            required_coverage: DEFAULT_REQUIRED_COVERAGE,
        }
    }
}

impl GatePolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.required_coverage) {
            return Err(ConfigError::InvalidValue {
                key: "gate.required-coverage",
                reason: format!("{} is not within [0, 1]", self.required_coverage),
            });
        }
        Ok(())
    }
}

/// Process-wide analysis parameters.
///
/// Loaded once at startup and persisted on demand; the record store reads
/// `num_psi` and derives its own file location from `out_dir` and `project_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct AnalysisParams {
    pub project_name: String,
    pub out_dir: PathBuf,
    /// Number of eigenvector channels (psi) computed per PD.
    pub num_psi: u32,
    /// Number of thresholded PDs, committed once a record store exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_thresholded: Option<usize>,
    #[serde(default)]
    pub gate: GatePolicy,
}

impl AnalysisParams {
    /// Loads parameters from a TOML file and validates them.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let params = ParamsFile::read_from_path(path)?;
        params.validate()?;
        Ok(params)
    }

    /// Atomically writes the parameters to their well-known location and returns it.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = self.params_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        ParamsFile::write_to_path(self, path)?;
        info!("Saved analysis parameters to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "project-name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.num_psi == 0 {
            return Err(ConfigError::InvalidValue {
                key: "num-psi",
                reason: "at least one eigenvector channel is required".to_string(),
            });
        }
        self.gate.validate()
    }

    pub fn params_path(&self) -> PathBuf {
        self.out_dir
            .join(format!("{}_params.toml", self.project_name))
    }

    /// Location of the persisted record store consumed by belief propagation.
    pub fn prds_path(&self) -> PathBuf {
        self.out_dir
            .join(format!("{}_pd_data.toml", self.project_name))
    }

    pub fn topos_dir(&self) -> PathBuf {
        self.out_dir.join("topos")
    }

    /// Path of the topos image for a PD/eigenvector pair. Both indices are 1-based.
    pub fn topos_path(&self, pd_number: usize, psi: u32) -> PathBuf {
        self.topos_dir()
            .join(format!("PrD_{}", pd_number))
            .join(format!("topos_{}.png", psi))
    }
}

#[derive(Default)]
pub struct AnalysisParamsBuilder {
    project_name: Option<String>,
    out_dir: Option<PathBuf>,
    num_psi: Option<u32>,
    n_thresholded: Option<usize>,
    min_anchors: Option<usize>,
    required_coverage: Option<f64>,
}

impl AnalysisParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }
    pub fn out_dir(mut self, dir: PathBuf) -> Self {
        self.out_dir = Some(dir);
        self
    }
    pub fn num_psi(mut self, n: u32) -> Self {
        self.num_psi = Some(n);
        self
    }
    pub fn n_thresholded(mut self, n: usize) -> Self {
        self.n_thresholded = Some(n);
        self
    }
    pub fn min_anchors(mut self, n: usize) -> Self {
        self.min_anchors = Some(n);
        self
    }
    pub fn required_coverage(mut self, fraction: f64) -> Self {
        self.required_coverage = Some(fraction);
        self
    }

    pub fn build(self) -> Result<AnalysisParams, ConfigError> {
        let params = AnalysisParams {
            project_name: self
                .project_name
                .ok_or(ConfigError::MissingParameter("project_name"))?,
            out_dir: self
                .out_dir
                .ok_or(ConfigError::MissingParameter("out_dir"))?,
            num_psi: self
                .num_psi
                .ok_or(ConfigError::MissingParameter("num_psi"))?,
            n_thresholded: self.n_thresholded,
            gate: GatePolicy {
                min_anchors: self.min_anchors.unwrap_or(DEFAULT_MIN_ANCHORS),
                required_coverage: self
                    .required_coverage
                    .unwrap_or(DEFAULT_REQUIRED_COVERAGE),
            },
        };
        params.validate()?;
        Ok(params)
    }
}

/// TOML encoding of [`AnalysisParams`].
pub struct ParamsFile;

impl RecordFile for ParamsFile {
    type Record = AnalysisParams;
    type Error = ConfigError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Record, Self::Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Ok(toml::from_str(&content)?)
    }

    fn write_to(record: &Self::Record, writer: &mut impl Write) -> Result<(), Self::Error> {
        writer.write_all(toml::to_string(record)?.as_bytes())?;
        Ok(())
    }
}
