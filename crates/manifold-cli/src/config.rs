use crate::cli::InitArgs;
use crate::error::{CliError, Result};
use crate::utils::parser::parse_key_value;
use manifoldem::engine::config::{AnalysisParams, AnalysisParamsBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialGatePolicy {
    #[serde(rename = "min-anchors")]
    min_anchors: Option<usize>,
    #[serde(rename = "required-coverage")]
    required_coverage: Option<f64>,
}

/// Analysis parameters as written by hand or by an earlier stage, with every field optional
/// until command-line overrides have been merged in.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialParams {
    #[serde(rename = "project-name")]
    project_name: Option<String>,
    #[serde(rename = "out-dir")]
    out_dir: Option<PathBuf>,
    #[serde(rename = "num-psi")]
    num_psi: Option<u32>,
    #[serde(rename = "n-thresholded")]
    n_thresholded: Option<usize>,
    gate: Option<PartialGatePolicy>,
}

impl PartialParams {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading analysis parameters from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::ParamsFile {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Like [`PartialParams::from_file`], but a missing file yields empty parameters.
    pub fn from_file_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!("No parameter file at {:?}; starting from defaults.", path);
            Ok(Self::default())
        }
    }

    /// Applies `init` arguments, which take precedence over the file.
    pub fn merge_init_args(mut self, args: &InitArgs) -> Self {
        if let Some(name) = &args.project_name {
            self.project_name = Some(name.clone());
        }
        if let Some(dir) = &args.out_dir {
            self.out_dir = Some(dir.clone());
        }
        if let Some(n) = args.num_psi {
            self.num_psi = Some(n);
        }
        self
    }

    /// Applies `-S KEY=VALUE` overrides and validates the result.
    pub fn finish(mut self, set_values: &[String]) -> Result<AnalysisParams> {
        self.apply_set_values(set_values)?;

        let mut builder = AnalysisParamsBuilder::new();
        if let Some(name) = self.project_name {
            builder = builder.project_name(name);
        }
        if let Some(dir) = self.out_dir {
            builder = builder.out_dir(dir);
        }
        if let Some(n) = self.num_psi {
            builder = builder.num_psi(n);
        }
        if let Some(n) = self.n_thresholded {
            builder = builder.n_thresholded(n);
        }
        let gate = self.gate.unwrap_or_default();
        if let Some(n) = gate.min_anchors {
            builder = builder.min_anchors(n);
        }
        if let Some(fraction) = gate.required_coverage {
            builder = builder.required_coverage(fraction);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = parse_key_value(kv_pair)?;

            match key {
                "project-name" => self.project_name = Some(value_str.to_string()),
                "out-dir" => self.out_dir = Some(PathBuf::from(value_str)),
                "num-psi" => {
                    self.num_psi = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid integer value for {}: {}",
                            key, value_str
                        ))
                    })?);
                }
                "gate.min-anchors" => {
                    self.gate.get_or_insert_with(Default::default).min_anchors =
                        Some(value_str.parse().map_err(|_| {
                            CliError::Config(format!(
                                "Invalid integer value for {}: {}",
                                key, value_str
                            ))
                        })?);
                }
                "gate.required-coverage" => {
                    self.gate
                        .get_or_insert_with(Default::default)
                        .required_coverage = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                    })?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Loads the parameters every editing command runs with.
pub fn load(path: &Path, set_values: &[String]) -> Result<AnalysisParams> {
    PartialParams::from_file(path)?.finish(set_values)
}
