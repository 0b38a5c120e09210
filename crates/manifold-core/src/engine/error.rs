use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::clustering::ImportError;
use crate::core::io::prds_file::PrdsFileError;
use crate::core::models::error::ModelError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "PD data store is not initialized: import clustering output or load a saved store first"
    )]
    NotInitialized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ModelError),

    #[error("Failed to persist PD data to '{path}': {source}", path = path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: PrdsFileError,
    },

    #[error("Corrupt PD data in '{path}': {reason}", path = path.display())]
    CorruptData { path: PathBuf, reason: String },

    #[error("A PD data store already exists at '{path}'", path = path.display())]
    StoreExists { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "PD data was committed to '{prds_path}' but the analysis parameters could not be saved: {source}",
        prds_path = prds_path.display()
    )]
    ParamsNotCommitted {
        prds_path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("Clustering import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Cannot {action} while the finalize gate is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

impl EngineError {
    /// Classifies a failure to read the persisted store.
    pub(crate) fn from_load(path: PathBuf, source: PrdsFileError) -> Self {
        if source.is_corrupt_data() {
            EngineError::CorruptData {
                path,
                reason: source.to_string(),
            }
        } else {
            EngineError::Persistence { path, source }
        }
    }
}
