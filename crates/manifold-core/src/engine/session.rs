use super::config::{AnalysisParams, ConfigError};
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::topos::{self, ToposEntry};
use crate::core::io::clustering;
use crate::core::io::prds_file::{PrdsFile, PrdsFileError};
use crate::core::io::traits::RecordFile;
use crate::core::models::anchor::Anchor;
use crate::core::models::store::PdRecordStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// The explicit context of one anchor-selection session.
///
/// A session owns the analysis parameters and at most one record store. Every
/// component that needs the store borrows it from here; there is no global
/// instance. Edits happen in memory and only [`Session::save`] writes them out.
#[derive(Debug)]
pub struct Session {
    params: AnalysisParams,
    store: Option<PdRecordStore>,
    unsaved_changes: bool,
}

impl Session {
    pub fn new(params: AnalysisParams) -> Self {
        Self {
            params,
            store: None,
            unsaved_changes: false,
        }
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    pub fn is_initialized(&self) -> bool {
        self.store.is_some()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    /// The active record store.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotInitialized`] before a store has been imported,
    /// installed or loaded.
    pub fn prds(&self) -> Result<&PdRecordStore, EngineError> {
        self.store.as_ref().ok_or(EngineError::NotInitialized)
    }

    fn prds_mut(&mut self) -> Result<&mut PdRecordStore, EngineError> {
        self.store.as_mut().ok_or(EngineError::NotInitialized)
    }

    /// Installs a freshly built store, committing its cardinality to the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CorruptData`] if the store was built for a different
    /// number of eigenvector channels than the parameters declare.
    pub fn install(&mut self, store: PdRecordStore) -> Result<&PdRecordStore, EngineError> {
        if store.num_psi() != self.params.num_psi {
            return Err(EngineError::CorruptData {
                path: self.params.prds_path(),
                reason: format!(
                    "store has num_psi = {} but parameters declare {}",
                    store.num_psi(),
                    self.params.num_psi
                ),
            });
        }
        info!(
            "Installed PD data store with {} thresholded PDs.",
            store.n_thresholded()
        );
        self.params.n_thresholded = Some(store.n_thresholded());
        self.unsaved_changes = true;
        Ok(self.store.insert(store))
    }

    /// Builds a fresh store from the clustering stage's CSV output and installs it.
    pub fn import_clustering(
        &mut self,
        csv_path: &Path,
        reporter: &ProgressReporter,
    ) -> Result<&PdRecordStore, EngineError> {
        reporter.report(Progress::Importing {
            path: csv_path.to_path_buf(),
        });
        let store = clustering::read_clustering_csv(csv_path, self.params.num_psi)?;
        reporter.report(Progress::Done);
        self.install(store)
    }

    /// Replaces the active store with the one persisted at the parameters' location.
    ///
    /// Nothing is installed unless the file decodes, satisfies every store invariant
    /// and agrees with the parameters on `num_psi` and `n_thresholded`.
    #[instrument(skip_all, name = "load_prds")]
    pub fn load(&mut self, reporter: &ProgressReporter) -> Result<&PdRecordStore, EngineError> {
        let path = self.params.prds_path();
        reporter.report(Progress::Loading { path: path.clone() });

        let store = PrdsFile::read_from_path(&path)
            .map_err(|e| EngineError::from_load(path.clone(), e))?;
        self.check_against_params(&store, &path)?;

        info!(
            "Loaded PD data store from {:?}: {} PDs, {} anchor(s), {} trashed.",
            &path,
            store.n_thresholded(),
            store.anchors().len(),
            store.trash_ids().len()
        );
        reporter.report(Progress::Done);
        self.unsaved_changes = false;
        Ok(self.store.insert(store))
    }

    /// Atomically writes the whole store to the parameters' location.
    ///
    /// On failure the file on disk keeps its previous content and the in-memory
    /// store remains valid and usable.
    #[instrument(skip_all, name = "save_prds")]
    pub fn save(&mut self, reporter: &ProgressReporter) -> Result<PathBuf, EngineError> {
        let path = self.params.prds_path();
        let store = self.prds()?;
        reporter.report(Progress::Saving { path: path.clone() });

        fs::create_dir_all(&self.params.out_dir).map_err(|e| EngineError::Persistence {
            path: path.clone(),
            source: PrdsFileError::Io(e),
        })?;
        PrdsFile::write_to_path(store, &path).map_err(|e| EngineError::Persistence {
            path: path.clone(),
            source: e,
        })?;

        info!("Saved PD data store to {:?}", &path);
        reporter.report(Progress::Done);
        self.unsaved_changes = false;
        Ok(path)
    }

    /// Persists the analysis parameters to their well-known location.
    pub fn save_params(&self) -> Result<PathBuf, ConfigError> {
        fs::create_dir_all(&self.params.out_dir)?;
        self.params.save()
    }

    /// Sets or overwrites the anchor of a PD.
    pub fn insert_anchor(&mut self, pd_index: usize, anchor: Anchor) -> Result<(), EngineError> {
        let store = self.prds_mut()?;
        if store.anchor(pd_index) == Some(&anchor) {
            debug!(pd = pd_index, "Anchor unchanged.");
            return Ok(());
        }
        store.insert_anchor(pd_index, anchor)?;
        self.unsaved_changes = true;
        Ok(())
    }

    /// Removes the anchor of a PD; a no-op for unanchored PDs.
    pub fn remove_anchor(&mut self, pd_index: usize) -> Result<Option<Anchor>, EngineError> {
        let removed = self.prds_mut()?.remove_anchor(pd_index)?;
        if removed.is_some() {
            self.unsaved_changes = true;
        }
        Ok(removed)
    }

    /// Trashes or restores a PD. Trashing clears the PD's anchor, which is returned.
    pub fn set_trash(&mut self, pd_index: usize, trashed: bool) -> Result<Option<Anchor>, EngineError> {
        let store = self.prds_mut()?;
        let changed = store.is_trashed(pd_index) != trashed;
        let cleared = store.set_trash(pd_index, trashed)?;
        if changed {
            self.unsaved_changes = true;
        }
        Ok(cleared)
    }

    /// Lists the topos images of a PD (0-based index).
    pub fn topos(&self, pd_index: usize) -> Result<Vec<ToposEntry>, EngineError> {
        self.prds()?.record(pd_index)?;
        Ok(topos::inventory(&self.params, pd_index))
    }

    fn check_against_params(&self, store: &PdRecordStore, path: &Path) -> Result<(), EngineError> {
        if store.num_psi() != self.params.num_psi {
            return Err(EngineError::CorruptData {
                path: path.to_path_buf(),
                reason: format!(
                    "file declares num_psi = {} but parameters declare {}",
                    store.num_psi(),
                    self.params.num_psi
                ),
            });
        }
        if let Some(expected) = self.params.n_thresholded {
            if store.n_thresholded() != expected {
                return Err(EngineError::CorruptData {
                    path: path.to_path_buf(),
                    reason: format!(
                        "file holds {} PDs but parameters declare n_thresholded = {}",
                        store.n_thresholded(),
                        expected
                    ),
                });
            }
        }
        Ok(())
    }
}
