use crate::engine::config::AnalysisParams;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::session::Session;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Debug)]
pub struct InitializeResult {
    pub session: Session,
    pub prds_path: PathBuf,
    pub params_path: PathBuf,
}

/// Starts a new anchor-selection analysis from the clustering stage's output.
///
/// Builds a record store from `clustering_csv`, then persists both the store and the
/// parameters (with `n_thresholded` committed). An existing store at the target
/// location is only replaced when `overwrite` is set.
#[instrument(skip_all, name = "initialize_workflow")]
pub fn run(
    params: AnalysisParams,
    clustering_csv: &Path,
    overwrite: bool,
    reporter: &ProgressReporter,
) -> Result<InitializeResult, EngineError> {
    params.validate()?;

    let target = params.prds_path();
    if target.exists() && !overwrite {
        return Err(EngineError::StoreExists { path: target });
    }

    info!(
        "Building PD data store for project '{}' from {:?}",
        params.project_name, clustering_csv
    );
    let mut session = Session::new(params);
    session.import_clustering(clustering_csv, reporter)?;

    let prds_path = session.save(reporter)?;
    let params_path = session.save_params()?;

    Ok(InitializeResult {
        session,
        prds_path,
        params_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::AnalysisParamsBuilder;
    use std::fs;
    use tempfile::tempdir;

    fn params(out_dir: PathBuf) -> AnalysisParams {
        AnalysisParamsBuilder::new()
            .project_name("init")
            .out_dir(out_dir)
            .num_psi(8)
            .build()
            .unwrap()
    }

    #[test]
    fn run_persists_store_and_params() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("clusters.csv");
        fs::write(&csv, "phi,theta,occupancy,cluster_id\n1.0,2.0,3,0\n4.0,5.0,6,1\n").unwrap();

        let result = run(
            params(dir.path().join("out")),
            &csv,
            false,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(result.prds_path.is_file());
        let saved = AnalysisParams::load(&result.params_path).unwrap();
        assert_eq!(saved.n_thresholded, Some(2));
        assert!(!result.session.has_unsaved_changes());
    }

    #[test]
    fn run_refuses_to_overwrite_without_flag() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("clusters.csv");
        fs::write(&csv, "phi,theta,occupancy,cluster_id\n1.0,2.0,3,0\n").unwrap();
        let out = dir.path().join("out");

        run(params(out.clone()), &csv, false, &ProgressReporter::new()).unwrap();
        let second = run(params(out.clone()), &csv, false, &ProgressReporter::new());
        assert!(matches!(second, Err(EngineError::StoreExists { .. })));

        let forced = run(params(out), &csv, true, &ProgressReporter::new());
        assert!(forced.is_ok());
    }

    #[test]
    fn run_propagates_import_errors_without_writing() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("clusters.csv");
        fs::write(&csv, "phi,theta,occupancy,cluster_id\n").unwrap();
        let out = dir.path().join("out");

        let result = run(params(out.clone()), &csv, false, &ProgressReporter::new());

        assert!(matches!(result, Err(EngineError::Import(_))));
        assert!(!out.exists());
    }
}
