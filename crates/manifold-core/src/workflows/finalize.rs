use crate::core::coverage::CoverageReport;
use crate::engine::error::EngineError;
use crate::engine::gate::{FinalizeGate, GateState};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::session::Session;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Name of the pipeline stage that consumes a finalized store.
pub const NEXT_STAGE: &str = "compilation";

#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeOutcome {
    /// Too few anchors; nothing was persisted.
    Blocked {
        anchor_count: usize,
        min_anchors: usize,
    },
    /// Coverage was incomplete and the user chose to keep editing; nothing was persisted.
    Declined(CoverageReport),
    /// The store and parameters were persisted and handed to the next stage.
    Committed {
        report: CoverageReport,
        /// Whether incomplete coverage was explicitly accepted.
        confirmed: bool,
        prds_path: PathBuf,
        params_path: PathBuf,
        next_stage: &'static str,
    },
}

/// Finalizes anchor selection for belief propagation.
///
/// Runs the finalize gate against the session's store. A blocked attempt or a
/// declined warning returns without side effects. When the gate clears, whether
/// directly or after `confirm` accepts incomplete coverage, the store is saved,
/// then the parameters, and the hand-off to the next stage is reported.
///
/// `confirm` is only called when coverage is incomplete.
///
/// # Errors
///
/// A failed store save leaves the previous file in place and returns
/// [`EngineError::Persistence`]. The parameters are only written after the store;
/// if that second write fails the store file is already committed and
/// [`EngineError::ParamsNotCommitted`] names it.
#[instrument(skip_all, name = "finalize_workflow")]
pub fn run<F>(
    session: &mut Session,
    confirm: F,
    reporter: &ProgressReporter,
) -> Result<FinalizeOutcome, EngineError>
where
    F: FnOnce(&CoverageReport) -> bool,
{
    let mut gate = FinalizeGate::new(session.params().gate.clone());

    let state = gate.finalize(session.prds()?)?.clone();
    match state {
        GateState::Blocked {
            anchor_count,
            min_anchors,
        } => {
            gate.acknowledge()?;
            return Ok(FinalizeOutcome::Blocked {
                anchor_count,
                min_anchors,
            });
        }
        GateState::WarnConfirm(report) => {
            if !confirm(&report) {
                info!("Finalize declined; returning to editing.");
                gate.decline()?;
                return Ok(FinalizeOutcome::Declined(report));
            }
            gate.confirm()?;
        }
        GateState::Ready { .. } => {}
        state @ (GateState::Editing | GateState::Validating) => {
            return Err(EngineError::InvalidTransition {
                action: "finalize",
                state: state.name(),
            });
        }
    }

    let (report, confirmed) = gate.take_ready()?;
    if confirmed {
        warn!(
            "Proceeding with {} connected component(s) excluded from belief propagation.",
            report.uncovered_count()
        );
    }

    let prds_path = session.save(reporter)?;
    let params_path = session
        .save_params()
        .map_err(|source| EngineError::ParamsNotCommitted {
            prds_path: prds_path.clone(),
            source,
        })?;

    info!("Anchors finalized; handing off to the {} stage.", NEXT_STAGE);
    reporter.report(Progress::Message(format!(
        "Handing off to the {} stage.",
        NEXT_STAGE
    )));

    Ok(FinalizeOutcome::Committed {
        report,
        confirmed,
        prds_path,
        params_path,
        next_stage: NEXT_STAGE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::prds_file::PrdsFile;
    use crate::core::io::traits::RecordFile;
    use crate::core::models::anchor::{Anchor, Sense};
    use crate::engine::config::{AnalysisParams, AnalysisParamsBuilder};
    use std::cell::Cell;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn session_with_clusters(clusters: &[u32]) -> (TempDir, Session) {
        let dir = tempdir().unwrap();
        let params = AnalysisParamsBuilder::new()
            .project_name("fin")
            .out_dir(dir.path().join("out"))
            .num_psi(4)
            .build()
            .unwrap();
        let mut csv = String::from("phi,theta,occupancy,cluster_id\n");
        for (i, cluster) in clusters.iter().enumerate() {
            csv.push_str(&format!("{}.0,0.0,10,{}\n", i, cluster));
        }
        let csv_path = dir.path().join("clusters.csv");
        fs::write(&csv_path, csv).unwrap();

        let mut session = Session::new(params);
        session
            .import_clustering(&csv_path, &ProgressReporter::new())
            .unwrap();
        (dir, session)
    }

    #[test]
    fn zero_anchors_block_without_persisting() {
        let (_dir, mut session) = session_with_clusters(&[0, 0, 1]);
        let asked = Cell::new(false);

        let outcome = run(
            &mut session,
            |_| {
                asked.set(true);
                true
            },
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(
            outcome,
            FinalizeOutcome::Blocked {
                anchor_count: 0,
                min_anchors: 1
            }
        );
        assert!(!asked.get());
        assert!(!session.params().prds_path().exists());
    }

    #[test]
    fn declined_warning_persists_nothing() {
        let (_dir, mut session) = session_with_clusters(&[0, 0, 1]);
        session.insert_anchor(0, Anchor::default()).unwrap();

        let outcome = run(&mut session, |_| false, &ProgressReporter::new()).unwrap();

        let FinalizeOutcome::Declined(report) = outcome else {
            panic!("expected a declined outcome");
        };
        assert_eq!(report.uncovered_count(), 1);
        assert!(!session.params().prds_path().exists());
        assert!(session.has_unsaved_changes());
    }

    #[test]
    fn confirmed_warning_persists_store_and_params() {
        let (_dir, mut session) = session_with_clusters(&[0, 0, 1]);
        session
            .insert_anchor(1, Anchor::new(2, Sense::Reverse).unwrap())
            .unwrap();

        let outcome = run(&mut session, |_| true, &ProgressReporter::new()).unwrap();

        let FinalizeOutcome::Committed {
            confirmed,
            prds_path,
            params_path,
            next_stage,
            ..
        } = outcome
        else {
            panic!("expected a committed outcome");
        };
        assert!(confirmed);
        assert_eq!(next_stage, NEXT_STAGE);
        assert_eq!(
            &PrdsFile::read_from_path(&prds_path).unwrap(),
            session.prds().unwrap()
        );
        assert_eq!(
            AnalysisParams::load(&params_path).unwrap().n_thresholded,
            Some(3)
        );
    }

    #[test]
    fn full_coverage_commits_without_asking() {
        let (_dir, mut session) = session_with_clusters(&[0, 0, 1]);
        session.insert_anchor(0, Anchor::default()).unwrap();
        session.insert_anchor(2, Anchor::default()).unwrap();

        let outcome = run(
            &mut session,
            |_| panic!("confirmation must not be requested"),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(matches!(
            outcome,
            FinalizeOutcome::Committed {
                confirmed: false,
                ..
            }
        ));
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn params_failure_after_store_commit_names_the_written_store() {
        let (_dir, mut session) = session_with_clusters(&[0, 1]);
        session.insert_anchor(0, Anchor::default()).unwrap();
        session.insert_anchor(1, Anchor::default()).unwrap();

        // A non-empty directory at the parameter path cannot be replaced by a file.
        let params_target = session.params().params_path();
        fs::create_dir_all(&params_target).unwrap();
        fs::write(params_target.join("keep.txt"), "kept").unwrap();

        let result = run(&mut session, |_| true, &ProgressReporter::new());

        let Err(EngineError::ParamsNotCommitted { prds_path, .. }) = &result else {
            panic!("expected the parameter commit to fail, got {result:?}");
        };
        assert_eq!(prds_path, &session.params().prds_path());
        assert_eq!(
            &PrdsFile::read_from_path(prds_path).unwrap(),
            session.prds().unwrap()
        );
    }

    #[test]
    fn uninitialized_session_is_rejected() {
        let params = AnalysisParamsBuilder::new()
            .project_name("fin")
            .out_dir(PathBuf::from("out"))
            .num_psi(4)
            .build()
            .unwrap();
        let mut session = Session::new(params);
        let result = run(&mut session, |_| true, &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::NotInitialized)));
    }
}
