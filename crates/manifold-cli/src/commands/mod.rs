pub mod edit;
pub mod finalize;
pub mod init;
pub mod report;
pub mod show;

use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use manifoldem::engine::config::AnalysisParams;
use manifoldem::engine::progress::ProgressReporter;
use manifoldem::engine::session::Session;
use tracing::info;

/// Opens an editing session on the store persisted for `params`.
pub fn open_session(params: AnalysisParams) -> Result<Session> {
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let mut session = Session::new(params);
    session.load(&reporter)?;
    Ok(session)
}

/// Persists in-memory edits, if there are any.
pub fn save_session(session: &mut Session) -> Result<()> {
    if !session.has_unsaved_changes() {
        info!("No changes to save.");
        return Ok(());
    }
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let path = session.save(&reporter)?;
    println!("Saved PD data to {}", path.display());
    Ok(())
}
