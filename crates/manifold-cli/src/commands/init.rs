use crate::cli::InitArgs;
use crate::config::PartialParams;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use manifoldem::engine::progress::ProgressReporter;
use manifoldem::workflows;
use std::path::Path;
use tracing::info;

pub fn run(args: InitArgs, params_path: &Path, set_values: &[String]) -> Result<()> {
    info!("Merging analysis parameters from file and CLI arguments...");
    let params = PartialParams::from_file_or_default(params_path)?
        .merge_init_args(&args)
        .finish(set_values)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let result = workflows::initialize::run(params, &args.clustering, args.force, &reporter)?;
    let store = result.session.prds()?;

    println!(
        "Created PD data store with {} PDs in {} connected components.",
        store.n_thresholded(),
        store.coverage().total_count()
    );
    println!("  PD data:    {}", result.prds_path.display());
    println!("  Parameters: {}", result.params_path.display());
    println!(
        "Pass '--params {}' to subsequent commands.",
        result.params_path.display()
    );
    Ok(())
}
