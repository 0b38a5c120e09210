mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("🚀 ManifoldEM CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = dispatch(cli);

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }
    command_result
}

fn dispatch(cli: Cli) -> Result<()> {
    let load_params = || config::load(&cli.params, &cli.set_values);

    match cli.command {
        Commands::Init(args) => {
            info!("Dispatching to 'init' command.");
            commands::init::run(args, &cli.params, &cli.set_values)
        }
        Commands::Show(args) => {
            info!("Dispatching to 'show' command.");
            commands::show::run(args, load_params()?)
        }
        Commands::Trash(args) => {
            info!("Dispatching to 'trash' command.");
            commands::edit::trash(args, load_params()?)
        }
        Commands::Restore(args) => {
            info!("Dispatching to 'restore' command.");
            commands::edit::restore(args, load_params()?)
        }
        Commands::Anchor(args) => {
            info!("Dispatching to 'anchor' command.");
            commands::edit::anchor(args.command, load_params()?)
        }
        Commands::Selections => {
            info!("Dispatching to 'selections' command.");
            commands::report::selections(load_params()?)
        }
        Commands::Coverage => {
            info!("Dispatching to 'coverage' command.");
            commands::report::coverage(load_params()?)
        }
        Commands::Finalize(args) => {
            info!("Dispatching to 'finalize' command.");
            commands::finalize::run(args, load_params()?)
        }
    }
}
