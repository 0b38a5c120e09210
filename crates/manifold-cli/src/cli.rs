use clap::{Args, Parser, Subcommand};
use manifoldem::core::models::anchor::Sense;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "ManifoldEM Developers",
    version,
    about = "ManifoldEM CLI - Review projection directions, select anchors and finalize them for belief propagation.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to the analysis parameter file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH", default_value = "params.toml")]
    pub params: PathBuf,

    /// Set a specific parameter value, overriding the parameter file.
    /// Can be used multiple times. Example: -S gate.min-anchors=3
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a new PD data store from the clustering stage's output.
    Init(InitArgs),
    /// Show one projection direction together with its topos images.
    Show(PdArgs),
    /// Remove projection directions from the reconstruction. Clears their anchors.
    Trash(PdListArgs),
    /// Return trashed projection directions to the reconstruction.
    Restore(PdListArgs),
    /// Set or remove the anchor of a projection direction.
    Anchor(AnchorArgs),
    /// List anchored and trashed projection directions.
    Selections,
    /// Report which connected components hold at least one anchor.
    Coverage,
    /// Validate anchor coverage and hand the store to belief propagation.
    Finalize(FinalizeArgs),
}

/// Arguments for the `init` subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// CSV with one row per thresholded PD: phi,theta,occupancy,cluster_id
    #[arg(short, long, required = true, value_name = "PATH")]
    pub clustering: PathBuf,

    /// Project name, overriding the parameter file.
    #[arg(long, value_name = "NAME")]
    pub project_name: Option<String>,

    /// Output directory, overriding the parameter file.
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Number of eigenvector channels per PD, overriding the parameter file.
    #[arg(long, value_name = "INT")]
    pub num_psi: Option<u32>,

    /// Replace an existing PD data store.
    #[arg(long)]
    pub force: bool,
}

/// A single projection direction, numbered from 1.
#[derive(Args, Debug)]
pub struct PdArgs {
    #[arg(value_name = "PD")]
    pub pd: usize,
}

/// One or more projection directions, numbered from 1.
#[derive(Args, Debug)]
pub struct PdListArgs {
    #[arg(value_name = "PD", required = true, num_args = 1..)]
    pub pds: Vec<usize>,
}

#[derive(Args, Debug)]
pub struct AnchorArgs {
    #[command(subcommand)]
    pub command: AnchorCommands,
}

#[derive(Subcommand, Debug)]
pub enum AnchorCommands {
    /// Anchor a PD to an eigenvector and sense. Overwrites any existing anchor.
    Set {
        #[arg(value_name = "PD")]
        pd: usize,

        /// 1-based eigenvector index (conformational coordinate).
        #[arg(long, default_value_t = 1, value_name = "INT")]
        cc: u32,

        /// Sign convention: fwd or rev.
        #[arg(long, default_value = "fwd", value_name = "SENSE")]
        sense: Sense,
    },
    /// Remove the anchor of a PD. Unanchored PDs are left as they are.
    Remove {
        #[arg(value_name = "PD")]
        pd: usize,
    },
}

/// Arguments for the `finalize` subcommand.
#[derive(Args, Debug)]
pub struct FinalizeArgs {
    /// Accept incomplete coverage without prompting.
    #[arg(short, long)]
    pub yes: bool,
}
