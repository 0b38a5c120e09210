use crate::cli::FinalizeArgs;
use crate::commands::{open_session, report};
use crate::error::Result;
use crate::utils::parser::is_affirmative;
use crate::utils::progress::CliProgressHandler;
use manifoldem::core::coverage::CoverageReport;
use manifoldem::engine::config::AnalysisParams;
use manifoldem::engine::progress::ProgressReporter;
use manifoldem::workflows::finalize::{self, FinalizeOutcome};
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

pub fn run(args: FinalizeArgs, params: AnalysisParams) -> Result<()> {
    let mut session = open_session(params)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let outcome = finalize::run(
        &mut session,
        |report| {
            if args.yes {
                info!("Accepting incomplete coverage (--yes).");
                return true;
            }
            let stdin = io::stdin();
            prompt(report, &mut stdin.lock(), &mut io::stdout())
        },
        &reporter,
    )?;

    match outcome {
        FinalizeOutcome::Blocked {
            anchor_count,
            min_anchors,
        } => {
            println!(
                "At least {} anchor(s) must be selected before finalizing; {} selected.",
                min_anchors, anchor_count
            );
        }
        FinalizeOutcome::Declined(_) => {
            println!("Finalize cancelled. Nothing was written.");
        }
        FinalizeOutcome::Committed {
            report,
            prds_path,
            params_path,
            next_stage,
            ..
        } => {
            for line in report::describe(&report) {
                println!("{}", line);
            }
            println!("PD data written to {}", prds_path.display());
            println!("Parameters written to {}", params_path.display());
            println!("Anchors finalized. Continue with the {} stage.", next_stage);
        }
    }
    Ok(())
}

fn warning_text(report: &CoverageReport) -> String {
    format!(
        "Only {} of {} connected components hold an anchor. \
         PDs in the remaining {} component(s) will be ignored during belief propagation.",
        report.covered_count(),
        report.total_count(),
        report.uncovered_count()
    )
}

/// Asks whether to proceed despite incomplete coverage. A failed read declines.
fn prompt(report: &CoverageReport, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    let mut answer = String::new();
    let asked = writeln!(output, "{}", warning_text(report))
        .and_then(|_| write!(output, "Proceed anyway? [y/N] "))
        .and_then(|_| output.flush())
        .and_then(|_| input.read_line(&mut answer));

    match asked {
        Ok(_) => is_affirmative(&answer),
        Err(e) => {
            warn!("Could not read confirmation: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifoldem::core::coverage;
    use std::io::Cursor;

    fn partial_report() -> CoverageReport {
        coverage::compute(&[0, 0, 1], [0])
    }

    #[test]
    fn prompt_accepts_yes_and_shows_counts() {
        let mut output = Vec::new();
        let accepted = prompt(&partial_report(), &mut Cursor::new("yes\n"), &mut output);

        assert!(accepted);
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Only 1 of 2 connected components hold an anchor."));
        assert!(shown.ends_with("Proceed anyway? [y/N] "));
    }

    #[test]
    fn prompt_declines_on_empty_answer_or_eof() {
        let mut output = Vec::new();
        assert!(!prompt(&partial_report(), &mut Cursor::new("\n"), &mut output));
        assert!(!prompt(&partial_report(), &mut Cursor::new(""), &mut output));
    }
}
