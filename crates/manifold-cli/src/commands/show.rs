use crate::cli::PdArgs;
use crate::commands::open_session;
use crate::error::Result;
use crate::utils::parser::pd_index;
use manifoldem::engine::config::AnalysisParams;
use manifoldem::engine::error::EngineError;

pub fn run(args: PdArgs, params: AnalysisParams) -> Result<()> {
    let session = open_session(params)?;
    let store = session.prds()?;
    let index = pd_index(args.pd, store.n_thresholded())?;
    let record = store.record(index).map_err(EngineError::from)?;

    println!("PD {} / {}", record.display_number(), store.n_thresholded());
    println!(
        "  phi: {:.4}°  theta: {:.4}°",
        record.geometry.phi, record.geometry.theta
    );
    println!("  occupancy: {}", record.geometry.occupancy);
    println!("  connected component: {}", record.geometry.cluster_id);
    println!(
        "  status: {}",
        if record.trashed { "trashed" } else { "active" }
    );
    match record.anchor {
        Some(anchor) => println!("  anchor: {}", anchor),
        None if record.trashed => println!("  anchor: none"),
        None => println!(
            "  anchor: none (defaults to {})",
            store.anchor_or_default(index)
        ),
    }

    println!("Topos images:");
    for entry in session.topos(index)? {
        let status = if entry.available { "✓" } else { "missing" };
        println!("  Psi {:<3} {:<8} {}", entry.psi, status, entry.path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use crate::utils::parser::ParseError;
    use manifoldem::engine::config::AnalysisParamsBuilder;
    use manifoldem::engine::progress::ProgressReporter;
    use manifoldem::workflows;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn initialized_params() -> (TempDir, AnalysisParams) {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("clusters.csv");
        fs::write(&csv, "phi,theta,occupancy,cluster_id\n0.0,0.0,10,0\n45.0,10.0,20,1\n").unwrap();
        let params = AnalysisParamsBuilder::new()
            .project_name("show")
            .out_dir(dir.path().join("out"))
            .num_psi(3)
            .build()
            .unwrap();
        let result =
            workflows::initialize::run(params, &csv, false, &ProgressReporter::new()).unwrap();
        let params = result.session.params().clone();
        (dir, params)
    }

    #[test]
    fn show_prints_an_existing_pd() {
        let (_dir, params) = initialized_params();
        assert!(run(PdArgs { pd: 2 }, params).is_ok());
    }

    #[test]
    fn show_rejects_pd_numbers_outside_the_store() {
        let (_dir, params) = initialized_params();
        let result = run(PdArgs { pd: 3 }, params.clone());
        assert!(matches!(
            result,
            Err(CliError::Argument(ParseError::PdNumberOutOfRange { number: 3, count: 2 }))
        ));
        assert!(matches!(
            run(PdArgs { pd: 0 }, params),
            Err(CliError::Argument(ParseError::ZeroPdNumber))
        ));
    }
}
