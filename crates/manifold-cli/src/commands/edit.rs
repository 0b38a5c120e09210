use crate::cli::{AnchorCommands, PdListArgs};
use crate::commands::{open_session, save_session};
use crate::error::Result;
use crate::utils::parser::pd_index;
use manifoldem::core::models::anchor::Anchor;
use manifoldem::engine::config::AnalysisParams;
use manifoldem::engine::error::EngineError;
use manifoldem::engine::session::Session;
use tracing::info;

pub fn trash(args: PdListArgs, params: AnalysisParams) -> Result<()> {
    set_trash(args, params, true)
}

pub fn restore(args: PdListArgs, params: AnalysisParams) -> Result<()> {
    set_trash(args, params, false)
}

fn set_trash(args: PdListArgs, params: AnalysisParams, trashed: bool) -> Result<()> {
    let mut session = open_session(params)?;
    let indices = resolve_all(&session, &args.pds)?;

    for (number, index) in args.pds.iter().zip(indices) {
        let cleared = session.set_trash(index, trashed)?;
        if let Some(anchor) = cleared {
            println!("PD {}: anchor {} cleared.", number, anchor);
        }
        info!(pd = number, trashed, "Updated trash state.");
    }

    let verb = if trashed { "Trashed" } else { "Restored" };
    println!("{} {} PD(s).", verb, args.pds.len());
    save_session(&mut session)
}

pub fn anchor(command: AnchorCommands, params: AnalysisParams) -> Result<()> {
    let mut session = open_session(params)?;

    match command {
        AnchorCommands::Set { pd, cc, sense } => {
            let index = pd_index(pd, session.prds()?.n_thresholded())?;
            let anchor = Anchor::new(cc, sense).map_err(EngineError::from)?;
            session.insert_anchor(index, anchor)?;
            println!("PD {}: anchored to {}.", pd, anchor);
        }
        AnchorCommands::Remove { pd } => {
            let index = pd_index(pd, session.prds()?.n_thresholded())?;
            match session.remove_anchor(index)? {
                Some(anchor) => println!("PD {}: removed anchor {}.", pd, anchor),
                None => println!("PD {} has no anchor.", pd),
            }
        }
    }

    save_session(&mut session)
}

/// Validates every PD number before any edit is applied, so a bad number leaves the store untouched.
fn resolve_all(session: &Session, numbers: &[usize]) -> Result<Vec<usize>> {
    let count = session.prds()?.n_thresholded();
    numbers
        .iter()
        .map(|&number| pd_index(number, count).map_err(Into::into))
        .collect()
}
