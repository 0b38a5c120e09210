use super::config::AnalysisParams;
use std::path::PathBuf;

/// One eigenvector channel of a PD and whether the embedding stage rendered its topos image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToposEntry {
    /// 1-based eigenvector index.
    pub psi: u32,
    pub path: PathBuf,
    pub available: bool,
}

/// Lists the topos images of a PD (0-based index) for every eigenvector channel.
///
/// Missing images are reported, not treated as errors: the embedding stage may
/// not have rendered every channel, and those channels simply cannot be inspected.
pub fn inventory(params: &AnalysisParams, pd_index: usize) -> Vec<ToposEntry> {
    (1..=params.num_psi)
        .map(|psi| {
            let path = params.topos_path(pd_index + 1, psi);
            let available = path.is_file();
            ToposEntry {
                psi,
                path,
                available,
            }
        })
        .collect()
}
