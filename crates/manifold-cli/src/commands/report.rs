use crate::commands::open_session;
use crate::error::Result;
use manifoldem::core::coverage::CoverageReport;
use manifoldem::engine::config::AnalysisParams;

pub fn selections(params: AnalysisParams) -> Result<()> {
    let session = open_session(params)?;
    let store = session.prds()?;

    println!("Anchored PDs ({}):", store.anchors().len());
    for (index, anchor) in store.anchors() {
        println!("  PD {}: {}", index + 1, anchor);
    }
    println!("Trashed PDs ({}):", store.trash_ids().len());
    for index in store.trash_ids() {
        println!("  PD {}", index + 1);
    }
    Ok(())
}

pub fn coverage(params: AnalysisParams) -> Result<()> {
    let session = open_session(params)?;
    let report = session.prds()?.coverage();
    for line in describe(&report) {
        println!("{}", line);
    }
    Ok(())
}

/// Human-readable summary of a coverage report.
pub fn describe(report: &CoverageReport) -> Vec<String> {
    let mut lines = vec![
        format!("Anchors: {}", report.anchor_count),
        format!(
            "Connected components covered: {} / {} ({:.1}%)",
            report.covered_count(),
            report.total_count(),
            report.fraction() * 100.0
        ),
    ];
    let uncovered = report.uncovered_clusters();
    if !uncovered.is_empty() {
        let labels: Vec<String> = uncovered.iter().map(u32::to_string).collect();
        lines.push(format!("Uncovered components: {}", labels.join(", ")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifoldem::core::coverage;

    #[test]
    fn describe_lists_uncovered_components() {
        let report = coverage::compute(&[0, 0, 1, 1, 2], [0, 3]);
        let lines = describe(&report);
        assert_eq!(
            lines,
            vec![
                "Anchors: 2".to_string(),
                "Connected components covered: 2 / 3 (66.7%)".to_string(),
                "Uncovered components: 2".to_string(),
            ]
        );
    }

    #[test]
    fn describe_omits_uncovered_line_when_complete() {
        let report = coverage::compute(&[4, 7], [0, 1]);
        let lines = describe(&report);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("(100.0%)"));
    }
}
