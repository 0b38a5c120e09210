//! Anchor coverage of the connected components (clusters) of PDs on the viewing sphere.
//!
//! Belief propagation only reaches the PDs of a cluster that contains at least one
//! anchor; clusters without an anchor are dropped from propagation. This module
//! answers which clusters are covered without mutating anything.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoverageReport {
    /// Number of anchored PDs considered.
    pub anchor_count: usize,
    /// Every distinct cluster label present in the store.
    pub all_clusters: BTreeSet<u32>,
    /// Cluster labels holding at least one anchor.
    pub covered_clusters: BTreeSet<u32>,
}

impl CoverageReport {
    pub fn covered_count(&self) -> usize {
        self.covered_clusters.len()
    }

    pub fn total_count(&self) -> usize {
        self.all_clusters.len()
    }

    pub fn uncovered_count(&self) -> usize {
        self.total_count() - self.covered_count()
    }

    /// Cluster labels that will be ignored during belief propagation.
    pub fn uncovered_clusters(&self) -> BTreeSet<u32> {
        self.all_clusters
            .difference(&self.covered_clusters)
            .copied()
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.covered_clusters == self.all_clusters
    }

    /// Fraction of clusters holding an anchor; an empty store counts as fully covered.
    pub fn fraction(&self) -> f64 {
        if self.all_clusters.is_empty() {
            return 1.0;
        }
        self.covered_count() as f64 / self.total_count() as f64
    }
}

/// Computes cluster coverage for a set of anchored PD indices.
///
/// Indices outside `cluster_ids` are ignored; the record store never produces them.
pub fn compute(cluster_ids: &[u32], anchored: impl IntoIterator<Item = usize>) -> CoverageReport {
    let mut anchor_count = 0;
    let covered_clusters: BTreeSet<u32> = anchored
        .into_iter()
        .filter_map(|index| cluster_ids.get(index).copied())
        .inspect(|_| anchor_count += 1)
        .collect();

    CoverageReport {
        anchor_count,
        all_clusters: cluster_ids.iter().copied().collect(),
        covered_clusters,
    }
}
