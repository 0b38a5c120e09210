use super::anchor::Anchor;
use super::error::ModelError;
use super::record::{PdGeometry, PdRecord};
use crate::core::coverage::{self, CoverageReport};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// The projection-direction record store.
///
/// One row per thresholded projection direction (PD), addressed by a dense 0-based
/// index fixed at construction. Geometry, occupancy and cluster membership are
/// immutable once the store exists; the trash set and the anchor map are the only
/// state edited during an anchor-selection session.
///
/// Anchors are kept as a sparse map because only a handful of PDs are ever
/// anchored. A PD can never be both trashed and anchored: [`PdRecordStore::set_trash`]
/// clears the anchor of any PD it trashes, and [`PdRecordStore::insert_anchor`]
/// refuses trashed PDs.
#[derive(Debug, Clone, PartialEq)]
pub struct PdRecordStore {
    /// Number of eigenvector channels computed per PD; bounds anchor CC indices.
    num_psi: u32,
    /// Azimuth of each PD in degrees.
    phi_thresholded: Vec<f64>,
    /// Elevation of each PD in degrees.
    theta_thresholded: Vec<f64>,
    /// Number of particle images assigned to each PD.
    occupancy: Vec<u64>,
    /// Connected-component label of each PD on the viewing sphere.
    cluster_ids: Vec<u32>,
    /// PDs excluded from the final reconstruction.
    trash_ids: BTreeSet<usize>,
    /// Confirmed conformational coordinates, keyed by PD index.
    anchors: BTreeMap<usize, Anchor>,
}

impl PdRecordStore {
    /// Creates a store with no trashed PDs and no anchors.
    ///
    /// # Arguments
    ///
    /// * `num_psi` - Number of eigenvector channels per PD (at least 1).
    /// * `phi_thresholded` - Azimuth per PD, in degrees.
    /// * `theta_thresholded` - Elevation per PD, in degrees.
    /// * `occupancy` - Particle count per PD.
    /// * `cluster_ids` - Connected-component label per PD.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ZeroNumPsi`] if `num_psi` is zero and
    /// [`ModelError::LengthMismatch`] if the per-PD columns differ in length.
    pub fn new(
        num_psi: u32,
        phi_thresholded: Vec<f64>,
        theta_thresholded: Vec<f64>,
        occupancy: Vec<u64>,
        cluster_ids: Vec<u32>,
    ) -> Result<Self, ModelError> {
        Self::from_parts(
            num_psi,
            phi_thresholded,
            theta_thresholded,
            occupancy,
            cluster_ids,
            BTreeSet::new(),
            BTreeMap::new(),
        )
    }

    /// Assembles a store from every field, checking all invariants.
    ///
    /// This is the entry point for deserialized data: nothing is installed unless
    /// the columns agree in length, every trashed and anchored index is in range,
    /// every anchor CC index lies in `[1, num_psi]`, and no PD is both trashed and
    /// anchored.
    ///
    /// # Errors
    ///
    /// Returns the first [`ModelError`] describing the violated invariant.
    pub fn from_parts(
        num_psi: u32,
        phi_thresholded: Vec<f64>,
        theta_thresholded: Vec<f64>,
        occupancy: Vec<u64>,
        cluster_ids: Vec<u32>,
        trash_ids: BTreeSet<usize>,
        anchors: BTreeMap<usize, Anchor>,
    ) -> Result<Self, ModelError> {
        let store = Self {
            num_psi,
            phi_thresholded,
            theta_thresholded,
            occupancy,
            cluster_ids,
            trash_ids,
            anchors,
        };
        store.validate()?;
        Ok(store)
    }

    /// Checks every structural invariant of the store.
    ///
    /// # Errors
    ///
    /// Returns the first [`ModelError`] describing the violated invariant.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.num_psi == 0 {
            return Err(ModelError::ZeroNumPsi);
        }

        let expected = self.phi_thresholded.len();
        let columns = [
            ("theta_thresholded", self.theta_thresholded.len()),
            ("occupancy", self.occupancy.len()),
            ("cluster_ids", self.cluster_ids.len()),
        ];
        for (field, found) in columns {
            if found != expected {
                return Err(ModelError::LengthMismatch {
                    field,
                    expected,
                    found,
                });
            }
        }

        for &index in &self.trash_ids {
            self.check_index(index)?;
        }
        for (&index, anchor) in &self.anchors {
            self.check_index(index)?;
            self.check_cc_index(anchor.cc_index)?;
            if self.trash_ids.contains(&index) {
                return Err(ModelError::TrashedAnchor(index));
            }
        }
        Ok(())
    }

    /// Number of thresholded PDs.
    pub fn n_thresholded(&self) -> usize {
        self.phi_thresholded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phi_thresholded.is_empty()
    }

    pub fn num_psi(&self) -> u32 {
        self.num_psi
    }

    pub fn phi_thresholded(&self) -> &[f64] {
        &self.phi_thresholded
    }

    pub fn theta_thresholded(&self) -> &[f64] {
        &self.theta_thresholded
    }

    pub fn occupancy(&self) -> &[u64] {
        &self.occupancy
    }

    pub fn cluster_ids(&self) -> &[u32] {
        &self.cluster_ids
    }

    pub fn trash_ids(&self) -> &BTreeSet<usize> {
        &self.trash_ids
    }

    pub fn anchors(&self) -> &BTreeMap<usize, Anchor> {
        &self.anchors
    }

    /// Returns the anchor of a PD, if one has been confirmed.
    pub fn anchor(&self, index: usize) -> Option<&Anchor> {
        self.anchors.get(&index)
    }

    /// Returns the anchor of a PD, or the default selection (first CC, forward)
    /// when none has been confirmed.
    pub fn anchor_or_default(&self, index: usize) -> Anchor {
        self.anchors.get(&index).copied().unwrap_or_default()
    }

    pub fn is_trashed(&self, index: usize) -> bool {
        self.trash_ids.contains(&index)
    }

    /// Returns a snapshot of one row.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::PdIndexOutOfRange`] for an index past the end.
    pub fn record(&self, index: usize) -> Result<PdRecord, ModelError> {
        self.check_index(index)?;
        Ok(self.record_unchecked(index))
    }

    /// Iterates over every row in index order.
    pub fn records(&self) -> impl Iterator<Item = PdRecord> + '_ {
        (0..self.n_thresholded()).map(|index| self.record_unchecked(index))
    }

    /// Sets or overwrites the anchor of a PD.
    ///
    /// Re-inserting an identical anchor leaves the store unchanged.
    ///
    /// # Arguments
    ///
    /// * `index` - 0-based PD index.
    /// * `anchor` - The confirmed conformational coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::PdIndexOutOfRange`], [`ModelError::CcIndexOutOfRange`]
    /// or [`ModelError::PdTrashed`]; the store is unchanged in every case.
    pub fn insert_anchor(&mut self, index: usize, anchor: Anchor) -> Result<(), ModelError> {
        self.check_index(index)?;
        self.check_cc_index(anchor.cc_index)?;
        if self.trash_ids.contains(&index) {
            return Err(ModelError::PdTrashed(index));
        }
        debug!(pd = index, %anchor, "Inserting anchor.");
        self.anchors.insert(index, anchor);
        Ok(())
    }

    /// Removes the anchor of a PD, returning it if there was one.
    ///
    /// Removing from an unanchored PD is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::PdIndexOutOfRange`] for an index past the end.
    pub fn remove_anchor(&mut self, index: usize) -> Result<Option<Anchor>, ModelError> {
        self.check_index(index)?;
        let removed = self.anchors.remove(&index);
        if removed.is_some() {
            debug!(pd = index, "Removed anchor.");
        }
        Ok(removed)
    }

    /// Marks a PD for removal from, or restores it to, the final reconstruction.
    ///
    /// Trashing a PD also removes its anchor, so the trash/anchor exclusion holds
    /// no matter who calls this. Returns the anchor that was cleared, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::PdIndexOutOfRange`] for an index past the end.
    pub fn set_trash(&mut self, index: usize, trashed: bool) -> Result<Option<Anchor>, ModelError> {
        self.check_index(index)?;
        if !trashed {
            if self.trash_ids.remove(&index) {
                debug!(pd = index, "Restored PD.");
            }
            return Ok(None);
        }

        self.trash_ids.insert(index);
        let cleared = self.anchors.remove(&index);
        debug!(pd = index, cleared_anchor = cleared.is_some(), "Trashed PD.");
        Ok(cleared)
    }

    /// Computes which clusters hold at least one anchor.
    pub fn coverage(&self) -> CoverageReport {
        coverage::compute(&self.cluster_ids, self.anchors.keys().copied())
    }

    fn record_unchecked(&self, index: usize) -> PdRecord {
        PdRecord {
            index,
            geometry: PdGeometry {
                phi: self.phi_thresholded[index],
                theta: self.theta_thresholded[index],
                occupancy: self.occupancy[index],
                cluster_id: self.cluster_ids[index],
            },
            trashed: self.trash_ids.contains(&index),
            anchor: self.anchors.get(&index).copied(),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), ModelError> {
        let len = self.n_thresholded();
        if index >= len {
            return Err(ModelError::PdIndexOutOfRange { index, len });
        }
        Ok(())
    }

    fn check_cc_index(&self, cc_index: u32) -> Result<(), ModelError> {
        if cc_index == 0 || cc_index > self.num_psi {
            return Err(ModelError::CcIndexOutOfRange {
                cc_index,
                num_psi: self.num_psi,
            });
        }
        Ok(())
    }
}

/// Incremental construction of a [`PdRecordStore`] from upstream PD rows.
pub struct PdRecordStoreBuilder {
    num_psi: u32,
    phi_thresholded: Vec<f64>,
    theta_thresholded: Vec<f64>,
    occupancy: Vec<u64>,
    cluster_ids: Vec<u32>,
}

impl PdRecordStoreBuilder {
    pub fn new(num_psi: u32) -> Self {
        Self {
            num_psi,
            phi_thresholded: Vec::new(),
            theta_thresholded: Vec::new(),
            occupancy: Vec::new(),
            cluster_ids: Vec::new(),
        }
    }

    pub fn add_pd(&mut self, geometry: PdGeometry) -> &mut Self {
        self.phi_thresholded.push(geometry.phi);
        self.theta_thresholded.push(geometry.theta);
        self.occupancy.push(geometry.occupancy);
        self.cluster_ids.push(geometry.cluster_id);
        self
    }

    pub fn len(&self) -> usize {
        self.phi_thresholded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phi_thresholded.is_empty()
    }

    pub fn build(self) -> Result<PdRecordStore, ModelError> {
        PdRecordStore::new(
            self.num_psi,
            self.phi_thresholded,
            self.theta_thresholded,
            self.occupancy,
            self.cluster_ids,
        )
    }
}
