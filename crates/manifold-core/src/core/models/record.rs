use super::anchor::Anchor;

/// Upstream description of one projection direction, as produced by the
/// clustering stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdGeometry {
    /// Azimuth in degrees.
    pub phi: f64,
    /// Elevation in degrees.
    pub theta: f64,
    pub occupancy: u64,
    pub cluster_id: u32,
}

/// Read-only snapshot of a single row of the record store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdRecord {
    /// 0-based PD index.
    pub index: usize,
    pub geometry: PdGeometry,
    pub trashed: bool,
    pub anchor: Option<Anchor>,
}

impl PdRecord {
    /// 1-based number used when presenting PDs to users.
    pub fn display_number(&self) -> usize {
        self.index + 1
    }

    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }
}
