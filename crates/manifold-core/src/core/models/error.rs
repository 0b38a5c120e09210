use thiserror::Error;

/// Rejections raised synchronously by the record store and its value types.
///
/// Every variant leaves the store untouched.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ModelError {
    #[error("Sense index {0} is invalid (expected 0 for FWD or 1 for REV)")]
    InvalidSenseIndex(usize),

    #[error("Unknown sense '{0}' (expected 'fwd' or 'rev')")]
    UnknownSense(String),

    #[error("CC index must be positive")]
    ZeroCcIndex,

    #[error("PD index {index} is out of range for {len} thresholded PDs")]
    PdIndexOutOfRange { index: usize, len: usize },

    #[error("CC index {cc_index} is out of range [1, {num_psi}]")]
    CcIndexOutOfRange { cc_index: u32, num_psi: u32 },

    #[error("PD {0} is marked for removal and cannot be anchored")]
    PdTrashed(usize),

    #[error("PD {0} is both trashed and anchored")]
    TrashedAnchor(usize),

    #[error("Field '{field}' has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Number of eigenvector channels (num_psi) must be at least 1")]
    ZeroNumPsi,
}
