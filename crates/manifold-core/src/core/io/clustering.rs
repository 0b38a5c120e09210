use crate::core::models::error::ModelError;
use crate::core::models::record::PdGeometry;
use crate::core::models::store::{PdRecordStore, PdRecordStoreBuilder};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Clustering table '{path}' contains no projection directions")]
    Empty { path: String },
    #[error("Clustering table '{path}' row {row}: angle '{field}' is not finite")]
    NonFiniteAngle {
        path: String,
        row: usize,
        field: &'static str,
    },
    #[error("Invalid clustering table: {0}")]
    Model(#[from] ModelError),
}

/// One row of the upstream clustering table, one per thresholded PD in index order.
#[derive(Debug, Deserialize)]
struct ClusteringRow {
    phi: f64,
    theta: f64,
    occupancy: u64,
    cluster_id: u32,
}

/// Builds a fresh record store from the clustering stage's CSV output.
///
/// The table must have the header `phi,theta,occupancy,cluster_id`; row order
/// defines the PD index.
pub fn read_clustering_csv(path: &Path, num_psi: u32) -> Result<PdRecordStore, ImportError> {
    let label = path.to_string_lossy().to_string();
    let reader = csv::Reader::from_path(path).map_err(|e| ImportError::Csv {
        path: label.clone(),
        source: e,
    })?;
    read_rows(reader, &label, num_psi)
}

/// Same as [`read_clustering_csv`] for an in-memory or already opened source.
pub fn read_clustering_from<R: Read>(
    source: R,
    label: &str,
    num_psi: u32,
) -> Result<PdRecordStore, ImportError> {
    read_rows(csv::Reader::from_reader(source), label, num_psi)
}

fn read_rows<R: Read>(
    mut reader: csv::Reader<R>,
    label: &str,
    num_psi: u32,
) -> Result<PdRecordStore, ImportError> {
    let mut builder = PdRecordStoreBuilder::new(num_psi);
    for (row, result) in reader.deserialize::<ClusteringRow>().enumerate() {
        let record = result.map_err(|e| ImportError::Csv {
            path: label.to_string(),
            source: e,
        })?;
        for (field, value) in [("phi", record.phi), ("theta", record.theta)] {
            if !value.is_finite() {
                return Err(ImportError::NonFiniteAngle {
                    path: label.to_string(),
                    row: row + 1,
                    field,
                });
            }
        }
        builder.add_pd(PdGeometry {
            phi: record.phi,
            theta: record.theta,
            occupancy: record.occupancy,
            cluster_id: record.cluster_id,
        });
    }

    if builder.is_empty() {
        return Err(ImportError::Empty {
            path: label.to_string(),
        });
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn read_clustering_csv_builds_store_in_row_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clusters.csv");
        fs::write(
            &path,
            "phi,theta,occupancy,cluster_id\n10.5,20.0,150,0\n-30.0,45.25,90,1\n",
        )
        .unwrap();

        let store = read_clustering_csv(&path, 8).unwrap();

        assert_eq!(store.n_thresholded(), 2);
        assert_eq!(store.phi_thresholded(), &[10.5, -30.0]);
        assert_eq!(store.theta_thresholded(), &[20.0, 45.25]);
        assert_eq!(store.occupancy(), &[150, 90]);
        assert_eq!(store.cluster_ids(), &[0, 1]);
        assert!(store.anchors().is_empty());
        assert!(store.trash_ids().is_empty());
    }

    #[test]
    fn read_clustering_csv_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = read_clustering_csv(&dir.path().join("absent.csv"), 8);
        assert!(matches!(result, Err(ImportError::Csv { .. })));
    }

    #[test]
    fn malformed_row_is_reported() {
        let data = "phi,theta,occupancy,cluster_id\n1.0,2.0,-4,0\n";
        let result = read_clustering_from(data.as_bytes(), "inline", 8);
        assert!(matches!(result, Err(ImportError::Csv { .. })));
    }

    #[test]
    fn header_only_table_is_rejected() {
        let data = "phi,theta,occupancy,cluster_id\n";
        let result = read_clustering_from(data.as_bytes(), "inline", 8);
        assert!(matches!(result, Err(ImportError::Empty { .. })));
    }

    #[test]
    fn non_finite_angle_is_rejected() {
        let data = "phi,theta,occupancy,cluster_id\n1.0,2.0,4,0\nNaN,2.0,4,0\n";
        let result = read_clustering_from(data.as_bytes(), "inline", 8);
        assert!(matches!(
            result,
            Err(ImportError::NonFiniteAngle {
                row: 2,
                field: "phi",
                ..
            })
        ));
    }

    #[test]
    fn zero_num_psi_is_rejected() {
        let data = "phi,theta,occupancy,cluster_id\n1.0,2.0,4,0\n";
        let result = read_clustering_from(data.as_bytes(), "inline", 0);
        assert!(matches!(
            result,
            Err(ImportError::Model(ModelError::ZeroNumPsi))
        ));
    }
}
