use crate::core::io::traits::RecordFile;
use crate::core::models::anchor::{Anchor, Sense};
use crate::core::models::error::ModelError;
use crate::core::models::store::PdRecordStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Version written into every PD data file.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PrdsFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to encode PD data: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("Malformed PD data file: {0}")]
    Decode(#[from] toml::de::Error),
    #[error("Unsupported PD data format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("Declared n_thresholded = {declared} but '{field}' has {found} entries")]
    Cardinality {
        declared: usize,
        field: &'static str,
        found: usize,
    },
    #[error("PD {0} carries more than one anchor")]
    DuplicateAnchor(usize),
    #[error("Inconsistent PD data: {0}")]
    Inconsistent(#[from] ModelError),
}

impl PrdsFileError {
    /// Whether the error describes file content rather than a storage failure.
    pub fn is_corrupt_data(&self) -> bool {
        !matches!(self, PrdsFileError::Io(_) | PrdsFileError::Encode(_))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnchor {
    pd_index: usize,
    cc_index: u32,
    sense: Sense,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPrdsFile {
    format_version: u32,
    n_thresholded: usize,
    num_psi: u32,
    phi_thresholded: Vec<f64>,
    theta_thresholded: Vec<f64>,
    occupancy: Vec<u64>,
    cluster_ids: Vec<u32>,
    #[serde(default)]
    trash_ids: Vec<usize>,
    #[serde(default)]
    anchors: Vec<RawAnchor>,
}

impl From<&PdRecordStore> for RawPrdsFile {
    fn from(store: &PdRecordStore) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            n_thresholded: store.n_thresholded(),
            num_psi: store.num_psi(),
            phi_thresholded: store.phi_thresholded().to_vec(),
            theta_thresholded: store.theta_thresholded().to_vec(),
            occupancy: store.occupancy().to_vec(),
            cluster_ids: store.cluster_ids().to_vec(),
            trash_ids: store.trash_ids().iter().copied().collect(),
            anchors: store
                .anchors()
                .iter()
                .map(|(&pd_index, anchor)| RawAnchor {
                    pd_index,
                    cc_index: anchor.cc_index,
                    sense: anchor.sense,
                })
                .collect(),
        }
    }
}

impl TryFrom<RawPrdsFile> for PdRecordStore {
    type Error = PrdsFileError;

    fn try_from(raw: RawPrdsFile) -> Result<Self, Self::Error> {
        if raw.format_version != FORMAT_VERSION {
            return Err(PrdsFileError::Version {
                found: raw.format_version,
                expected: FORMAT_VERSION,
            });
        }

        let declared = raw.n_thresholded;
        let columns = [
            ("phi_thresholded", raw.phi_thresholded.len()),
            ("theta_thresholded", raw.theta_thresholded.len()),
            ("occupancy", raw.occupancy.len()),
            ("cluster_ids", raw.cluster_ids.len()),
        ];
        for (field, found) in columns {
            if found != declared {
                return Err(PrdsFileError::Cardinality {
                    declared,
                    field,
                    found,
                });
            }
        }

        let trash_ids: BTreeSet<usize> = raw.trash_ids.into_iter().collect();

        let mut anchors = BTreeMap::new();
        for entry in raw.anchors {
            let anchor = Anchor::new(entry.cc_index, entry.sense)?;
            if anchors.insert(entry.pd_index, anchor).is_some() {
                return Err(PrdsFileError::DuplicateAnchor(entry.pd_index));
            }
        }

        Ok(PdRecordStore::from_parts(
            raw.num_psi,
            raw.phi_thresholded,
            raw.theta_thresholded,
            raw.occupancy,
            raw.cluster_ids,
            trash_ids,
            anchors,
        )?)
    }
}

/// TOML encoding of the PD record store.
///
/// ```toml
/// format_version = 1
/// n_thresholded = 3
/// num_psi = 8
/// phi_thresholded = [0.0, 12.5, 80.0]
/// theta_thresholded = [0.0, 3.0, 45.0]
/// occupancy = [120, 98, 311]
/// cluster_ids = [0, 0, 1]
/// trash_ids = [1]
///
/// [[anchors]]
/// pd_index = 0
/// cc_index = 2
/// sense = "rev"
/// ```
pub struct PrdsFile;

impl RecordFile for PrdsFile {
    type Record = PdRecordStore;
    type Error = PrdsFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Record, Self::Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let raw: RawPrdsFile = toml::from_str(&content)?;
        PdRecordStore::try_from(raw)
    }

    fn write_to(record: &Self::Record, writer: &mut impl Write) -> Result<(), Self::Error> {
        let encoded = toml::to_string(&RawPrdsFile::from(record))?;
        writer.write_all(encoded.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::record::PdGeometry;
    use crate::core::models::store::PdRecordStoreBuilder;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn sample_store() -> PdRecordStore {
        let mut builder = PdRecordStoreBuilder::new(8);
        let rows = [
            (0.0, 0.0, 120, 0),
            (12.345678901234567, -3.25, 98, 0),
            (179.99999999999997, 89.5, 311, 1),
            (-45.1, 1e-12, 0, 2),
        ];
        for (phi, theta, occupancy, cluster_id) in rows {
            builder.add_pd(PdGeometry {
                phi,
                theta,
                occupancy,
                cluster_id,
            });
        }
        let mut store = builder.build().unwrap();
        store
            .insert_anchor(0, Anchor::new(2, Sense::Reverse).unwrap())
            .unwrap();
        store
            .insert_anchor(2, Anchor::new(8, Sense::Forward).unwrap())
            .unwrap();
        store.set_trash(3, true).unwrap();
        store
    }

    fn encode(store: &PdRecordStore) -> String {
        let mut buffer = Vec::new();
        PrdsFile::write_to(store, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn decode(content: &str) -> Result<PdRecordStore, PrdsFileError> {
        PrdsFile::read_from(&mut Cursor::new(content.as_bytes()))
    }

    #[test]
    fn save_then_load_yields_an_equal_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pd_data.toml");
        let store = sample_store();

        PrdsFile::write_to_path(&store, &path).unwrap();
        let loaded = PrdsFile::read_from_path(&path).unwrap();

        assert_eq!(loaded, store);
        for (a, b) in loaded.phi_thresholded().iter().zip(store.phi_thresholded()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn written_file_lists_sparse_anchors_and_sorted_trash() {
        let content = encode(&sample_store());
        assert!(content.contains("format_version = 1"));
        assert!(content.contains("trash_ids = [3]"));
        assert!(content.contains("[[anchors]]"));
        assert!(content.contains("sense = \"rev\""));
    }

    #[test]
    fn atomic_write_replaces_existing_file_and_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pd_data.toml");
        fs::write(&path, "stale").unwrap();

        PrdsFile::write_to_path(&sample_store(), &path).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(fs::read_to_string(&path).unwrap().contains("n_thresholded = 4"));
    }

    /// Encodes like [`PrdsFile`] but fails after emitting half of the document.
    struct TruncatingFile;

    impl RecordFile for TruncatingFile {
        type Record = PdRecordStore;
        type Error = PrdsFileError;

        fn read_from(reader: &mut impl BufRead) -> Result<Self::Record, Self::Error> {
            PrdsFile::read_from(reader)
        }

        fn write_to(record: &Self::Record, writer: &mut impl Write) -> Result<(), Self::Error> {
            let encoded = toml::to_string(&RawPrdsFile::from(record))?;
            writer.write_all(&encoded.as_bytes()[..encoded.len() / 2])?;
            Err(PrdsFileError::Io(io::Error::other("device full")))
        }
    }

    #[test]
    fn failed_write_keeps_previous_file_byte_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pd_data.toml");
        PrdsFile::write_to_path(&sample_store(), &path).unwrap();
        let before = fs::read(&path).unwrap();

        let mut edited = sample_store();
        edited.set_trash(0, true).unwrap();
        let result = TruncatingFile::write_to_path(&edited, &path);

        assert!(matches!(result, Err(PrdsFileError::Io(_))));
        assert_eq!(fs::read(&path).unwrap(), before);
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("pd_data.toml")]);
        assert_eq!(PrdsFile::read_from_path(&path).unwrap(), sample_store());
    }

    #[test]
    fn write_into_missing_directory_is_an_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-subdir").join("pd_data.toml");

        let result = PrdsFile::write_to_path(&sample_store(), &path);

        assert!(matches!(result, Err(PrdsFileError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn load_rejects_cardinality_mismatch() {
        let content = encode(&sample_store()).replace("n_thresholded = 4", "n_thresholded = 5");
        let err = decode(&content).unwrap_err();
        assert!(matches!(
            err,
            PrdsFileError::Cardinality {
                declared: 5,
                field: "phi_thresholded",
                found: 4
            }
        ));
        assert!(err.is_corrupt_data());
    }

    #[test]
    fn load_rejects_anchor_out_of_range() {
        let content = encode(&sample_store()).replace("pd_index = 2", "pd_index = 40");
        assert!(matches!(
            decode(&content),
            Err(PrdsFileError::Inconsistent(
                ModelError::PdIndexOutOfRange { index: 40, len: 4 }
            ))
        ));
    }

    #[test]
    fn load_rejects_anchor_on_trashed_pd() {
        let content = encode(&sample_store()).replace("pd_index = 2", "pd_index = 3");
        assert!(matches!(
            decode(&content),
            Err(PrdsFileError::Inconsistent(ModelError::TrashedAnchor(3)))
        ));
    }

    #[test]
    fn load_rejects_duplicate_anchor() {
        let content = encode(&sample_store()).replace("pd_index = 2", "pd_index = 0");
        assert!(matches!(
            decode(&content),
            Err(PrdsFileError::DuplicateAnchor(0))
        ));
    }

    #[test]
    fn load_rejects_unknown_version_and_malformed_content() {
        let content = encode(&sample_store()).replace("format_version = 1", "format_version = 7");
        assert!(matches!(
            decode(&content),
            Err(PrdsFileError::Version {
                found: 7,
                expected: 1
            })
        ));
        assert!(matches!(
            decode("this is not toml"),
            Err(PrdsFileError::Decode(_))
        ));
    }
}
