//! Provides persistence for the record store and import of upstream clustering output.
//!
//! The [`traits::RecordFile`] interface gives every persisted format an atomic
//! write-to-path; [`prds_file`] implements it for the record store itself.

pub mod clustering;
pub mod prds_file;
pub mod traits;
