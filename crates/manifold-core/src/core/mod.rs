//! # Core Module
//!
//! Stateless building blocks of the anchor-selection step: the projection-direction
//! record store and its value types, the cluster coverage query, and the file formats
//! the store is persisted in or built from.
//!
//! - **Data Model** ([`models`]) - `Sense`, `Anchor`, `PdRecordStore` and its invariants
//! - **Coverage** ([`coverage`]) - Which connected components of PDs hold an anchor
//! - **File I/O** ([`io`]) - Atomic TOML persistence and clustering CSV import

pub mod coverage;
pub mod io;
pub mod models;
