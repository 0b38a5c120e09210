//! # ManifoldEM PD Record Store
//!
//! The data structure and invariant layer behind interactive anchor selection in
//! the ManifoldEM conformational-analysis pipeline. Particle images are grouped into
//! projection directions (PDs); for each PD a user may confirm which eigenvector
//! (conformational coordinate) and which sign convention to use, or remove the PD
//! from the reconstruction. Belief propagation later consumes these choices.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** The `PdRecordStore` table with its `Anchor` and
//!   `Sense` value types, the cluster coverage query, and the atomic file formats.
//!
//! - **[`engine`]: The Logic Core.** Analysis parameters, the explicit `Session`
//!   context owning the store, and the finalize gate state machine.
//!
//! - **[`workflows`]: The Public API.** Complete procedures built on the engine:
//!   starting a new analysis from clustering output and finalizing anchors for
//!   belief propagation.

pub mod core;
pub mod engine;
pub mod workflows;
