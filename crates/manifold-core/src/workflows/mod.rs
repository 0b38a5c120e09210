//! # Workflows Module
//!
//! High-level entry points that tie the engine and core together into complete
//! steps of the anchor-selection stage.
//!
//! - **Initialize Workflow** ([`initialize`]) - Builds and persists a new record store
//!   from the clustering stage's output.
//! - **Finalize Workflow** ([`finalize`]) - Runs the finalize gate and, once it clears,
//!   persists store and parameters for belief propagation.

pub mod finalize;
pub mod initialize;
