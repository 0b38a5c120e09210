//! # Engine Module
//!
//! The stateful layer of the anchor-selection step. It owns the analysis
//! parameters and the active record store for the lifetime of a session, applies
//! user edits, validates the store through the finalize gate, and persists it.
//!
//! - **Configuration** ([`config`]) - Analysis parameters, derived file locations and gate policy
//! - **Session** ([`session`]) - Explicit context replacing any process-wide store instance
//! - **Finalize Gate** ([`gate`]) - `Editing -> Validating -> {Blocked, WarnConfirm, Ready}`
//! - **Topos** ([`topos`]) - Availability of the embedding stage's per-PD images
//! - **Progress Monitoring** ([`progress`]) - Events around the blocking load/save phases
//! - **Error Handling** ([`error`]) - Engine-level error taxonomy

pub mod config;
pub mod error;
pub mod gate;
pub mod progress;
pub mod session;
pub mod topos;
