//! Data model of the projection-direction record store.
//!
//! - [`anchor`] - The `Sense` and `Anchor` value types describing a confirmed conformational coordinate.
//! - [`record`] - Per-PD geometry and read-only row snapshots.
//! - [`store`] - The `PdRecordStore` table and its builder, owning the trash/anchor invariants.
//! - [`error`] - Synchronous argument and invariant rejections.

pub mod anchor;
pub mod error;
pub mod record;
pub mod store;
