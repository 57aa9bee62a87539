//! Domain model for parcel tracking.
//!
//! # Responsibility
//! - Define the canonical parcel record and its status vocabulary.
//!
//! # Invariants
//! - Every persisted parcel is identified by a store-assigned `ParcelNumber`.
//! - Deletion is a hard delete, permitted only for `registered` parcels.

pub mod parcel;
