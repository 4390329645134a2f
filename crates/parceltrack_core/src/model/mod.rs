//! Domain model for tracked parcels.
//!
//! # Responsibility
//! - Define the canonical parcel record and its creation draft.
//! - Name the well-known status values used by gating and progression.
//!
//! # Invariants
//! - Every stored parcel is identified by a stable `ParcelNumber`.
//! - `registered` is the only status that leaves a parcel mutable.

pub mod parcel;
