//! Repository layer abstraction and SQLite implementation.
//!
//! # Responsibility
//! - Define the parcel data-access contract.
//! - Isolate SQL details from service/business orchestration.
//!
//! # Invariants
//! - Status-gated mutations check and mutate in a single SQL statement.
//! - Repository APIs return semantic errors (`NotFound`, lock failures) in
//!   addition to DB transport errors.

pub mod parcel_repo;
