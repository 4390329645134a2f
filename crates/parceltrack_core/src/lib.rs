//! Core persistence logic for the parcel tracker.
//! This crate is the single source of truth for the registered-only
//! mutation rule.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::parcel::{
    ClientId, NewParcel, Parcel, ParcelNumber, STATUS_DELIVERED, STATUS_REGISTERED, STATUS_SENT,
};
pub use repo::parcel_repo::{ParcelRepository, RepoError, RepoResult, SqliteParcelRepository};
pub use service::parcel_service::{next_status, ParcelService, ParcelServiceError};

/// Cheap liveness probe for host integrations.
pub fn ping() -> &'static str {
    "pong"
}

/// Version of this crate as baked in at compile time.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
