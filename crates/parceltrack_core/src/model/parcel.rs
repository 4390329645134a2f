//! Parcel domain model.
//!
//! # Responsibility
//! - Define the stored parcel record and the draft used to create one.
//! - Provide status helpers consumed by gating and progression logic.
//!
//! # Invariants
//! - `number` is assigned by storage, unique, and never reused.
//! - `created_at` is written once at creation and never updated.
//! - A parcel whose status is anything but `registered` is locked for
//!   address changes and deletion.

use serde::{Deserialize, Serialize};

/// Store-assigned parcel identifier.
///
/// Kept as a type alias so signatures say which integer they mean.
pub type ParcelNumber = i64;

/// Identifier of the client owning a parcel. Opaque to this crate; no
/// foreign-key semantics are enforced beyond storage.
pub type ClientId = i64;

/// Initial status of every freshly registered parcel, and the only status
/// in which the address may still change and the parcel may be deleted.
pub const STATUS_REGISTERED: &str = "registered";

/// Conventional in-transit status.
pub const STATUS_SENT: &str = "sent";

/// Conventional final status.
pub const STATUS_DELIVERED: &str = "delivered";

/// Stored parcel record as read back from the `parcel` table.
///
/// `status` is deliberately a free string: the contract distinguishes only
/// `registered` from everything else, and rows written by other tools may
/// carry status values this crate has never heard of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Stable identifier assigned by storage on creation.
    pub number: ParcelNumber,
    /// Owning client.
    pub client: ClientId,
    /// Current lifecycle status.
    pub status: String,
    /// Free-form delivery destination.
    pub address: String,
    /// RFC3339 creation timestamp, set once.
    pub created_at: String,
}

impl Parcel {
    /// Returns whether this parcel still permits address changes and
    /// deletion.
    pub fn is_registered(&self) -> bool {
        self.status == STATUS_REGISTERED
    }
}

/// Draft for creating a parcel; `number` does not exist yet because storage
/// assigns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParcel {
    /// Owning client.
    pub client: ClientId,
    /// Initial lifecycle status, conventionally [`STATUS_REGISTERED`].
    pub status: String,
    /// Free-form delivery destination.
    pub address: String,
    /// RFC3339 creation timestamp supplied by the caller.
    pub created_at: String,
}

impl NewParcel {
    /// Creates a draft in the `registered` state.
    pub fn registered(
        client: ClientId,
        address: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            client,
            status: STATUS_REGISTERED.to_string(),
            address: address.into(),
            created_at: created_at.into(),
        }
    }
}
