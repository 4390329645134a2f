//! Parcel use-case service.
//!
//! # Responsibility
//! - Provide register/track/advance/correct/remove entry points for callers.
//! - Delegate every storage effect to the repository contract.
//!
//! # Invariants
//! - The service composes repository operations; it never issues SQL of its
//!   own, so every gating rule stays enforced at the storage boundary.
//! - Status progression follows `registered -> sent -> delivered` and stops
//!   there.

use crate::model::parcel::{
    ClientId, NewParcel, Parcel, ParcelNumber, STATUS_DELIVERED, STATUS_REGISTERED, STATUS_SENT,
};
use crate::repo::parcel_repo::{ParcelRepository, RepoError, RepoResult};
use chrono::{SecondsFormat, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for parcel use-cases.
#[derive(Debug)]
pub enum ParcelServiceError {
    /// Progression was requested for a status outside the known chain.
    UnknownStatus {
        number: ParcelNumber,
        status: String,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ParcelServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStatus { number, status } => write!(
                f,
                "parcel {number} has unknown status `{status}`; cannot advance"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ParcelServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::UnknownStatus { .. } => None,
        }
    }
}

impl From<RepoError> for ParcelServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case facade over a parcel repository implementation.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client` and returns the stored record.
    ///
    /// # Contract
    /// - Status starts as `registered`.
    /// - `created_at` is stamped with the current UTC time in RFC3339.
    pub fn register(
        &self,
        client: ClientId,
        address: impl Into<String>,
    ) -> Result<Parcel, ParcelServiceError> {
        let draft = NewParcel::registered(
            client,
            address,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        let number = self.repo.add(&draft)?;
        Ok(self.repo.get(number)?)
    }

    /// Moves the parcel one step along `registered -> sent -> delivered`
    /// and returns the stored record after the step.
    ///
    /// `delivered` is the end of the chain; advancing a delivered parcel is
    /// a no-op success. A status outside the chain fails with
    /// [`ParcelServiceError::UnknownStatus`] rather than guessing.
    ///
    /// The read and the write are separate statements: the progression is a
    /// convenience over the unconditional `set_status`, not a gated
    /// mutation, so it carries no atomicity promise.
    pub fn advance_status(&self, number: ParcelNumber) -> Result<Parcel, ParcelServiceError> {
        let parcel = self.repo.get(number)?;
        match next_status(&parcel.status) {
            Some(next) => {
                self.repo.set_status(number, next)?;
                Ok(self.repo.get(number)?)
            }
            None if parcel.status == STATUS_DELIVERED => Ok(parcel),
            None => Err(ParcelServiceError::UnknownStatus {
                number,
                status: parcel.status,
            }),
        }
    }

    /// Changes the delivery address; storage permits it only while the
    /// parcel is still `registered`.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        self.repo.set_address(number, address)
    }

    /// Deletes the parcel; storage permits it only while still `registered`.
    pub fn remove(&self, number: ParcelNumber) -> RepoResult<()> {
        self.repo.delete(number)
    }

    /// Gets one parcel by number.
    pub fn parcel(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.repo.get(number)
    }

    /// Lists all parcels owned by `client`, in storage order.
    pub fn parcels_for_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        self.repo.get_by_client(client)
    }
}

/// Returns the successor in the `registered -> sent -> delivered` chain.
///
/// `delivered` ends the chain; statuses outside it yield `None` because the
/// chain says nothing about them.
pub fn next_status(current: &str) -> Option<&'static str> {
    match current {
        STATUS_REGISTERED => Some(STATUS_SENT),
        STATUS_SENT => Some(STATUS_DELIVERED),
        _ => None,
    }
}
