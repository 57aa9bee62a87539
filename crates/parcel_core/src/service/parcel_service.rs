//! Parcel use-case service.
//!
//! # Responsibility
//! - Provide registration and lifecycle entry points for core callers.
//! - Translate gated zero-row mutations into explicit rejection errors.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Status only moves forward along `registered -> sent -> delivered`.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, RepoError};
use log::info;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for parcel use-cases.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("parcel not found: {0}")]
    ParcelNotFound(ParcelNumber),
    /// The parcel exists but has left the `registered` state.
    #[error("parcel {0} is no longer registered")]
    NotRegistered(ParcelNumber),
    #[error("{0}")]
    Repo(#[source] RepoError),
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(number) => Self::ParcelNotFound(number),
            other => Self::Repo(other),
        }
    }
}

/// Parcel service facade over repository implementations.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client` and returns the stored record.
    pub fn register(
        &self,
        client: ClientId,
        address: impl Into<String>,
    ) -> ServiceResult<Parcel> {
        let parcel = Parcel::new(client, address);
        let number = self.repo.add(&parcel)?;
        info!(
            "event=parcel_register module=service status=ok number={} client={}",
            number, client
        );
        Ok(self.repo.get(number)?)
    }

    /// Lists every parcel owned by `client`.
    pub fn client_parcels(&self, client: ClientId) -> ServiceResult<Vec<Parcel>> {
        Ok(self.repo.get_by_client(client)?)
    }

    /// Advances the parcel one step along its lifecycle.
    ///
    /// `delivered` and unknown statuses are terminal: the status is returned unchanged.
    pub fn next_status(&self, number: ParcelNumber) -> ServiceResult<ParcelStatus> {
        let parcel = self.repo.get(number)?;
        let Some(next) = parcel.status.next() else {
            return Ok(parcel.status);
        };

        if !self.repo.set_status(number, &next)? {
            return Err(ServiceError::ParcelNotFound(number));
        }
        info!(
            "event=parcel_status module=service status=ok number={} from={} to={}",
            number, parcel.status, next
        );
        Ok(next)
    }

    /// Changes the delivery address of a still-registered parcel.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> ServiceResult<()> {
        if self.repo.set_address(number, address)? {
            return Ok(());
        }
        Err(self.rejection(number))
    }

    /// Deletes a still-registered parcel.
    pub fn cancel(&self, number: ParcelNumber) -> ServiceResult<()> {
        if self.repo.delete(number)? {
            info!("event=parcel_cancel module=service status=ok number={number}");
            return Ok(());
        }
        Err(self.rejection(number))
    }

    /// Explains why a gated mutation affected no rows.
    fn rejection(&self, number: ParcelNumber) -> ServiceError {
        match self.repo.get(number) {
            Ok(_) => ServiceError::NotRegistered(number),
            Err(err) => err.into(),
        }
    }
}
