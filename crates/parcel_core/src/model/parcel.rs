//! Parcel domain model.
//!
//! # Responsibility
//! - Define the single persisted record tracked by the core.
//! - Provide lifecycle helpers around the `registered` gate.
//!
//! # Invariants
//! - `number` is assigned by the store and never reused for another parcel.
//! - `client` and `created_at` are fixed at creation.
//! - `address` may change only while `status == Registered`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Owning client reference. Not validated against any client table.
pub type ClientId = i64;

/// Store-assigned parcel identifier.
///
/// `ParcelNumber::UNASSIGNED` marks a parcel that has not been inserted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelNumber(pub i64);

impl ParcelNumber {
    pub const UNASSIGNED: Self = Self(0);

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for ParcelNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parcel lifecycle state, stored as plain text.
///
/// Unknown values round-trip through `Other` so rows written by other
/// tools are never rejected on read. Equality and hashing follow the stored
/// text, so `Other("sent")` equals `Sent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParcelStatus {
    /// Initial state. The only state that allows address changes and deletion.
    Registered,
    /// Handed over for delivery.
    Sent,
    /// Delivered to the client.
    Delivered,
    /// Any status text not known to this crate.
    Other(String),
}

impl ParcelStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Next state in the `registered -> sent -> delivered` chain.
    ///
    /// Returns `None` for `Delivered` and unknown statuses.
    pub fn next(&self) -> Option<Self> {
        match self.as_str() {
            "registered" => Some(Self::Sent),
            "sent" => Some(Self::Delivered),
            _ => None,
        }
    }
}

impl PartialEq for ParcelStatus {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for ParcelStatus {}

impl Hash for ParcelStatus {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<&str> for ParcelStatus {
    fn from(value: &str) -> Self {
        match value {
            "registered" => Self::Registered,
            "sent" => Self::Sent,
            "delivered" => Self::Delivered,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ParcelStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "registered" | "sent" | "delivered" => Self::from(value.as_str()),
            _ => Self::Other(value),
        }
    }
}

impl From<ParcelStatus> for String {
    fn from(value: ParcelStatus) -> Self {
        match value {
            ParcelStatus::Other(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for ParcelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for parcel write paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParcelValidationError {
    #[error("parcel address must not be empty")]
    EmptyAddress,
    #[error("parcel status must not be empty")]
    EmptyStatus,
    #[error("parcel created_at `{0}` is not an RFC3339 timestamp")]
    InvalidCreatedAt(String),
}

/// A shipment record as stored in the `parcel` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Ignored on insert; filled from the store afterwards.
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: ParcelStatus,
    /// Delivery address.
    pub address: String,
    /// RFC3339 text, e.g. `2024-01-02T03:04:05Z`.
    pub created_at: String,
}

impl Parcel {
    /// Creates an unsaved `registered` parcel stamped with the current UTC time.
    pub fn new(client: ClientId, address: impl Into<String>) -> Self {
        Self {
            number: ParcelNumber::UNASSIGNED,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: now_rfc3339(),
        }
    }

    pub fn is_registered(&self) -> bool {
        self.status == ParcelStatus::Registered
    }

    /// Checks field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ParcelValidationError> {
        if self.address.trim().is_empty() {
            return Err(ParcelValidationError::EmptyAddress);
        }
        if self.status.as_str().is_empty() {
            return Err(ParcelValidationError::EmptyStatus);
        }
        if DateTime::parse_from_rfc3339(&self.created_at).is_err() {
            return Err(ParcelValidationError::InvalidCreatedAt(
                self.created_at.clone(),
            ));
        }
        Ok(())
    }
}

/// Current UTC time as RFC3339 with second precision (`...T..:..:..Z`).
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::{Parcel, ParcelNumber, ParcelStatus, ParcelValidationError};

    #[test]
    fn new_parcel_starts_registered_and_unassigned() {
        let parcel = Parcel::new(1000, "test");
        assert_eq!(parcel.number, ParcelNumber::UNASSIGNED);
        assert_eq!(parcel.status, ParcelStatus::Registered);
        assert!(parcel.is_registered());
        assert!(parcel.created_at.ends_with('Z'));
        assert!(parcel.validate().is_ok());
    }

    #[test]
    fn status_text_roundtrips_known_and_unknown_values() {
        assert_eq!(ParcelStatus::from("sent"), ParcelStatus::Sent);
        assert_eq!(
            ParcelStatus::from("new test status".to_string()),
            ParcelStatus::Other("new test status".to_string())
        );
        assert_eq!(String::from(ParcelStatus::Delivered), "delivered");
        assert_eq!(ParcelStatus::Other("lost".into()).as_str(), "lost");
    }

    #[test]
    fn status_chain_stops_at_delivered() {
        assert_eq!(ParcelStatus::Registered.next(), Some(ParcelStatus::Sent));
        assert_eq!(ParcelStatus::Sent.next(), Some(ParcelStatus::Delivered));
        assert_eq!(ParcelStatus::Delivered.next(), None);
        assert_eq!(ParcelStatus::Other("lost".into()).next(), None);
    }

    #[test]
    fn other_holding_known_text_behaves_like_known_status() {
        let spelled_out = ParcelStatus::Other("registered".to_string());
        assert_eq!(spelled_out, ParcelStatus::Registered);

        let mut parcel = Parcel::new(1, "test");
        parcel.status = spelled_out;
        assert!(parcel.is_registered());
        assert_eq!(parcel.status.next(), Some(ParcelStatus::Sent));

        let statuses: std::collections::HashSet<_> =
            [ParcelStatus::Sent, ParcelStatus::Other("sent".into())]
                .into_iter()
                .collect();
        assert_eq!(statuses.len(), 1);
    }

    #[test]
    fn validate_rejects_blank_address_and_bad_timestamp() {
        let mut parcel = Parcel::new(1, "   ");
        assert_eq!(parcel.validate(), Err(ParcelValidationError::EmptyAddress));

        parcel.address = "Main st. 1".to_string();
        parcel.created_at = "yesterday".to_string();
        assert!(matches!(
            parcel.validate(),
            Err(ParcelValidationError::InvalidCreatedAt(value)) if value == "yesterday"
        ));

        parcel.created_at = "2024-01-02T03:04:05+03:00".to_string();
        parcel.status = ParcelStatus::Other(String::new());
        assert_eq!(parcel.validate(), Err(ParcelValidationError::EmptyStatus));
    }

    #[test]
    fn serializes_as_flat_row_shape() {
        let parcel = Parcel {
            number: ParcelNumber(5),
            client: 1000,
            status: ParcelStatus::Sent,
            address: "test".to_string(),
            created_at: "2024-01-02T03:04:05Z".to_string(),
        };

        let json = serde_json::to_value(&parcel).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "number": 5,
                "client": 1000,
                "status": "sent",
                "address": "test",
                "created_at": "2024-01-02T03:04:05Z",
            })
        );
        let back: Parcel = serde_json::from_value(json).unwrap();
        assert_eq!(back, parcel);
    }
}
