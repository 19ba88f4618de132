//! Teller data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Names seeded into an empty teller table at startup.
pub const DEFAULT_TELLER_NAMES: [&str; 6] = [
    "Teller A", "Teller B", "Teller C", "Teller D", "Teller E", "Teller F",
];

/// Validation errors for teller identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TellerValidationError {
    #[error("teller_id is required")]
    EmptyId,
    #[error("teller_id must be a valid UUID")]
    InvalidId,
}

/// Stable teller identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TellerId(Uuid);

impl TellerId {
    /// Parse a teller identifier from its textual form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TellerValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TellerValidationError::EmptyId);
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| TellerValidationError::InvalidId)
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TellerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A branch teller. `is_active` means the teller is currently busy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teller {
    pub id: TellerId,
    pub name: String,
    pub is_active: bool,
    /// When the teller last picked up a ticket; drives fair selection.
    pub last_assigned_at: Option<DateTime<Utc>>,
}

impl Teller {
    /// Build an idle teller.
    #[must_use]
    pub fn idle(id: TellerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_active: false,
            last_assigned_at: None,
        }
    }

    /// Whether the teller can take a new ticket.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !self.is_active
    }
}
