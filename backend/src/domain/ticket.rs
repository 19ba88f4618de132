//! Ticket data model: identifiers, service types, numbering and status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::teller::TellerId;

/// Tickets are only honoured for this long after issue.
pub const TICKET_VALIDITY: TimeDelta = TimeDelta::hours(24);

/// Validation errors for ticket inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketValidationError {
    /// No ticket type code was supplied.
    EmptyTicketType,
    /// The code is not one of `W`, `D`, `T`, `I` or `O`.
    UnknownTicketType { code: String },
    /// No ticket number was supplied.
    EmptyTicketNumber,
    /// The ticket identifier is not a UUID.
    InvalidTicketId,
    /// The list filter is neither `pending` nor `served`.
    UnknownStatusFilter { value: String },
    /// The list date is not `YYYY-MM-DD`.
    InvalidDate { value: String },
}

impl fmt::Display for TicketValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTicketType => write!(f, "ticket_type is required"),
            Self::UnknownTicketType { code } => write!(
                f,
                "Invalid ticket type '{code}'. Use one of W, D, T, I, O"
            ),
            Self::EmptyTicketNumber => write!(f, "ticket_number is required"),
            Self::InvalidTicketId => write!(f, "ticket id must be a valid UUID"),
            Self::UnknownStatusFilter { value } => write!(
                f,
                "Invalid status filter '{value}'. Use 'pending' or 'served'"
            ),
            Self::InvalidDate { .. } => write!(f, "Invalid date format. Use YYYY-MM-DD"),
        }
    }
}

impl std::error::Error for TicketValidationError {}

/// Stable ticket identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Parse a ticket identifier from its textual form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TicketValidationError> {
        Uuid::parse_str(raw.as_ref().trim())
            .map(Self)
            .map_err(|_| TicketValidationError::InvalidTicketId)
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

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Service requested by the customer holding the ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketType {
    /// Cash withdrawal (`W`).
    Withdrawal,
    /// Cash or cheque deposit (`D`).
    Deposit,
    /// Transfer between accounts (`T`).
    Transfer,
    /// Account or product inquiry (`I`).
    Inquiry,
    /// Anything else (`O`).
    Other,
}

impl TicketType {
    /// Every supported ticket type, in display order.
    pub const ALL: [Self; 5] = [
        Self::Withdrawal,
        Self::Deposit,
        Self::Transfer,
        Self::Inquiry,
        Self::Other,
    ];

    /// Single-letter code embedded in ticket numbers.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Withdrawal => "W",
            Self::Deposit => "D",
            Self::Transfer => "T",
            Self::Inquiry => "I",
            Self::Other => "O",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Withdrawal => "Withdrawal",
            Self::Deposit => "Deposit",
            Self::Transfer => "Transfer",
            Self::Inquiry => "Inquiry",
            Self::Other => "Other",
        }
    }
}

impl FromStr for TicketType {
    type Err = TicketValidationError;

    /// Codes are matched case-insensitively after trimming whitespace.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TicketValidationError::EmptyTicketType);
        }
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TicketValidationError::UnknownTicketType {
                code: trimmed.to_owned(),
            })
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human-facing ticket number such as `20250411-W-003`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketNumber(String);

impl TicketNumber {
    /// Wrap a ticket number supplied by a client for lookup.
    pub fn new(raw: impl Into<String>) -> Result<Self, TicketValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TicketValidationError::EmptyTicketNumber);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Compose the number for the `sequence`-th ticket issued on `day`.
    ///
    /// # Examples
    /// ```
    /// use bqms::domain::{TicketNumber, TicketType};
    /// use chrono::NaiveDate;
    ///
    /// let day = NaiveDate::from_ymd_opt(2025, 4, 11).expect("valid date");
    /// let number = TicketNumber::issue(day, TicketType::Withdrawal, 3);
    /// assert_eq!(number.as_str(), "20250411-W-003");
    /// ```
    #[must_use]
    pub fn issue(day: NaiveDate, ticket_type: TicketType, sequence: u32) -> Self {
        Self(format!(
            "{}-{}-{sequence:03}",
            day.format("%Y%m%d"),
            ticket_type.code()
        ))
    }

    /// Borrow the textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TicketNumber> for String {
    fn from(value: TicketNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for TicketNumber {
    type Error = TicketValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lifecycle position of a ticket, ignoring cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStage {
    /// Issued and waiting for a teller.
    Created,
    /// At a teller's counter.
    Served,
    /// Service finished; the teller has moved on.
    Completed,
}

/// Coarse status exposed to clients and used for list filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    /// Not yet called to a counter.
    Pending,
    /// Called to a counter, whether or not service has finished.
    Served,
}

impl TicketStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Served => "served",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = TicketValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "served" => Ok(Self::Served),
            _ => Err(TicketValidationError::UnknownStatusFilter {
                value: raw.to_owned(),
            }),
        }
    }
}

/// A queue ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: TicketId,
    pub ticket_number: TicketNumber,
    pub ticket_type: TicketType,
    pub created_at: DateTime<Utc>,
    pub is_served: bool,
    pub served_at: Option<DateTime<Utc>>,
    pub teller_id: Option<TellerId>,
    pub is_canceled: bool,
    pub completed: bool,
}

impl Ticket {
    /// Build a freshly issued ticket awaiting service.
    #[must_use]
    pub const fn issue(
        id: TicketId,
        ticket_number: TicketNumber,
        ticket_type: TicketType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            ticket_number,
            ticket_type,
            created_at,
            is_served: false,
            served_at: None,
            teller_id: None,
            is_canceled: false,
            completed: false,
        }
    }

    /// Current lifecycle stage.
    #[must_use]
    pub const fn stage(&self) -> TicketStage {
        if self.completed {
            TicketStage::Completed
        } else if self.is_served {
            TicketStage::Served
        } else {
            TicketStage::Created
        }
    }

    /// Status as reported to clients.
    #[must_use]
    pub const fn status(&self) -> TicketStatus {
        if self.is_served {
            TicketStatus::Served
        } else {
            TicketStatus::Pending
        }
    }

    /// Whether the ticket is older than [`TICKET_VALIDITY`] at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.created_at) > TICKET_VALIDITY
    }
}

/// Parameters for listing tickets of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TicketListRequest {
    /// UTC calendar day; `None` means today.
    pub date: Option<NaiveDate>,
    /// Optional served/pending filter.
    pub status: Option<TicketStatus>,
}

impl TicketListRequest {
    /// Parse raw query parameters.
    pub fn parse(date: Option<&str>, status: Option<&str>) -> Result<Self, TicketValidationError> {
        let date = date
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                    TicketValidationError::InvalidDate {
                        value: value.to_owned(),
                    }
                })
            })
            .transpose()?;
        let status = status
            .filter(|value| !value.trim().is_empty())
            .map(TicketStatus::from_str)
            .transpose()?;
        Ok(Self { date, status })
    }
}

/// Creation-time window covering a single UTC day, with an optional filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketWindow {
    pub day: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: Option<TicketStatus>,
}

impl TicketWindow {
    /// Window spanning `[day 00:00, day+1 00:00)` in UTC.
    #[must_use]
    pub fn for_day(day: NaiveDate, status: Option<TicketStatus>) -> Self {
        let start = day.and_time(NaiveTime::MIN).and_utc();
        let end = day
            .checked_add_days(Days::new(1))
            .map_or(DateTime::<Utc>::MAX_UTC, |next| next.and_time(NaiveTime::MIN).and_utc());
        Self {
            day,
            start,
            end,
            status,
        }
    }

    /// Whether `ticket` falls inside the window and matches the filter.
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        let in_day = ticket.created_at >= self.start && ticket.created_at < self.end;
        in_day && self.status.is_none_or(|status| ticket.status() == status)
    }
}
