//! Driving port for ticket reads.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Error, Ticket, TicketListRequest, TicketNumber};

/// A ticket with the display name of its teller, when assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDetails {
    pub ticket: Ticket,
    pub teller_name: Option<String>,
}

/// Tickets issued on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketListing {
    pub date: NaiveDate,
    pub tickets: Vec<TicketDetails>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketQuery: Send + Sync {
    /// Check that the ticket exists, has not expired, and is still waiting.
    async fn validate(&self, ticket_number: &TicketNumber) -> Result<Ticket, Error>;

    /// List tickets for a day, defaulting to today.
    async fn list(&self, request: &TicketListRequest) -> Result<TicketListing, Error>;
}
