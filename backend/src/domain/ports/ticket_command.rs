//! Driving port for ticket lifecycle mutations.
//!
//! Inbound adapters call this port to issue, cancel, serve and complete
//! tickets without knowing which store backs the queue.

use async_trait::async_trait;

use crate::domain::{Error, TellerId, Ticket, TicketId, TicketNumber, TicketType};

use super::Assignment;

/// Result of asking for an automatic assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoAssignResult {
    /// The ticket is now being served by the contained teller.
    Assigned(Assignment),
    /// No idle teller, unknown ticket, or ticket no longer waiting.
    NothingToDo,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketCommand: Send + Sync {
    /// Issue a new ticket of `ticket_type` for today.
    async fn create(&self, ticket_type: TicketType) -> Result<Ticket, Error>;

    /// Cancel the ticket with `ticket_number`.
    async fn cancel(&self, ticket_number: &TicketNumber) -> Result<Ticket, Error>;

    /// Assign `ticket_id` to `teller_id`.
    async fn serve(&self, ticket_id: &TicketId, teller_id: &TellerId)
    -> Result<Assignment, Error>;

    /// Finish service on `ticket_id` and free its teller.
    async fn complete(&self, ticket_id: &TicketId) -> Result<Assignment, Error>;

    /// Hand `ticket_id` to any idle teller.
    async fn auto_assign(&self, ticket_id: &TicketId) -> Result<AutoAssignResult, Error>;
}
