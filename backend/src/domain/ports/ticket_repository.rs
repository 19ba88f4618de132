//! Port abstraction for ticket persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{Ticket, TicketId, TicketNumber, TicketWindow};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by ticket repository adapters.
    pub enum TicketRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "ticket repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ticket repository query failed: {message}",
        /// A ticket with the same number already exists.
        DuplicateNumber { ticket_number: String } => "ticket number {ticket_number} already exists",
    }
}

/// Read and insert access to stored tickets.
///
/// State transitions that also touch tellers go through
/// [`super::TicketAssignmentRepository`] so they run atomically.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Persist a newly issued ticket.
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError>;

    /// Fetch a ticket by identifier.
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError>;

    /// Fetch a ticket by its human-facing number.
    async fn find_by_number(
        &self,
        ticket_number: &TicketNumber,
    ) -> Result<Option<Ticket>, TicketRepositoryError>;

    /// List tickets created inside `window`, oldest first.
    async fn list_in_window(
        &self,
        window: &TicketWindow,
    ) -> Result<Vec<Ticket>, TicketRepositoryError>;
}
