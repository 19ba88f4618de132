//! Transactional port for transitions that touch a ticket and a teller.
//!
//! Adapters lock the rows involved, delegate the guard checks to
//! [`crate::domain::ticket_transitions`], and persist the result in one
//! atomic unit. A rejected transition leaves storage unchanged.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ticket_transitions::TransitionError;
use crate::domain::{Teller, TellerId, TellerSelectionPolicy, Ticket, TicketId, TicketNumber};

use super::define_port_error;

define_port_error! {
    /// Errors raised while applying a ticket transition.
    pub enum AssignmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "assignment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "assignment repository query failed: {message}",
        /// The ticket does not exist.
        TicketNotFound { ticket: String } => "ticket {ticket} not found",
        /// The teller does not exist.
        TellerNotFound { teller: String } => "teller {teller} not found",
        /// The state machine refused the transition.
        Rejected { reason: TransitionError } => "{reason}",
    }
}

/// A ticket together with the teller it is assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub ticket: Ticket,
    pub teller: Teller,
}

/// Result of an auto-assignment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoAssignOutcome {
    /// The ticket was handed to an idle teller.
    Assigned(Assignment),
    /// No ticket has the requested identifier.
    TicketNotFound,
    /// The ticket is already served or canceled.
    TicketUnavailable,
    /// Every teller is busy.
    NoTellerAvailable,
}

/// Result of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOutcome {
    pub ticket: Ticket,
    /// The teller freed by this cancellation, if any.
    pub released_teller: Option<Teller>,
}

#[async_trait]
pub trait TicketAssignmentRepository: Send + Sync {
    /// Assign `ticket_id` to `teller_id`.
    async fn serve(
        &self,
        ticket_id: &TicketId,
        teller_id: &TellerId,
        served_at: DateTime<Utc>,
    ) -> Result<Assignment, AssignmentRepositoryError>;

    /// Assign `ticket_id` to an idle teller chosen by `policy`.
    async fn auto_assign(
        &self,
        ticket_id: &TicketId,
        served_at: DateTime<Utc>,
        policy: &dyn TellerSelectionPolicy,
    ) -> Result<AutoAssignOutcome, AssignmentRepositoryError>;

    /// Mark service on `ticket_id` complete and free its teller.
    async fn complete(&self, ticket_id: &TicketId) -> Result<Assignment, AssignmentRepositoryError>;

    /// Cancel the ticket with `ticket_number`, freeing its teller.
    async fn cancel(
        &self,
        ticket_number: &TicketNumber,
    ) -> Result<CancelOutcome, AssignmentRepositoryError>;
}
