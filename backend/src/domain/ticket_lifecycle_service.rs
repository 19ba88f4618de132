//! Ticket lifecycle engine.
//!
//! Implements the [`TicketCommand`] and [`TicketQuery`] driving ports on top
//! of the ticket, teller, counter and assignment repositories. Guards live in
//! [`super::ticket_transitions`]; this service owns numbering, the clock and
//! the mapping of port failures into domain errors.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use super::ports::{
    Assignment, AssignmentRepositoryError, AutoAssignOutcome, AutoAssignResult,
    DailyCounterRepository, DailyCounterRepositoryError, TellerRepository, TellerRepositoryError,
    TicketAssignmentRepository, TicketCommand, TicketDetails, TicketListing, TicketQuery,
    TicketRepository, TicketRepositoryError,
};
use super::teller_selection::{RandomTellerSelection, TellerSelectionPolicy};
use super::ticket_transitions::{self, TransitionError, ValidityError};
use super::{
    Error, TellerId, Ticket, TicketId, TicketListRequest, TicketNumber, TicketType, TicketWindow,
};

/// Repositories the lifecycle engine drives.
pub struct QueueRepositories<T, R, C, A> {
    pub tickets: Arc<T>,
    pub tellers: Arc<R>,
    pub counters: Arc<C>,
    pub assignments: Arc<A>,
}

/// Ticket lifecycle service.
pub struct TicketLifecycleService<T, R, C, A> {
    tickets: Arc<T>,
    tellers: Arc<R>,
    counters: Arc<C>,
    assignments: Arc<A>,
    selection: Arc<dyn TellerSelectionPolicy>,
    clock: Arc<dyn Clock>,
}

impl<T, R, C, A> TicketLifecycleService<T, R, C, A> {
    /// Build the service with random teller selection.
    pub fn new(repositories: QueueRepositories<T, R, C, A>, clock: Arc<dyn Clock>) -> Self {
        let QueueRepositories {
            tickets,
            tellers,
            counters,
            assignments,
        } = repositories;
        Self {
            tickets,
            tellers,
            counters,
            assignments,
            selection: Arc::new(RandomTellerSelection),
            clock,
        }
    }

    /// Replace the teller selection policy used by auto-assignment.
    #[must_use]
    pub fn with_selection_policy(mut self, selection: Arc<dyn TellerSelectionPolicy>) -> Self {
        self.selection = selection;
        self
    }
}

fn map_ticket_repository_error(error: TicketRepositoryError) -> Error {
    debug!(%error, "ticket repository failure");
    match error {
        TicketRepositoryError::Connection { .. } => {
            Error::service_unavailable("ticket store is unavailable")
        }
        TicketRepositoryError::DuplicateNumber { ticket_number } => {
            Error::internal(format!("ticket number {ticket_number} was already issued"))
        }
        TicketRepositoryError::Query { message } => {
            Error::internal(format!("ticket store error: {message}"))
        }
    }
}

fn map_counter_error(error: DailyCounterRepositoryError) -> Error {
    debug!(%error, "daily counter failure");
    match error {
        DailyCounterRepositoryError::Connection { .. } => {
            Error::service_unavailable("ticket counter is unavailable")
        }
        DailyCounterRepositoryError::Query { message } => {
            Error::internal(format!("ticket counter error: {message}"))
        }
    }
}

fn map_teller_repository_error(error: TellerRepositoryError) -> Error {
    debug!(%error, "teller repository failure");
    match error {
        TellerRepositoryError::Connection { .. } => {
            Error::service_unavailable("teller store is unavailable")
        }
        TellerRepositoryError::Query { message } => {
            Error::internal(format!("teller store error: {message}"))
        }
    }
}

fn map_transition_error(reason: TransitionError) -> Error {
    match reason {
        TransitionError::Unassigned => Error::ticket_unassigned(reason.to_string()),
        TransitionError::AlreadyServed
        | TransitionError::TellerBusy
        | TransitionError::Canceled
        | TransitionError::Completed => Error::conflict(reason.to_string()),
    }
}

fn map_assignment_error(error: AssignmentRepositoryError) -> Error {
    match error {
        AssignmentRepositoryError::TicketNotFound { .. } => Error::not_found("Ticket not found"),
        AssignmentRepositoryError::TellerNotFound { .. } => Error::not_found("Teller not found"),
        AssignmentRepositoryError::Rejected { reason } => map_transition_error(reason),
        AssignmentRepositoryError::Connection { .. } => {
            debug!(%error, "assignment repository failure");
            Error::service_unavailable("ticket store is unavailable")
        }
        AssignmentRepositoryError::Query { message } => {
            debug!(%message, "assignment repository failure");
            Error::internal(format!("ticket store error: {message}"))
        }
    }
}

fn map_validity_error(error: ValidityError) -> Error {
    match error {
        ValidityError::Expired => Error::ticket_expired(error.to_string()),
        ValidityError::AlreadyServed => Error::ticket_already_served(error.to_string()),
        ValidityError::Canceled => Error::conflict(error.to_string()),
    }
}

#[async_trait]
impl<T, R, C, A> TicketCommand for TicketLifecycleService<T, R, C, A>
where
    T: TicketRepository,
    R: TellerRepository,
    C: DailyCounterRepository,
    A: TicketAssignmentRepository,
{
    async fn create(&self, ticket_type: TicketType) -> Result<Ticket, Error> {
        let now = self.clock.utc();
        let day = now.date_naive();
        let sequence = self
            .counters
            .next_sequence(day)
            .await
            .map_err(map_counter_error)?;
        let ticket_number = TicketNumber::issue(day, ticket_type, sequence);
        let ticket = Ticket::issue(TicketId::random(), ticket_number, ticket_type, now);

        self.tickets
            .insert(&ticket)
            .await
            .map_err(map_ticket_repository_error)?;

        info!(
            ticket_id = %ticket.id,
            ticket_number = %ticket.ticket_number,
            ticket_type = ticket_type.code(),
            "ticket created"
        );
        Ok(ticket)
    }

    async fn cancel(&self, ticket_number: &TicketNumber) -> Result<Ticket, Error> {
        let outcome = self
            .assignments
            .cancel(ticket_number)
            .await
            .map_err(map_assignment_error)?;

        info!(
            ticket_number = %ticket_number,
            released_teller = ?outcome.released_teller.as_ref().map(|teller| teller.id),
            "ticket canceled"
        );
        Ok(outcome.ticket)
    }

    async fn serve(&self, ticket_id: &TicketId, teller_id: &TellerId) -> Result<Assignment, Error> {
        let assignment = self
            .assignments
            .serve(ticket_id, teller_id, self.clock.utc())
            .await
            .map_err(map_assignment_error)?;

        info!(
            ticket_id = %ticket_id,
            teller_id = %teller_id,
            "ticket served"
        );
        Ok(assignment)
    }

    async fn complete(&self, ticket_id: &TicketId) -> Result<Assignment, Error> {
        let assignment = self
            .assignments
            .complete(ticket_id)
            .await
            .map_err(map_assignment_error)?;

        info!(
            ticket_id = %ticket_id,
            teller_id = %assignment.teller.id,
            "ticket service completed"
        );
        Ok(assignment)
    }

    async fn auto_assign(&self, ticket_id: &TicketId) -> Result<AutoAssignResult, Error> {
        let outcome = self
            .assignments
            .auto_assign(ticket_id, self.clock.utc(), self.selection.as_ref())
            .await
            .map_err(map_assignment_error)?;

        match outcome {
            AutoAssignOutcome::Assigned(assignment) => {
                info!(
                    ticket_id = %ticket_id,
                    teller_id = %assignment.teller.id,
                    "ticket auto-assigned"
                );
                Ok(AutoAssignResult::Assigned(assignment))
            }
            other => {
                debug!(ticket_id = %ticket_id, outcome = ?other, "auto-assign skipped");
                Ok(AutoAssignResult::NothingToDo)
            }
        }
    }
}

#[async_trait]
impl<T, R, C, A> TicketQuery for TicketLifecycleService<T, R, C, A>
where
    T: TicketRepository,
    R: TellerRepository,
    C: DailyCounterRepository,
    A: TicketAssignmentRepository,
{
    async fn validate(&self, ticket_number: &TicketNumber) -> Result<Ticket, Error> {
        let ticket = self
            .tickets
            .find_by_number(ticket_number)
            .await
            .map_err(map_ticket_repository_error)?
            .ok_or_else(|| Error::not_found("Ticket not found"))?;

        ticket_transitions::check_validity(&ticket, self.clock.utc())
            .map_err(map_validity_error)?;
        Ok(ticket)
    }

    async fn list(&self, request: &TicketListRequest) -> Result<TicketListing, Error> {
        let day = request
            .date
            .unwrap_or_else(|| self.clock.utc().date_naive());
        let window = TicketWindow::for_day(day, request.status);

        let tickets = self
            .tickets
            .list_in_window(&window)
            .await
            .map_err(map_ticket_repository_error)?;

        let names: HashMap<TellerId, String> = if tickets.iter().any(|t| t.teller_id.is_some()) {
            self.tellers
                .list(false)
                .await
                .map_err(map_teller_repository_error)?
                .into_iter()
                .map(|teller| (teller.id, teller.name))
                .collect()
        } else {
            HashMap::new()
        };

        let tickets = tickets
            .into_iter()
            .map(|ticket| {
                let teller_name = ticket
                    .teller_id
                    .and_then(|id| names.get(&id).cloned());
                TicketDetails {
                    ticket,
                    teller_name,
                }
            })
            .collect();

        Ok(TicketListing { date: day, tickets })
    }
}

#[cfg(test)]
#[path = "ticket_lifecycle_service_tests.rs"]
mod tests;
