//! In-memory adapters for every queue repository port.
//!
//! A single [`InMemoryQueueStore`] holds tickets, tellers, daily counters and
//! accounts behind one async mutex, so each port call is atomic with respect
//! to every other call. The server uses it when no database URL is
//! configured, and integration tests use it to exercise the full HTTP stack.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{
    Assignment, AssignmentRepositoryError, AutoAssignOutcome, CancelOutcome,
    DailyCounterRepository, DailyCounterRepositoryError, TellerRepository, TellerRepositoryError,
    TicketAssignmentRepository, TicketRepository, TicketRepositoryError, UserPersistenceError,
    UserRepository,
};
use crate::domain::ticket_transitions::{self, CancelEffect};
use crate::domain::{
    EmailAddress, Teller, TellerId, TellerSelectionPolicy, Ticket, TicketId, TicketNumber,
    TicketWindow, UserAccount, UserId, Username,
};

#[derive(Debug, Default)]
struct QueueState {
    tickets: HashMap<TicketId, Ticket>,
    tellers: HashMap<TellerId, Teller>,
    counters: HashMap<NaiveDate, u32>,
    users: HashMap<UserId, UserAccount>,
}

impl QueueState {
    fn sorted_tellers(&self) -> Vec<Teller> {
        let mut tellers: Vec<Teller> = self.tellers.values().cloned().collect();
        tellers.sort_by(|left, right| left.name.cmp(&right.name).then(left.id.cmp(&right.id)));
        tellers
    }

    fn ticket_id_by_number(&self, ticket_number: &TicketNumber) -> Option<TicketId> {
        self.tickets
            .values()
            .find(|ticket| &ticket.ticket_number == ticket_number)
            .map(|ticket| ticket.id)
    }
}

/// Shared in-memory store implementing the queue repository ports.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueueStore {
    state: Arc<Mutex<QueueState>>,
}

impl InMemoryQueueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a teller.
    pub async fn put_teller(&self, teller: Teller) {
        let mut state = self.state.lock().await;
        state.tellers.insert(teller.id, teller);
    }

    /// Look up a teller by display name.
    pub async fn teller_named(&self, name: &str) -> Option<Teller> {
        let state = self.state.lock().await;
        state.tellers.values().find(|teller| teller.name == name).cloned()
    }
}

#[async_trait]
impl TicketRepository for InMemoryQueueStore {
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError> {
        let mut state = self.state.lock().await;
        if state.ticket_id_by_number(&ticket.ticket_number).is_some() {
            return Err(TicketRepositoryError::duplicate_number(
                ticket.ticket_number.as_str(),
            ));
        }
        state.tickets.insert(ticket.id, ticket.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.tickets.get(id).cloned())
    }

    async fn find_by_number(
        &self,
        ticket_number: &TicketNumber,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .ticket_id_by_number(ticket_number)
            .and_then(|id| state.tickets.get(&id).cloned()))
    }

    async fn list_in_window(
        &self,
        window: &TicketWindow,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let state = self.state.lock().await;
        let mut tickets: Vec<Ticket> = state
            .tickets
            .values()
            .filter(|ticket| window.matches(ticket))
            .cloned()
            .collect();
        tickets.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.ticket_number.as_str().cmp(right.ticket_number.as_str()))
        });
        Ok(tickets)
    }
}

#[async_trait]
impl TellerRepository for InMemoryQueueStore {
    async fn list(&self, active_only: bool) -> Result<Vec<Teller>, TellerRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .sorted_tellers()
            .into_iter()
            .filter(|teller| !active_only || teller.is_active)
            .collect())
    }

    async fn find_by_id(&self, id: &TellerId) -> Result<Option<Teller>, TellerRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.tellers.get(id).cloned())
    }

    async fn seed_if_empty(&self, names: &[String]) -> Result<usize, TellerRepositoryError> {
        let mut state = self.state.lock().await;
        if !state.tellers.is_empty() {
            return Ok(0);
        }
        for name in names {
            let teller = Teller::idle(TellerId::random(), name.as_str());
            state.tellers.insert(teller.id, teller);
        }
        Ok(names.len())
    }
}

#[async_trait]
impl DailyCounterRepository for InMemoryQueueStore {
    async fn next_sequence(&self, day: NaiveDate) -> Result<u32, DailyCounterRepositoryError> {
        let mut state = self.state.lock().await;
        let counter = state.counters.entry(day).or_insert(0);
        *counter = counter
            .checked_add(1)
            .ok_or_else(|| DailyCounterRepositoryError::query("daily counter overflowed"))?;
        Ok(*counter)
    }
}

#[async_trait]
impl TicketAssignmentRepository for InMemoryQueueStore {
    async fn serve(
        &self,
        ticket_id: &TicketId,
        teller_id: &TellerId,
        served_at: DateTime<Utc>,
    ) -> Result<Assignment, AssignmentRepositoryError> {
        let mut guard = self.state.lock().await;
        let QueueState {
            tickets, tellers, ..
        } = &mut *guard;
        let ticket = tickets
            .get_mut(ticket_id)
            .ok_or_else(|| AssignmentRepositoryError::ticket_not_found(ticket_id.to_string()))?;
        let teller = tellers
            .get_mut(teller_id)
            .ok_or_else(|| AssignmentRepositoryError::teller_not_found(teller_id.to_string()))?;

        ticket_transitions::serve(ticket, teller, served_at)
            .map_err(AssignmentRepositoryError::rejected)?;
        Ok(Assignment {
            ticket: ticket.clone(),
            teller: teller.clone(),
        })
    }

    async fn auto_assign(
        &self,
        ticket_id: &TicketId,
        served_at: DateTime<Utc>,
        policy: &dyn TellerSelectionPolicy,
    ) -> Result<AutoAssignOutcome, AssignmentRepositoryError> {
        let mut guard = self.state.lock().await;
        let available: Vec<Teller> = guard
            .sorted_tellers()
            .into_iter()
            .filter(Teller::is_available)
            .collect();
        let QueueState {
            tickets, tellers, ..
        } = &mut *guard;

        let Some(ticket) = tickets.get_mut(ticket_id) else {
            return Ok(AutoAssignOutcome::TicketNotFound);
        };
        if ticket.is_served || ticket.is_canceled {
            return Ok(AutoAssignOutcome::TicketUnavailable);
        }
        let Some(chosen) = policy.select(&available).map(|teller| teller.id) else {
            return Ok(AutoAssignOutcome::NoTellerAvailable);
        };
        let teller = tellers
            .get_mut(&chosen)
            .ok_or_else(|| AssignmentRepositoryError::teller_not_found(chosen.to_string()))?;

        ticket_transitions::serve(ticket, teller, served_at)
            .map_err(AssignmentRepositoryError::rejected)?;
        Ok(AutoAssignOutcome::Assigned(Assignment {
            ticket: ticket.clone(),
            teller: teller.clone(),
        }))
    }

    async fn complete(&self, ticket_id: &TicketId) -> Result<Assignment, AssignmentRepositoryError> {
        let mut guard = self.state.lock().await;
        let QueueState {
            tickets, tellers, ..
        } = &mut *guard;
        let ticket = tickets
            .get_mut(ticket_id)
            .ok_or_else(|| AssignmentRepositoryError::ticket_not_found(ticket_id.to_string()))?;
        let teller_id = ticket.teller_id.ok_or_else(|| {
            AssignmentRepositoryError::rejected(ticket_transitions::TransitionError::Unassigned)
        })?;
        let teller = tellers
            .get_mut(&teller_id)
            .ok_or_else(|| AssignmentRepositoryError::teller_not_found(teller_id.to_string()))?;

        let changed = ticket_transitions::complete(ticket, teller)
            .map_err(AssignmentRepositoryError::rejected)?;
        if !changed {
            debug!(ticket_id = %ticket_id, "ticket already completed");
        }
        Ok(Assignment {
            ticket: ticket.clone(),
            teller: teller.clone(),
        })
    }

    async fn cancel(
        &self,
        ticket_number: &TicketNumber,
    ) -> Result<CancelOutcome, AssignmentRepositoryError> {
        let mut guard = self.state.lock().await;
        let ticket_id = guard.ticket_id_by_number(ticket_number).ok_or_else(|| {
            AssignmentRepositoryError::ticket_not_found(ticket_number.as_str())
        })?;
        let QueueState {
            tickets, tellers, ..
        } = &mut *guard;
        let ticket = tickets
            .get_mut(&ticket_id)
            .ok_or_else(|| AssignmentRepositoryError::ticket_not_found(ticket_number.as_str()))?;
        let teller = ticket.teller_id.and_then(|id| tellers.get_mut(&id));

        let effect =
            ticket_transitions::cancel(ticket, teller).map_err(AssignmentRepositoryError::rejected)?;
        let released_teller = match effect {
            CancelEffect::Canceled {
                released_teller: true,
            } => ticket.teller_id.and_then(|id| tellers.get(&id).cloned()),
            CancelEffect::Canceled { .. } | CancelEffect::AlreadyCanceled => None,
        };
        Ok(CancelOutcome {
            ticket: ticket.clone(),
            released_teller,
        })
    }
}

#[async_trait]
impl UserRepository for InMemoryQueueStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut state = self.state.lock().await;
        let clash = state.users.values().find_map(|existing| {
            if existing.user.username == account.user.username {
                Some("username")
            } else if existing.user.email == account.user.email {
                Some("email")
            } else {
                None
            }
        });
        if let Some(field) = clash {
            return Err(UserPersistenceError::duplicate(field));
        }
        state.users.insert(account.user.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.state.lock().await;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|account| account.user.username.as_str() == username)
            .cloned())
    }

    async fn exists(
        &self,
        username: &Username,
        email: &EmailAddress,
    ) -> Result<bool, UserPersistenceError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .any(|account| &account.user.username == username || &account.user.email == email))
    }
}
