//! PostgreSQL-backed `TicketAssignmentRepository`.
//!
//! Every transition runs in one transaction. The ticket row and the teller
//! row are locked with `SELECT .. FOR UPDATE` before the guards in
//! [`crate::domain::ticket_transitions`] run, so two requests racing for the
//! same ticket or the same teller serialise and the loser sees the winner's
//! state. Auto-assignment scans idle tellers with `SKIP LOCKED` so concurrent
//! assigners never wait on, or double-book, a teller another transaction is
//! about to take.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    Assignment, AssignmentRepositoryError, AutoAssignOutcome, CancelOutcome,
    TicketAssignmentRepository,
};
use crate::domain::ticket_transitions::{self, CancelEffect, TransitionError};
use crate::domain::{Teller, TellerId, TellerSelectionPolicy, Ticket, TicketId, TicketNumber};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{TellerRow, TellerStateUpdate, TicketRow, TicketStateUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{tellers, tickets};

/// Diesel-backed implementation of atomic ticket transitions.
#[derive(Clone)]
pub struct DieselTicketAssignmentRepository {
    pool: DbPool,
}

impl DieselTicketAssignmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a transaction body; any variant rolls the transaction back.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Domain(AssignmentRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<AssignmentRepositoryError> for TxError {
    fn from(error: AssignmentRepositoryError) -> Self {
        Self::Domain(error)
    }
}

impl From<TransitionError> for TxError {
    fn from(reason: TransitionError) -> Self {
        Self::Domain(AssignmentRepositoryError::rejected(reason))
    }
}

fn map_pool_error(error: PoolError) -> AssignmentRepositoryError {
    AssignmentRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> AssignmentRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => AssignmentRepositoryError::connection(message),
        DieselFailure::UniqueViolation { constraint } => AssignmentRepositoryError::query(
            format!("unique constraint violated: {constraint:?}"),
        ),
        DieselFailure::Query(message) => AssignmentRepositoryError::query(message),
    }
}

fn map_tx_error(error: TxError) -> AssignmentRepositoryError {
    match error {
        TxError::Diesel(inner) => map_diesel_error(inner),
        TxError::Domain(inner) => inner,
    }
}

fn row_to_ticket(row: TicketRow) -> Result<Ticket, TxError> {
    Ticket::try_from(row).map_err(|message| AssignmentRepositoryError::query(message).into())
}

async fn lock_ticket_by_id(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<Ticket>, TxError> {
    let row: Option<TicketRow> = tickets::table
        .find(id)
        .select(TicketRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    row.map(row_to_ticket).transpose()
}

async fn lock_ticket_by_number(
    conn: &mut AsyncPgConnection,
    ticket_number: &str,
) -> Result<Option<Ticket>, TxError> {
    let row: Option<TicketRow> = tickets::table
        .filter(tickets::ticket_number.eq(ticket_number))
        .select(TicketRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    row.map(row_to_ticket).transpose()
}

async fn lock_teller(conn: &mut AsyncPgConnection, id: Uuid) -> Result<Option<Teller>, TxError> {
    let row: Option<TellerRow> = tellers::table
        .find(id)
        .select(TellerRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    Ok(row.map(Teller::from))
}

/// Idle tellers not locked by another transaction, in name order.
async fn lock_idle_tellers(conn: &mut AsyncPgConnection) -> Result<Vec<Teller>, TxError> {
    let rows: Vec<TellerRow> = tellers::table
        .filter(tellers::is_active.eq(false))
        .select(TellerRow::as_select())
        .order_by((tellers::name.asc(), tellers::id.asc()))
        .for_update()
        .skip_locked()
        .load(conn)
        .await?;
    Ok(rows.into_iter().map(Teller::from).collect())
}

async fn store_ticket(conn: &mut AsyncPgConnection, ticket: &Ticket) -> Result<(), TxError> {
    diesel::update(tickets::table.find(*ticket.id.as_uuid()))
        .set(&TicketStateUpdate::from(ticket))
        .execute(conn)
        .await?;
    Ok(())
}

async fn store_teller(conn: &mut AsyncPgConnection, teller: &Teller) -> Result<(), TxError> {
    diesel::update(tellers::table.find(*teller.id.as_uuid()))
        .set(&TellerStateUpdate::from(teller))
        .execute(conn)
        .await?;
    Ok(())
}

async fn store_assignment(
    conn: &mut AsyncPgConnection,
    ticket: Ticket,
    teller: Teller,
) -> Result<Assignment, TxError> {
    store_ticket(conn, &ticket).await?;
    store_teller(conn, &teller).await?;
    Ok(Assignment { ticket, teller })
}

#[async_trait]
impl TicketAssignmentRepository for DieselTicketAssignmentRepository {
    async fn serve(
        &self,
        ticket_id: &TicketId,
        teller_id: &TellerId,
        served_at: DateTime<Utc>,
    ) -> Result<Assignment, AssignmentRepositoryError> {
        let ticket_uuid = *ticket_id.as_uuid();
        let teller_uuid = *teller_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let mut ticket = lock_ticket_by_id(conn, ticket_uuid).await?.ok_or_else(|| {
                    AssignmentRepositoryError::ticket_not_found(ticket_uuid.to_string())
                })?;
                let mut teller = lock_teller(conn, teller_uuid).await?.ok_or_else(|| {
                    AssignmentRepositoryError::teller_not_found(teller_uuid.to_string())
                })?;

                ticket_transitions::serve(&mut ticket, &mut teller, served_at)?;
                store_assignment(conn, ticket, teller).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn auto_assign(
        &self,
        ticket_id: &TicketId,
        served_at: DateTime<Utc>,
        policy: &dyn TellerSelectionPolicy,
    ) -> Result<AutoAssignOutcome, AssignmentRepositoryError> {
        let ticket_uuid = *ticket_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let Some(mut ticket) = lock_ticket_by_id(conn, ticket_uuid).await? else {
                    return Ok(AutoAssignOutcome::TicketNotFound);
                };
                if ticket.is_served || ticket.is_canceled {
                    return Ok(AutoAssignOutcome::TicketUnavailable);
                }

                let idle = lock_idle_tellers(conn).await?;
                let Some(mut teller) = policy.select(&idle).cloned() else {
                    return Ok(AutoAssignOutcome::NoTellerAvailable);
                };

                ticket_transitions::serve(&mut ticket, &mut teller, served_at)?;
                let assignment = store_assignment(conn, ticket, teller).await?;
                Ok(AutoAssignOutcome::Assigned(assignment))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn complete(&self, ticket_id: &TicketId) -> Result<Assignment, AssignmentRepositoryError> {
        let ticket_uuid = *ticket_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let mut ticket = lock_ticket_by_id(conn, ticket_uuid).await?.ok_or_else(|| {
                    AssignmentRepositoryError::ticket_not_found(ticket_uuid.to_string())
                })?;
                let teller_id = ticket.teller_id.ok_or(TransitionError::Unassigned)?;
                let mut teller = lock_teller(conn, *teller_id.as_uuid())
                    .await?
                    .ok_or_else(|| {
                        AssignmentRepositoryError::teller_not_found(teller_id.to_string())
                    })?;

                if ticket_transitions::complete(&mut ticket, &mut teller)? {
                    store_assignment(conn, ticket, teller).await
                } else {
                    Ok(Assignment { ticket, teller })
                }
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn cancel(
        &self,
        ticket_number: &TicketNumber,
    ) -> Result<CancelOutcome, AssignmentRepositoryError> {
        let number = ticket_number.as_str();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let mut ticket = lock_ticket_by_number(conn, number)
                    .await?
                    .ok_or_else(|| AssignmentRepositoryError::ticket_not_found(number))?;
                let mut teller = match ticket.teller_id {
                    Some(id) => lock_teller(conn, *id.as_uuid()).await?,
                    None => None,
                };

                let effect = ticket_transitions::cancel(&mut ticket, teller.as_mut())?;
                let released_teller = match effect {
                    CancelEffect::AlreadyCanceled => None,
                    CancelEffect::Canceled { released_teller } => {
                        store_ticket(conn, &ticket).await?;
                        match teller {
                            Some(freed) if released_teller => {
                                store_teller(conn, &freed).await?;
                                Some(freed)
                            }
                            _ => None,
                        }
                    }
                };
                Ok(CancelOutcome {
                    ticket,
                    released_teller,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }
}
