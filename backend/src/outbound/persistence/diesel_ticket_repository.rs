//! PostgreSQL-backed `TicketRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TicketRepository, TicketRepositoryError};
use crate::domain::{Ticket, TicketId, TicketNumber, TicketStatus, TicketWindow};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewTicketRow, TicketRow};
use super::pool::{DbPool, PoolError};
use super::schema::tickets;

/// Diesel-backed ticket store.
#[derive(Clone)]
pub struct DieselTicketRepository {
    pool: DbPool,
}

impl DieselTicketRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TicketRepositoryError {
    TicketRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> TicketRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => TicketRepositoryError::connection(message),
        DieselFailure::UniqueViolation { constraint } => {
            TicketRepositoryError::query(format!("unique constraint violated: {constraint:?}"))
        }
        DieselFailure::Query(message) => TicketRepositoryError::query(message),
    }
}

fn map_insert_error(error: diesel::result::Error, ticket_number: &str) -> TicketRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::UniqueViolation { .. } => {
            TicketRepositoryError::duplicate_number(ticket_number)
        }
        DieselFailure::Connection(message) => TicketRepositoryError::connection(message),
        DieselFailure::Query(message) => TicketRepositoryError::query(message),
    }
}

fn row_to_ticket(row: TicketRow) -> Result<Ticket, TicketRepositoryError> {
    Ticket::try_from(row).map_err(TicketRepositoryError::query)
}

#[async_trait]
impl TicketRepository for DieselTicketRepository {
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(tickets::table)
            .values(&NewTicketRow::from(ticket))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_insert_error(err, ticket.ticket_number.as_str()))
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TicketRow> = tickets::table
            .find(*id.as_uuid())
            .select(TicketRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_ticket).transpose()
    }

    async fn find_by_number(
        &self,
        ticket_number: &TicketNumber,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TicketRow> = tickets::table
            .filter(tickets::ticket_number.eq(ticket_number.as_str()))
            .select(TicketRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_ticket).transpose()
    }

    async fn list_in_window(
        &self,
        window: &TicketWindow,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = tickets::table
            .filter(tickets::created_at.ge(window.start))
            .filter(tickets::created_at.lt(window.end))
            .select(TicketRow::as_select())
            .order_by((tickets::created_at.asc(), tickets::ticket_number.asc()))
            .into_boxed();
        if let Some(status) = window.status {
            query = query.filter(tickets::is_served.eq(status == TicketStatus::Served));
        }

        let rows: Vec<TicketRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_ticket).collect()
    }
}
