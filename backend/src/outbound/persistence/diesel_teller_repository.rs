//! PostgreSQL-backed `TellerRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::info;

use crate::domain::ports::{TellerRepository, TellerRepositoryError};
use crate::domain::{Teller, TellerId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewTellerRow, TellerRow};
use super::pool::{DbPool, PoolError};
use super::schema::tellers;

/// Diesel-backed teller store.
#[derive(Clone)]
pub struct DieselTellerRepository {
    pool: DbPool,
}

impl DieselTellerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TellerRepositoryError {
    TellerRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> TellerRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => TellerRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            TellerRepositoryError::query("teller already exists")
        }
        DieselFailure::Query(message) => TellerRepositoryError::query(message),
    }
}

#[async_trait]
impl TellerRepository for DieselTellerRepository {
    async fn list(&self, active_only: bool) -> Result<Vec<Teller>, TellerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = tellers::table
            .select(TellerRow::as_select())
            .order_by((tellers::name.asc(), tellers::id.asc()))
            .into_boxed();
        if active_only {
            query = query.filter(tellers::is_active.eq(true));
        }

        let rows: Vec<TellerRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Teller::from).collect())
    }

    async fn find_by_id(&self, id: &TellerId) -> Result<Option<Teller>, TellerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TellerRow> = tellers::table
            .find(*id.as_uuid())
            .select(TellerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Teller::from))
    }

    async fn seed_if_empty(&self, names: &[String]) -> Result<usize, TellerRepositoryError> {
        let new_rows: Vec<NewTellerRow<'_>> = names
            .iter()
            .map(|name| NewTellerRow {
                id: *TellerId::random().as_uuid(),
                name: name.as_str(),
                is_active: false,
            })
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The table lock serialises concurrent seeders so only one inserts.
        let inserted = conn
            .transaction(|conn| {
                async move {
                    diesel::sql_query("LOCK TABLE tellers IN SHARE ROW EXCLUSIVE MODE")
                        .execute(conn)
                        .await?;
                    let existing: i64 = tellers::table.count().get_result(conn).await?;
                    if existing > 0 || new_rows.is_empty() {
                        return Ok(0);
                    }
                    diesel::insert_into(tellers::table)
                        .values(&new_rows)
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        if inserted > 0 {
            info!(count = inserted, "seeded default tellers");
        }
        Ok(inserted)
    }
}
