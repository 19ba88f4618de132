//! PostgreSQL-backed `DailyCounterRepository` implementation.
//!
//! Each call performs a single `INSERT .. ON CONFLICT DO UPDATE .. RETURNING`
//! so the row lock taken by PostgreSQL serialises concurrent issuers and every
//! caller observes a distinct sequence value.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DailyCounterRepository, DailyCounterRepositoryError};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::NewDailyCounterRow;
use super::pool::{DbPool, PoolError};
use super::schema::daily_counters;

/// Diesel-backed per-day ticket counter.
#[derive(Clone)]
pub struct DieselDailyCounterRepository {
    pool: DbPool,
}

impl DieselDailyCounterRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DailyCounterRepositoryError {
    DailyCounterRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> DailyCounterRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => DailyCounterRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            DailyCounterRepositoryError::query("counter upsert conflicted")
        }
        DieselFailure::Query(message) => DailyCounterRepositoryError::query(message),
    }
}

fn to_sequence(value: i32) -> Result<u32, DailyCounterRepositoryError> {
    u32::try_from(value)
        .ok()
        .filter(|sequence| *sequence > 0)
        .ok_or_else(|| DailyCounterRepositoryError::query(format!("invalid counter value {value}")))
}

#[async_trait]
impl DailyCounterRepository for DieselDailyCounterRepository {
    async fn next_sequence(&self, day: NaiveDate) -> Result<u32, DailyCounterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let last_number: i32 = diesel::insert_into(daily_counters::table)
            .values(&NewDailyCounterRow {
                counter_date: day,
                last_number: 1,
            })
            .on_conflict(daily_counters::counter_date)
            .do_update()
            .set(daily_counters::last_number.eq(daily_counters::last_number + 1))
            .returning(daily_counters::last_number)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        to_sequence(last_number)
    }
}
