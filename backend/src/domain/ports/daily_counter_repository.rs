//! Port for the per-day ticket sequence.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::define_port_error;

define_port_error! {
    /// Errors raised by daily counter adapters.
    pub enum DailyCounterRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "daily counter connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "daily counter query failed: {message}",
    }
}

/// Issues contiguous 1-based sequence numbers per calendar day.
///
/// Implementations must guarantee that concurrent callers for the same day
/// never observe the same value. Numbers are never reused.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DailyCounterRepository: Send + Sync {
    /// Increment the counter for `day`, creating it at zero first when
    /// missing, and return the new value.
    async fn next_sequence(&self, day: NaiveDate) -> Result<u32, DailyCounterRepositoryError>;
}
