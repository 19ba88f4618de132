//! Port abstraction for teller persistence adapters.
use async_trait::async_trait;

use crate::domain::{Teller, TellerId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by teller repository adapters.
    pub enum TellerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "teller repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "teller repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TellerRepository: Send + Sync {
    /// List tellers ordered by name, optionally only the busy ones.
    async fn list(&self, active_only: bool) -> Result<Vec<Teller>, TellerRepositoryError>;

    /// Fetch a teller by identifier.
    async fn find_by_id(&self, id: &TellerId) -> Result<Option<Teller>, TellerRepositoryError>;

    /// Insert idle tellers with the given names when no teller exists yet.
    ///
    /// Returns the number of tellers inserted.
    async fn seed_if_empty(&self, names: &[String]) -> Result<usize, TellerRepositoryError>;
}
