//! Driving port for read-only teller queries.

use async_trait::async_trait;

use crate::domain::{Error, Teller, TellerId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TellerDirectory: Send + Sync {
    /// List tellers ordered by name; `active_only` keeps busy tellers.
    async fn list(&self, active_only: bool) -> Result<Vec<Teller>, Error>;

    /// Fetch one teller.
    async fn get(&self, id: &TellerId) -> Result<Teller, Error>;
}
