//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountService, TellerDirectory, TicketCommand, TicketQuery};
use crate::outbound::persistence::DbPool;

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub tickets: Arc<dyn TicketCommand>,
    pub tickets_query: Arc<dyn TicketQuery>,
    pub tellers: Arc<dyn TellerDirectory>,
    pub accounts: Arc<dyn AccountService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub tickets: Arc<dyn TicketCommand>,
    pub tickets_query: Arc<dyn TicketQuery>,
    pub tellers: Arc<dyn TellerDirectory>,
    pub accounts: Arc<dyn AccountService>,
    /// Pool probed by the readiness endpoint; `None` for in-memory stores.
    pub db_pool: Option<DbPool>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle without a database probe.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use bqms::domain::ports::{AccountService, TellerDirectory, TicketCommand, TicketQuery};
    /// use bqms::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// fn build(
    ///     tickets: Arc<dyn TicketCommand>,
    ///     tickets_query: Arc<dyn TicketQuery>,
    ///     tellers: Arc<dyn TellerDirectory>,
    ///     accounts: Arc<dyn AccountService>,
    /// ) -> HttpState {
    ///     HttpState::new(HttpStatePorts { tickets, tickets_query, tellers, accounts })
    /// }
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            tickets,
            tickets_query,
            tellers,
            accounts,
        } = ports;
        Self {
            tickets,
            tickets_query,
            tellers,
            accounts,
            db_pool: None,
        }
    }

    /// Attach the pool the readiness probe pings.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
