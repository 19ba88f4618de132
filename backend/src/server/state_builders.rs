//! Builders wiring repositories into the services behind `HttpState`.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use bqms::domain::ports::{
    AccountService, DailyCounterRepository, TellerDirectory, TellerRepository,
    TicketAssignmentRepository, TicketCommand, TicketQuery, TicketRepository, UserRepository,
};
use bqms::domain::{
    QueueRepositories, TellerDirectoryService, TicketLifecycleService, UserAccountService,
};
use bqms::inbound::http::state::{HttpState, HttpStatePorts};
use bqms::outbound::memory::InMemoryQueueStore;
use bqms::outbound::persistence::{
    DbPool, DieselDailyCounterRepository, DieselTellerRepository,
    DieselTicketAssignmentRepository, DieselTicketRepository, DieselUserRepository,
};
use bqms::outbound::security::{Argon2CredentialHasher, JwtTokenService};

use super::ServerConfig;

/// Wire the lifecycle, directory and account services over one set of
/// repositories.
fn build_ports<T, R, C, A, U>(
    repositories: QueueRepositories<T, R, C, A>,
    users: Arc<U>,
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts
where
    T: TicketRepository + 'static,
    R: TellerRepository + 'static,
    C: DailyCounterRepository + 'static,
    A: TicketAssignmentRepository + 'static,
    U: UserRepository + 'static,
{
    let tellers: Arc<dyn TellerDirectory> =
        Arc::new(TellerDirectoryService::new(repositories.tellers.clone()));
    let lifecycle = Arc::new(
        TicketLifecycleService::new(repositories, clock.clone())
            .with_selection_policy(config.policy.into_policy()),
    );
    let tokens = &config.tokens;
    let accounts: Arc<dyn AccountService> = Arc::new(UserAccountService::new(
        users,
        Arc::new(Argon2CredentialHasher::default()),
        Arc::new(JwtTokenService::new(
            tokens.secret.as_slice(),
            tokens.access_ttl,
            tokens.refresh_ttl,
        )),
        clock,
    ));

    HttpStatePorts {
        tickets: lifecycle.clone() as Arc<dyn TicketCommand>,
        tickets_query: lifecycle as Arc<dyn TicketQuery>,
        tellers,
        accounts,
    }
}

async fn seed_tellers<R>(tellers: &R, names: &[String]) -> std::io::Result<()>
where
    R: TellerRepository,
{
    if names.is_empty() {
        return Ok(());
    }
    let inserted = tellers
        .seed_if_empty(names)
        .await
        .map_err(|e| std::io::Error::other(format!("teller seeding failed: {e}")))?;
    if inserted > 0 {
        info!(inserted, "seeded default tellers");
    }
    Ok(())
}

fn build_diesel_ports(pool: &DbPool, config: &ServerConfig) -> (HttpStatePorts, Arc<DieselTellerRepository>) {
    let tellers = Arc::new(DieselTellerRepository::new(pool.clone()));
    let ports = build_ports(
        QueueRepositories {
            tickets: Arc::new(DieselTicketRepository::new(pool.clone())),
            tellers: tellers.clone(),
            counters: Arc::new(DieselDailyCounterRepository::new(pool.clone())),
            assignments: Arc::new(DieselTicketAssignmentRepository::new(pool.clone())),
        },
        Arc::new(DieselUserRepository::new(pool.clone())),
        config,
        Arc::new(DefaultClock),
    );
    (ports, tellers)
}

/// Build the HTTP state, using PostgreSQL when a pool is configured and the
/// in-memory store otherwise. Default tellers are seeded into an empty store.
///
/// # Errors
/// Returns [`std::io::Error`] when teller seeding fails.
pub async fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    match &config.db_pool {
        Some(pool) => {
            let (ports, tellers) = build_diesel_ports(pool, config);
            seed_tellers(tellers.as_ref(), &config.teller_seed).await?;
            Ok(HttpState::new(ports).with_db_pool(pool.clone()))
        }
        None => {
            info!("no database configured; using the in-memory queue store");
            let store = Arc::new(InMemoryQueueStore::new());
            seed_tellers(store.as_ref(), &config.teller_seed).await?;
            let ports = build_ports(
                QueueRepositories {
                    tickets: store.clone(),
                    tellers: store.clone(),
                    counters: store.clone(),
                    assignments: store.clone(),
                },
                store,
                config,
                Arc::new(DefaultClock),
            );
            Ok(HttpState::new(ports))
        }
    }
}
