//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use serde_json::json;

use crate::domain::ports::{AccountService, TellerRepository};
use crate::domain::{
    AuthenticatedSession, Error, LeastRecentlyAssignedSelection, LoginCredentials,
    QueueRepositories, Registration, Teller, TellerDirectoryService, TicketLifecycleService,
    UserId,
};
use crate::outbound::memory::InMemoryQueueStore;

use super::state::{HttpState, HttpStatePorts};

/// Access token accepted by [`StaticTokenAccounts`].
pub const VALID_TOKEN: &str = "valid-access-token";
/// Principal returned for [`VALID_TOKEN`].
pub const TEST_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

/// Clock frozen at one instant.
pub struct FixtureClock(pub DateTime<Utc>);

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// 2025-04-11 09:00:00 UTC.
pub fn business_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 11, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Account service that authorises a single fixed token.
pub struct StaticTokenAccounts;

#[async_trait]
impl AccountService for StaticTokenAccounts {
    async fn register(&self, _registration: Registration) -> Result<AuthenticatedSession, Error> {
        Err(Error::internal("registration is not available in this fixture"))
    }

    async fn login(&self, _credentials: &LoginCredentials) -> Result<AuthenticatedSession, Error> {
        Err(Error::unauthorized("Invalid username or password"))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<String, Error> {
        Err(Error::unauthorized("Invalid token"))
    }

    fn authorize(&self, access_token: &str) -> Result<UserId, Error> {
        if access_token == VALID_TOKEN {
            UserId::new(TEST_USER_ID)
                .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))
        } else {
            Err(Error::unauthorized("Invalid token").with_details(json!({ "code": "invalid_token" })))
        }
    }
}

/// In-memory queue with tellers A and B, wired into handler state.
pub struct TestQueue {
    pub store: InMemoryQueueStore,
    pub state: HttpState,
}

impl TestQueue {
    /// Build a queue whose clock is frozen at `now`.
    pub async fn at(now: DateTime<Utc>) -> Self {
        Self::with_accounts(now, Arc::new(StaticTokenAccounts)).await
    }

    /// Build a queue with a custom account service.
    pub async fn with_accounts(now: DateTime<Utc>, accounts: Arc<dyn AccountService>) -> Self {
        let store = InMemoryQueueStore::new();
        let names = vec!["Teller A".to_owned(), "Teller B".to_owned()];
        TellerRepository::seed_if_empty(&store, &names)
            .await
            .expect("seed tellers");

        let shared = Arc::new(store.clone());
        let lifecycle = Arc::new(
            TicketLifecycleService::new(
                QueueRepositories {
                    tickets: shared.clone(),
                    tellers: shared.clone(),
                    counters: shared.clone(),
                    assignments: shared.clone(),
                },
                Arc::new(FixtureClock(now)),
            )
            .with_selection_policy(Arc::new(LeastRecentlyAssignedSelection)),
        );
        let state = HttpState::new(HttpStatePorts {
            tickets: lifecycle.clone(),
            tickets_query: lifecycle,
            tellers: Arc::new(TellerDirectoryService::new(shared)),
            accounts,
        });
        Self { store, state }
    }

    /// Fetch a seeded teller by name.
    pub async fn teller(&self, name: &str) -> Teller {
        self.store.teller_named(name).await.expect("seeded teller")
    }
}

/// `Authorization` header value carrying [`VALID_TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {VALID_TOKEN}"))
}

/// App exposing every `/api` handler over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .service(web::scope("/api").configure(super::configure_api))
}
