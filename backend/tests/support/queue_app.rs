//! Queue wiring shared by the HTTP integration suites.
//!
//! Ticket operations run on a frozen clock so numbers and dates are
//! predictable, while accounts use the real clock because bearer token
//! expiry is checked against wall time.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use argon2::Params;
use bqms::domain::ports::TellerRepository;
use bqms::domain::{
    LeastRecentlyAssignedSelection, QueueRepositories, TellerDirectoryService,
    TicketLifecycleService, UserAccountService,
};
use bqms::inbound::http::configure_api;
use bqms::inbound::http::state::{HttpState, HttpStatePorts};
use bqms::outbound::memory::InMemoryQueueStore;
use bqms::outbound::security::{Argon2CredentialHasher, JwtTokenService};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::{Clock, DefaultClock};

pub struct FrozenClock(pub DateTime<Utc>);

impl Clock for FrozenClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// 2025-04-11 09:00:00 UTC.
pub fn opening_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 11, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Build state over a fresh in-memory store seeded with `tellers`.
pub async fn queue_state(now: DateTime<Utc>, tellers: &[&str]) -> (InMemoryQueueStore, HttpState) {
    let store = InMemoryQueueStore::new();
    let names: Vec<String> = tellers.iter().map(|name| (*name).to_owned()).collect();
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
            Arc::new(FrozenClock(now)),
        )
        .with_selection_policy(Arc::new(LeastRecentlyAssignedSelection)),
    );
    let params = Params::new(1024, 1, 1, None).expect("argon2 params");
    let accounts = Arc::new(UserAccountService::new(
        shared.clone(),
        Arc::new(Argon2CredentialHasher::with_params(params)),
        Arc::new(JwtTokenService::new(
            b"integration-secret",
            TimeDelta::hours(1),
            TimeDelta::days(30),
        )),
        Arc::new(DefaultClock),
    ));

    let state = HttpState::new(HttpStatePorts {
        tickets: lifecycle.clone(),
        tickets_query: lifecycle,
        tellers: Arc::new(TellerDirectoryService::new(shared)),
        accounts,
    });
    (store, state)
}

pub fn queue_app(
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
        .wrap(bqms::Trace)
        .service(web::scope("/api").configure(configure_api))
}
