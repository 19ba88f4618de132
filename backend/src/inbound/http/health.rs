//! Liveness and readiness probes.
//!
//! Readiness also pings the database pool when the server runs against
//! PostgreSQL, so a lost database takes the instance out of rotation.
use actix_web::{HttpResponse, get, http::header, web};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use crate::inbound::http::state::HttpState;

/// Process health flags shared between the server lifecycle and the probes.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Start not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready once migrations and seeding have finished.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness checks while draining.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

async fn database_reachable(state: Option<&HttpState>) -> bool {
    let Some(pool) = state.and_then(|s| s.db_pool.as_ref()) else {
        return true;
    };
    match pool.ping().await {
        Ok(()) => true,
        Err(error) => {
            warn!(%error, "readiness probe could not reach the database");
            false
        }
    }
}

/// Readiness probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is starting or the database is unreachable")
    )
)]
#[get("/health/ready")]
pub async fn ready(
    health: web::Data<HealthState>,
    state: Option<web::Data<HttpState>>,
) -> HttpResponse {
    let state = state.as_ref().map(|data| data.get_ref());
    let ok = health.is_ready() && database_reachable(state).await;
    HealthState::probe_response(ok)
}

/// Liveness probe. Returns 503 once the process is draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(health: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(health.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestQueue, business_morning};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    async fn probe(health: HealthState, uri: &str) -> (StatusCode, Option<String>) {
        let queue = TestQueue::at(business_morning()).await;
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(health))
                .app_data(web::Data::new(queue.state.clone()))
                .service(ready)
                .service(live),
        )
        .await;
        let response =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
                .await;
        let cache = response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        (response.status(), cache)
    }

    #[rstest]
    #[actix_web::test]
    async fn readiness_waits_for_startup() {
        let (status, cache) = probe(HealthState::new(), "/health/ready").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(cache.as_deref(), Some("no-store"));
    }

    #[rstest]
    #[actix_web::test]
    async fn in_memory_store_is_ready_after_startup() {
        let health = HealthState::new();
        health.mark_ready();

        let (status, _) = probe(health, "/health/ready").await;

        assert_eq!(status, StatusCode::OK);
    }

    #[rstest]
    #[case(false, StatusCode::OK)]
    #[case(true, StatusCode::SERVICE_UNAVAILABLE)]
    #[actix_web::test]
    async fn liveness_tracks_draining(#[case] draining: bool, #[case] expected: StatusCode) {
        let health = HealthState::new();
        if draining {
            health.mark_unhealthy();
        }

        let (status, cache) = probe(health, "/health/live").await;

        assert_eq!(status, expected);
        assert_eq!(cache.as_deref(), Some("no-store"));
    }

    #[rstest]
    #[actix_web::test]
    async fn readiness_without_http_state_skips_the_database() {
        let health = HealthState::new();
        health.mark_ready();
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(health)).service(ready),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
