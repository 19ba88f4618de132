//! HTTP inbound adapter exposing the queue REST endpoints.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod health;
pub mod state;
pub mod tellers;
#[cfg(test)]
pub mod test_utils;
pub mod tickets;
pub mod tickets_dto;
pub mod validation;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

/// Report unreadable JSON bodies in the shared error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| Error::invalid_request(format!("Invalid JSON body: {err}")).into())
}

/// Report unparseable query strings in the shared error envelope.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("Invalid query string: {err}")).into()
    })
}

/// Register every `/api` handler; mount inside `web::scope("/api")`.
///
/// # Examples
/// ```no_run
/// use actix_web::{App, web};
/// use bqms::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(accounts::register)
        .service(accounts::login)
        .service(accounts::refresh)
        .service(tickets::create_ticket)
        .service(tickets::cancel_ticket)
        .service(tickets::validate_ticket)
        .service(tickets::list_tickets)
        .service(tickets::serve_ticket)
        .service(tickets::complete_ticket)
        .service(tickets::auto_assign_ticket)
        .service(tellers::list_tellers);
}
