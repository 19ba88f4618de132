//! Bank queue management backend.
//!
//! Customers take numbered tickets, tellers serve and complete them, and
//! staff list the day's queue. The crate is split hexagonally: [`domain`]
//! holds types, ports and services, [`inbound`] exposes them over HTTP and
//! [`outbound`] implements the ports against memory or PostgreSQL.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
