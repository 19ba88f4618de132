//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories here implement the queue ports on top of `diesel-async` with
//! a `bb8` pool. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay private to this module; callers only see domain types.
//!
//! # Example
//!
//! ```ignore
//! use bqms::outbound::persistence::{DbPool, DieselTicketRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/bqms")).await?;
//! let tickets = DieselTicketRepository::new(pool);
//! ```

mod diesel_daily_counter_repository;
mod diesel_error_mapping;
mod diesel_teller_repository;
mod diesel_ticket_assignment_repository;
mod diesel_ticket_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_daily_counter_repository::DieselDailyCounterRepository;
pub use diesel_teller_repository::DieselTellerRepository;
pub use diesel_ticket_assignment_repository::DieselTicketAssignmentRepository;
pub use diesel_ticket_repository::DieselTicketRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
