//! Outbound adapters implementing the domain's driven ports.
//!
//! - **memory**: a process-local store used without a database and in tests
//! - **persistence**: PostgreSQL repositories built on Diesel
//! - **security**: Argon2 password hashing and JWT signing
//!
//! Adapters translate between domain types and infrastructure representations
//! and leave every business rule to the domain.

pub mod memory;
pub mod persistence;
pub mod security;
