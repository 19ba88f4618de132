//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hasher, token signer) are implemented by
//! outbound adapters. Driving ports (commands and queries) are implemented
//! by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod credential_hasher;
mod daily_counter_repository;
mod teller_directory;
mod teller_repository;
mod ticket_assignment_repository;
mod ticket_command;
mod ticket_query;
mod ticket_repository;
mod token_service;
mod user_repository;

pub use account_service::AccountService;
#[cfg(test)]
pub use account_service::MockAccountService;
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
#[cfg(test)]
pub use daily_counter_repository::MockDailyCounterRepository;
pub use daily_counter_repository::{DailyCounterRepository, DailyCounterRepositoryError};
#[cfg(test)]
pub use teller_directory::MockTellerDirectory;
pub use teller_directory::TellerDirectory;
#[cfg(test)]
pub use teller_repository::MockTellerRepository;
pub use teller_repository::{TellerRepository, TellerRepositoryError};
pub use ticket_assignment_repository::{
    Assignment, AssignmentRepositoryError, AutoAssignOutcome, CancelOutcome,
    TicketAssignmentRepository,
};
#[cfg(test)]
pub use ticket_command::MockTicketCommand;
pub use ticket_command::{AutoAssignResult, TicketCommand};
#[cfg(test)]
pub use ticket_query::MockTicketQuery;
pub use ticket_query::{TicketDetails, TicketListing, TicketQuery};
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
pub use ticket_repository::{TicketRepository, TicketRepositoryError};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenService, TokenServiceError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
