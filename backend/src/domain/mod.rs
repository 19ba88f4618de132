//! Domain primitives, ports and services for the branch queue.
//!
//! Purpose: define strongly typed tickets, tellers and accounts, the pure
//! ticket state machine, and the services that drive repositories through
//! ports. Nothing here depends on HTTP or a specific database.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Ticket, Teller, User and their identifiers.
//! - TicketLifecycleService, TellerDirectoryService, UserAccountService.

pub mod auth;
pub mod error;
pub mod ports;
pub mod teller;
pub mod teller_directory_service;
pub mod teller_selection;
pub mod ticket;
pub mod ticket_lifecycle_service;
pub mod ticket_transitions;
pub mod trace_id;
pub mod user;
pub mod user_account_service;

pub use self::auth::{
    AuthenticatedSession, LoginCredentials, LoginValidationError, Registration,
    RegistrationValidationError, TokenKind, TokenPair,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::teller::{DEFAULT_TELLER_NAMES, Teller, TellerId, TellerValidationError};
pub use self::teller_directory_service::TellerDirectoryService;
pub use self::teller_selection::{
    AssignmentPolicy, LeastRecentlyAssignedSelection, RandomTellerSelection,
    TellerSelectionPolicy, UnknownAssignmentPolicy,
};
pub use self::ticket::{
    TICKET_VALIDITY, Ticket, TicketId, TicketListRequest, TicketNumber, TicketStage,
    TicketStatus, TicketType, TicketValidationError, TicketWindow,
};
pub use self::ticket_lifecycle_service::{QueueRepositories, TicketLifecycleService};
pub use self::trace_id::TraceId;
pub use self::user::{
    EmailAddress, PasswordDigest, User, UserAccount, UserId, UserValidationError, Username,
};
pub use self::user_account_service::UserAccountService;

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use bqms::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("Ticket not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
