//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejected input becomes an `invalid_request` error whose details name
//! the offending field and a stable machine-readable code.

use serde_json::json;

use crate::domain::{
    Error, LoginValidationError, RegistrationValidationError, TicketValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    InvalidValue,
}

impl ValidationCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for request field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const TICKET_TYPE: FieldName = FieldName::new("ticket_type");
pub(crate) const TICKET_NUMBER: FieldName = FieldName::new("ticket_number");
pub(crate) const TELLER_ID: FieldName = FieldName::new("teller_id");
pub(crate) const DATE: FieldName = FieldName::new("date");
pub(crate) const STATUS: FieldName = FieldName::new("status");

pub(crate) fn field_error(field: FieldName, code: ValidationCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

/// Return the trimmed value of a required string field.
pub(crate) fn require_field(
    value: Option<String>,
    field: FieldName,
    message: &str,
) -> Result<String, Error> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
        .ok_or_else(|| field_error(field, ValidationCode::MissingField, message))
}

/// Map a ticket input failure onto the field that caused it.
pub(crate) fn ticket_input_error(err: &TicketValidationError) -> Error {
    let (field, code) = match err {
        TicketValidationError::EmptyTicketType => (TICKET_TYPE, ValidationCode::MissingField),
        TicketValidationError::UnknownTicketType { .. } => {
            (TICKET_TYPE, ValidationCode::InvalidValue)
        }
        TicketValidationError::EmptyTicketNumber => (TICKET_NUMBER, ValidationCode::MissingField),
        TicketValidationError::InvalidTicketId => {
            (FieldName::new("ticket_id"), ValidationCode::InvalidValue)
        }
        TicketValidationError::UnknownStatusFilter { .. } => (STATUS, ValidationCode::InvalidValue),
        TicketValidationError::InvalidDate { .. } => (DATE, ValidationCode::InvalidValue),
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn login_input_error(err: &LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyUsername => FieldName::new("username"),
        LoginValidationError::EmptyPassword => FieldName::new("password"),
    };
    field_error(field, ValidationCode::MissingField, err.to_string())
}

pub(crate) fn registration_input_error(err: &RegistrationValidationError) -> Error {
    let code = match err {
        RegistrationValidationError::EmptyPassword => ValidationCode::MissingField,
        RegistrationValidationError::Field { .. } => ValidationCode::InvalidValue,
    };
    field_error(FieldName::new(err.field()), code, err.to_string())
}
