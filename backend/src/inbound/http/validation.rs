//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request DTOs carry raw strings; these helpers turn them into domain values
//! and attach `{field, code}` details to the resulting `invalid_request`
//! errors so clients can highlight the offending input.

use std::fmt::Display;
use std::str::FromStr;

use serde_json::json;

use crate::domain::{Error, PasswordPolicyError, TicketId, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
    WeakPassword,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::WeakPassword => "weak_password",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_ticket_id(value: &str, field: FieldName) -> Result<TicketId, Error> {
    TicketId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Report a domain constructor failure against `field`.
pub(crate) fn invalid_field(field: FieldName, error: impl Display) -> Error {
    ValidationError::new(field.as_str(), error.to_string()).with_code(ErrorCode::InvalidValue)
}

/// Build a domain value, attributing any failure to `field`.
pub(crate) fn field<T, E: Display>(field: FieldName, result: Result<T, E>) -> Result<T, Error> {
    result.map_err(|error| invalid_field(field, error))
}

/// Parse a closed-set wire name such as a status or department code.
pub(crate) fn parse_code<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|error: T::Err| {
        ValidationError::new(field.as_str(), error.to_string())
            .with_value(ErrorCode::InvalidValue, value)
    })
}

pub(crate) fn weak_password_error(field: FieldName, error: &PasswordPolicyError) -> Error {
    ValidationError::new(field.as_str(), error.to_string()).with_code(ErrorCode::WeakPassword)
}
