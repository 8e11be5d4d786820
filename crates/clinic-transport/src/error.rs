//! Transport error types.
//!
//! Every failure carries an HTTP-equivalent status so callers can choose
//! between "let the user retry" and "abandon the attempt".

use thiserror::Error;

use clinic_model::RecordId;

pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_UNPROCESSABLE: u16 = 422;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The remote side rejected the request.
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    /// A payload could not be decoded into the expected type.
    #[error("Failed to decode {entity} payload: {reason}")]
    Decode { entity: String, reason: String },
}

impl TransportError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: RecordId) -> Self {
        Self::status(STATUS_NOT_FOUND, format!("{entity} record {id} not found"))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::status(STATUS_CONFLICT, message)
    }

    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Status { status, .. } => *status,
            Self::Decode { .. } => STATUS_UNPROCESSABLE,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status_code() == STATUS_CONFLICT
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == STATUS_NOT_FOUND
    }

    /// Message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status, message } if *status == STATUS_CONFLICT => {
                format!("{message}. Please correct the highlighted values and try again.")
            }
            Self::Status { status, .. } if *status == STATUS_NOT_FOUND => {
                "The record no longer exists. It may have been deleted by someone else.".to_string()
            }
            Self::Status { message, .. } => {
                format!("The server could not complete the request: {message}")
            }
            Self::Decode { entity, .. } => {
                format!("The server returned unexpected {entity} data.")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(TransportError::conflict("Email already exists").is_conflict());
        assert!(TransportError::not_found("patients", 4).is_not_found());
        let decode = TransportError::Decode {
            entity: "entities".into(),
            reason: "missing field".into(),
        };
        assert_eq!(decode.status_code(), STATUS_UNPROCESSABLE);
        assert!(!decode.is_conflict());
    }

    #[test]
    fn conflict_message_invites_retry() {
        let message = TransportError::conflict("Email already exists").user_message();
        assert!(message.starts_with("Email already exists."));
    }
}
