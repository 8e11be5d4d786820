use thiserror::Error;

use crate::field::FieldPath;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown field path: {0}")]
    UnknownFieldPath(String),
    #[error("field {path} expects a {expected} value, got {found}")]
    ValueKind {
        path: FieldPath,
        expected: &'static str,
        found: &'static str,
    },
    #[error("record must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

pub type Result<T> = std::result::Result<T, ModelError>;
