use std::fmt;

use serde::{Deserialize, Serialize};

use clinic_model::RecordId;

/// Successful response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub message: String,
    pub status: u16,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            status: 200,
        }
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            status: 201,
        }
    }
}

/// Operations a transport understands, keyed together with an entity name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Record(RecordId),
    Post,
    Put(RecordId),
    Delete(RecordId),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Record(id) => write!(f, "record({id})"),
            Self::Post => f.write_str("post"),
            Self::Put(id) => write!(f, "put({id})"),
            Self::Delete(id) => write!(f, "delete({id})"),
        }
    }
}
