//! Reference resolution error types.

use thiserror::Error;

use clinic_model::ModelError;

use crate::resolve::ResolveMode;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// A checkbox value that is not an integer option id.
    #[error("Invalid option id: {0:?}")]
    InvalidOptionId(String),

    /// The change event does not fit the control's binding.
    #[error("{event} events are not supported in {mode} mode")]
    UnsupportedEvent { mode: ResolveMode, event: &'static str },

    /// Writing the selection into the bound form failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, ReferenceError>;
