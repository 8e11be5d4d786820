//! State error types.
//!
//! Validation failures are not errors here: they are recorded on the wizard
//! as field messages. These types cover misuse of a store and failed
//! mutations.

use thiserror::Error;

use clinic_model::{FeatureArea, Role};
use clinic_transport::TransportError;

use crate::entries::EntryId;

/// Entry list operation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// The id was never issued or the entry was already removed.
    #[error("No entry with id {0}")]
    NotFound(EntryId),
}

/// Wizard operation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// The wizard already reached its completed state.
    #[error("The wizard is already completed")]
    Completed,

    /// A save is in flight; the form is locked until it finishes.
    #[error("A save is already in progress")]
    SaveInFlight,

    /// A save result arrived for a save that is no longer current.
    #[error("Save ticket {0} is no longer current")]
    StaleTicket(u64),
}

/// Mutation error as seen by a dialog store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Nobody is signed in.
    #[error("Not signed in")]
    NotSignedIn,

    /// The signed-in role may not write to this feature area.
    #[error("{role} users cannot manage {area} records")]
    Forbidden { role: Role, area: FeatureArea },

    /// The transport rejected the request.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ServiceError {
    /// Conflicts leave the dialog open so the user can fix the values.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_conflict())
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotSignedIn => "Your session has ended. Please sign in again.".to_string(),
            Self::Forbidden { role, area } => {
                format!("Your role ({role}) does not allow changes to {area} records.")
            }
            Self::Transport(err) => err.user_message(),
        }
    }
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;
