//! UI-facing state for the clinic core.
//!
//! Stores here are plain values mutated synchronously on one logical thread.
//! Asynchronous work (mutations through the transport) produces outcomes that
//! are applied back through the store that started them.
//!
//! # Architecture
//!
//! - `dialog.rs` - Per-feature dialog stores and the store registry
//! - `entries.rs` - Entry lists with stable ids, the checkup form
//! - `wizard.rs` - Generic stepwise wizard controller
//! - `intake.rs` - Patient intake steps, validation and review
//! - `service.rs` - Mutations on behalf of the signed-in user
//! - `error.rs` - Error types

mod dialog;
mod entries;
mod error;
mod intake;
mod service;
mod wizard;

pub use dialog::{
    CompletionEffect, DialogAction, DialogFormState, DialogStore, DialogTitle, FeatureStores,
    Notification, NotificationLevel, RequestTicket,
};
pub use entries::{CheckupForm, Entry, EntryId, EntryList};
pub use error::{EntryError, Result, ServiceError, WizardError};
pub use intake::{
    CIVIL_STATUS_ENTITY, GENDER_ENTITY, ILLNESS_ENTITY, IntakeForm, IntakeStep, OTHERS_MAX_LENGTH,
    ReviewRow, ReviewSection, ReviewSummary,
};
pub use service::{
    CREATED_BY, MutationKind, MutationOutcome, MutationRequest, MutationService, MutationSuccess,
    UPDATED_BY,
};
pub use wizard::{FieldErrors, SaveRequest, SaveTicket, StepOutcome, Wizard, WizardForm};
