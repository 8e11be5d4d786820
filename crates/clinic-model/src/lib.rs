//! Data model for the clinic core.
//!
//! Records coming back from the transport are schema-less; everything the core
//! reasons about directly (reference entities, identity, intake form fields)
//! is strongly typed here.
//!
//! # Architecture
//!
//! - `record.rs` - Schema-less records keyed by field name
//! - `reference.rs` - Entity descriptors and reference options
//! - `identity.rs` - Session, current user and roles
//! - `feature.rs` - Feature areas and their transport entity names
//! - `clinical.rs` - Diagnoses, treatments, medications, vital signs
//! - `intake.rs` - The typed patient intake form
//! - `field.rs` - Field paths, values and rendering descriptors
//! - `error.rs` - Error types

mod clinical;
mod error;
mod feature;
mod field;
mod identity;
mod intake;
mod record;
mod reference;

pub use clinical::{Diagnosis, Medication, Treatment, VitalSigns};
pub use error::{ModelError, Result};
pub use feature::FeatureArea;
pub use field::{ControlKind, ExtendedProps, FieldAccess, FieldDescriptor, FieldPath, FieldValue};
pub use identity::{CurrentUser, Role, Session};
pub use intake::{FamilyHistory, PatientIntake, PersonalHistory, PersonalInfo};
pub use record::{NEW_RECORD_ID, Record, RecordId};
pub use reference::{EntityDescriptor, ReferenceOption, TIMEFRAME_CODE};
