//! Dependent reference resolution.
//!
//! Dropdowns and checkbox groups are described by an entity id. The resolver
//! looks the entity up in a [`ReferenceCatalog`], reads the current selection
//! from its [`Binding`] and produces a [`Resolution`]. User interactions flow
//! back through [`ResolvedControl::apply`].
//!
//! # Architecture
//!
//! - `catalog.rs` - Loaded entity descriptors and options, fetching
//! - `resolve.rs` - Binding, resolution and control models
//! - `change.rs` - Change events written back to filter state or form
//! - `error.rs` - Error types

mod catalog;
mod change;
mod error;
mod resolve;

pub use catalog::{ENTITIES, Loadable, REFERENCES, ReferenceCatalog, fetch_catalog};
pub use change::{ChangeEvent, ChangeSink};
pub use error::{ReferenceError, Result};
pub use resolve::{
    Binding, CheckItem, ControlModel, CustomControl, CustomMenuItem, OptionValue, Resolution,
    ResolveMode, ResolvedControl, Resolver, SelectItem,
};
