//! The two independently loaded reference collections.

use tracing::{debug, warn};

use clinic_model::{EntityDescriptor, RecordId, ReferenceOption};
use clinic_transport::{Transport, decode_records};

/// Transport entity holding entity descriptors.
pub const ENTITIES: &str = "entities";
/// Transport entity holding reference options.
pub const REFERENCES: &str = "references";

/// Load state of one fetched collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Loadable<T> {
    #[default]
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Entity descriptors and reference options as seen by the resolver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceCatalog {
    pub entities: Loadable<Vec<EntityDescriptor>>,
    pub options: Loadable<Vec<ReferenceOption>>,
}

impl ReferenceCatalog {
    /// Both collections still loading.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog with both collections already loaded.
    pub fn ready(entities: Vec<EntityDescriptor>, options: Vec<ReferenceOption>) -> Self {
        Self {
            entities: Loadable::Ready(entities),
            options: Loadable::Ready(options),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.entities.is_ready() && self.options.is_ready()
    }

    /// First descriptor with a matching id; later duplicates are ignored.
    pub fn find_entity(&self, entity_id: RecordId) -> Option<&EntityDescriptor> {
        self.entities
            .ready()?
            .iter()
            .find(|entity| entity.id == entity_id)
    }

    /// Visible options of one entity, in catalog order.
    pub fn options_for(&self, entity_id: RecordId) -> Vec<&ReferenceOption> {
        self.options
            .ready()
            .map(|options| {
                options
                    .iter()
                    .filter(|option| option.entity_id == entity_id && option.is_show)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Entities whose `parentId` points at `parent_id`.
    pub fn child_entities(&self, parent_id: RecordId) -> Vec<&EntityDescriptor> {
        self.entities
            .ready()
            .map(|entities| {
                entities
                    .iter()
                    .filter(|entity| entity.parent_id == Some(parent_id))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Fetch both collections concurrently.
///
/// Options are restricted to `entity_ids`; an empty slice keeps every option.
/// A failed fetch leaves that collection `Failed` instead of erroring, so the
/// resolver keeps rendering nothing for it.
pub async fn fetch_catalog<T: Transport>(
    transport: &T,
    entity_ids: &[RecordId],
) -> ReferenceCatalog {
    let (entities, options) = tokio::join!(transport.list(ENTITIES), transport.list(REFERENCES));

    let entities = entities
        .and_then(|response| decode_records::<EntityDescriptor>(ENTITIES, response.data));
    let entities = match entities {
        Ok(entities) => Loadable::Ready(entities),
        Err(err) => {
            warn!(error = %err, "failed to load entity descriptors");
            Loadable::Failed(err.user_message())
        }
    };

    let options = options
        .and_then(|response| decode_records::<ReferenceOption>(REFERENCES, response.data));
    let options = match options {
        Ok(options) => {
            let options: Vec<_> = options
                .into_iter()
                .filter(|option| entity_ids.is_empty() || entity_ids.contains(&option.entity_id))
                .collect();
            debug!(count = options.len(), "loaded reference options");
            Loadable::Ready(options)
        }
        Err(err) => {
            warn!(error = %err, "failed to load reference options");
            Loadable::Failed(err.user_message())
        }
    };

    ReferenceCatalog { entities, options }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: RecordId, code: &str, parent_id: Option<RecordId>) -> EntityDescriptor {
        EntityDescriptor {
            id,
            code: code.to_string(),
            name: code.to_uppercase(),
            field_prop: format!("{code}Id"),
            parent_id,
        }
    }

    fn option(id: RecordId, entity_id: RecordId, is_show: bool) -> ReferenceOption {
        ReferenceOption {
            id,
            entity_id,
            code: format!("opt{id}"),
            name: format!("Option {id}"),
            is_default: false,
            is_show,
        }
    }

    #[test]
    fn loading_catalog_finds_nothing() {
        let catalog = ReferenceCatalog::new();
        assert!(!catalog.is_ready());
        assert!(catalog.find_entity(1).is_none());
        assert!(catalog.options_for(1).is_empty());
    }

    #[test]
    fn hidden_options_are_skipped() {
        let catalog = ReferenceCatalog::ready(
            vec![entity(1, "gender", None)],
            vec![option(1, 1, true), option(2, 1, false), option(3, 2, true)],
        );
        let ids: Vec<_> = catalog.options_for(1).iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn children_follow_parent_id() {
        let catalog = ReferenceCatalog::ready(
            vec![
                entity(1, "province", None),
                entity(2, "city", Some(1)),
                entity(3, "barangay", Some(2)),
            ],
            Vec::new(),
        );
        let children: Vec<_> = catalog.child_entities(1).iter().map(|e| e.id).collect();
        assert_eq!(children, vec![2]);
    }
}
