//! Reference data: entity descriptors and their selectable options.

use serde::{Deserialize, Serialize};

use crate::record::RecordId;

/// Entity code whose options are keyed by `code` instead of numeric id.
pub const TIMEFRAME_CODE: &str = "timeframe";

/// Metadata describing one dropdown or checkbox-group field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDescriptor {
    pub id: RecordId,
    pub code: String,
    pub name: String,
    /// Form or filter field this entity controls.
    pub field_prop: String,
    #[serde(default)]
    pub parent_id: Option<RecordId>,
}

impl EntityDescriptor {
    /// Date/time-bucket selectors bind by option code.
    pub fn is_timeframe(&self) -> bool {
        self.code == TIMEFRAME_CODE
    }
}

/// One selectable value belonging to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceOption {
    pub id: RecordId,
    pub entity_id: RecordId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "visible_by_default")]
    pub is_show: bool,
}

fn visible_by_default() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_defaults_when_flags_missing() {
        let option: ReferenceOption =
            serde_json::from_str(r#"{"id":4,"entityId":1,"code":"F","name":"Female"}"#)
                .expect("deserialize option");
        assert!(option.is_show);
        assert!(!option.is_default);
    }

    #[test]
    fn descriptor_reads_camel_case() {
        let entity: EntityDescriptor = serde_json::from_str(
            r#"{"id":9,"code":"timeframe","name":"Timeframe","fieldProp":"timeframe","parentId":null}"#,
        )
        .expect("deserialize entity");
        assert!(entity.is_timeframe());
        assert_eq!(entity.field_prop, "timeframe");
        assert_eq!(entity.parent_id, None);
    }
}
