//! Typed decoding of schema-less records.

use serde::Serialize;
use serde::de::DeserializeOwned;

use clinic_model::Record;

use crate::error::{Result, TransportError};

/// Decode every record of a collection into `T`.
///
/// Fails on the first record that does not match.
pub fn decode_records<T: DeserializeOwned>(entity: &str, records: Vec<Record>) -> Result<Vec<T>> {
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record.into_value()).map_err(|source| TransportError::Decode {
                entity: entity.to_string(),
                reason: source.to_string(),
            })
        })
        .collect()
}

/// Encode a typed value as a record payload.
pub fn encode_record<T: Serialize>(entity: &str, value: &T) -> Result<Record> {
    let value = serde_json::to_value(value).map_err(|source| TransportError::Decode {
        entity: entity.to_string(),
        reason: source.to_string(),
    })?;
    Record::try_from(value).map_err(|source| TransportError::Decode {
        entity: entity.to_string(),
        reason: source.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_model::{EntityDescriptor, Medication};
    use serde_json::json;

    #[test]
    fn decodes_entity_descriptors() {
        let records = vec![
            Record::try_from(json!({
                "id": 1, "code": "gender", "name": "Gender", "fieldProp": "genderId"
            }))
            .unwrap(),
        ];
        let entities: Vec<EntityDescriptor> = decode_records("entities", records).unwrap();
        assert_eq!(entities[0].field_prop, "genderId");
    }

    #[test]
    fn decode_failure_names_the_entity() {
        let records = vec![Record::try_from(json!({ "id": "x" })).unwrap()];
        let err = decode_records::<EntityDescriptor>("entities", records).unwrap_err();
        assert!(matches!(err, TransportError::Decode { ref entity, .. } if entity == "entities"));
    }

    #[test]
    fn encodes_typed_values() {
        let record = encode_record("medications", &Medication::new("Metformin")).unwrap();
        assert_eq!(record.get("name"), Some(&json!("Metformin")));
        assert!(encode_record("numbers", &5).is_err());
    }
}
