//! Auxiliary entry lists owned by a form.
//!
//! Entries get a stable id when added. Edits and removals address that id,
//! so reordering or removing other entries never retargets an open edit.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use clinic_model::{Diagnosis, Record, RecordId, Treatment, VitalSigns};
use clinic_transport::encode_record;

use crate::error::EntryError;

/// Stable id of an entry within one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry<T> {
    pub id: EntryId,
    pub data: T,
}

/// Ordered list of entries with stable ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryList<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for EntryList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> EntryList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its id.
    pub fn add(&mut self, data: T) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, data });
        id
    }

    /// Replace the data of one entry in place.
    pub fn edit(&mut self, id: EntryId, data: T) -> Result<(), EntryError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(EntryError::NotFound(id))?;
        entry.data = data;
        Ok(())
    }

    /// Remove one entry, returning its data.
    pub fn remove(&mut self, id: EntryId) -> Result<T, EntryError> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(EntryError::NotFound(id))?;
        Ok(self.entries.remove(index).data)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace every entry; the new entries get fresh ids.
    pub fn replace_all(&mut self, data: impl IntoIterator<Item = T>) {
        self.entries.clear();
        for item in data {
            self.add(item);
        }
    }

    pub fn get(&self, id: EntryId) -> Option<&T> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.data)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|entry| &entry.data)
    }

    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lists and vitals captured by the checkup dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckupForm {
    pub diagnoses: EntryList<Diagnosis>,
    pub treatments: EntryList<Treatment>,
    pub vitals: VitalSigns,
}

impl CheckupForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every list and the vitals.
    pub fn clear(&mut self) {
        self.diagnoses.clear();
        self.treatments.clear();
        self.vitals = VitalSigns::default();
    }

    /// Payload for the checkup collection.
    pub fn to_payload(&self, patient_id: RecordId) -> clinic_transport::Result<Record> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload<'a> {
            patient_id: RecordId,
            diagnoses: Vec<&'a Diagnosis>,
            treatments: Vec<&'a Treatment>,
            vital_signs: &'a VitalSigns,
            bmi: Value,
        }

        let payload = Payload {
            patient_id,
            diagnoses: self.diagnoses.values().collect(),
            treatments: self.treatments.values().collect(),
            vital_signs: &self.vitals,
            bmi: self.vitals.bmi().map_or(Value::Null, Value::from),
        };
        encode_record("checkups", &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnosis(description: &str) -> Diagnosis {
        Diagnosis {
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn ids_stay_stable_after_removal() {
        let mut list = EntryList::new();
        let first = list.add(diagnosis("Flu"));
        let second = list.add(diagnosis("Cough"));
        let third = list.add(diagnosis("Fever"));

        list.remove(first).unwrap();
        list.edit(third, diagnosis("High fever")).unwrap();

        assert_eq!(list.get(second).map(|d| d.description.as_str()), Some("Cough"));
        assert_eq!(list.get(third).map(|d| d.description.as_str()), Some("High fever"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut list = EntryList::new();
        let first = list.add(1);
        list.remove(first).unwrap();
        let second = list.add(2);
        assert_ne!(first, second);
        assert_eq!(list.edit(first, 3), Err(EntryError::NotFound(first)));
        assert_eq!(list.remove(first), Err(EntryError::NotFound(first)));
    }

    #[test]
    fn replace_all_issues_fresh_ids() {
        let mut list = EntryList::new();
        let old = list.add("a");
        list.replace_all(["b", "c"]);
        assert_eq!(list.values().copied().collect::<Vec<_>>(), vec!["b", "c"]);
        assert!(list.get(old).is_none());
    }

    #[test]
    fn checkup_payload_carries_lists_and_bmi() {
        let mut form = CheckupForm::new();
        form.diagnoses.add(diagnosis("Hypertension"));
        form.vitals.height_cm = Some(180.0);
        form.vitals.weight_kg = Some(81.0);
        let record = form.to_payload(7).unwrap();
        assert_eq!(record.get("patientId"), Some(&Value::from(7)));
        assert_eq!(record.get("bmi"), Some(&Value::from(25.0)));
        let diagnoses = record.get("diagnoses").and_then(Value::as_array);
        assert_eq!(diagnoses.map(Vec::len), Some(1));

        form.clear();
        assert!(form.diagnoses.is_empty());
        assert_eq!(form.vitals, VitalSigns::default());
    }
}
