//! In-memory transport backend.
//!
//! Mirrors the store's observable behavior: ids are assigned on create,
//! unique fields reject duplicates with a conflict, and unknown ids are
//! not-found.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use clinic_model::{Record, RecordId};

use crate::error::{Result, TransportError};
use crate::response::{ApiResponse, Operation};
use crate::transport::Transport;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<RecordId, Record>,
    next_id: RecordId,
}

impl Table {
    fn allocate_id(&mut self) -> RecordId {
        let highest = self.rows.keys().next_back().copied().unwrap_or(0);
        self.next_id = self.next_id.max(highest) + 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTransport {
    tables: RwLock<HashMap<String, Table>>,
    unique_fields: HashMap<String, Vec<String>>,
    requests: AtomicUsize,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare fields of `entity` whose non-empty values must be unique.
    #[must_use]
    pub fn with_unique(mut self, entity: &str, fields: &[&str]) -> Self {
        self.unique_fields.insert(
            entity.to_string(),
            fields.iter().map(|field| (*field).to_string()).collect(),
        );
        self
    }

    /// Preload records; records without an id get one assigned.
    #[must_use]
    pub fn with_records(mut self, entity: &str, records: impl IntoIterator<Item = Record>) -> Self {
        let table = self.tables.get_mut().entry(entity.to_string()).or_default();
        for mut record in records {
            let id = match record.id() {
                Some(id) => id,
                None => {
                    let id = table.allocate_id();
                    record.insert("id", id);
                    id
                }
            };
            table.rows.insert(id, record);
        }
        self
    }

    /// Number of requests served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    fn track(&self, entity: &str, operation: Operation) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        debug!(entity, %operation, "in-memory transport request");
    }

    fn check_unique(
        &self,
        entity: &str,
        table: &Table,
        record: &Record,
        own_id: Option<RecordId>,
    ) -> Result<()> {
        let Some(fields) = self.unique_fields.get(entity) else {
            return Ok(());
        };
        for field in fields {
            let Some(value) = record.get(field).filter(|value| !is_blank(value)) else {
                continue;
            };
            let duplicate = table
                .rows
                .iter()
                .any(|(id, other)| Some(*id) != own_id && other.get(field) == Some(value));
            if duplicate {
                return Err(TransportError::conflict(format!("{field} already exists")));
            }
        }
        Ok(())
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

impl Transport for InMemoryTransport {
    async fn list(&self, entity: &str) -> Result<ApiResponse<Vec<Record>>> {
        self.track(entity, Operation::List);
        let tables = self.tables.read().await;
        let rows = tables
            .get(entity)
            .map(|table| table.rows.values().cloned().collect())
            .unwrap_or_default();
        Ok(ApiResponse::ok(rows, "Fetched successfully"))
    }

    async fn record(&self, entity: &str, id: RecordId) -> Result<ApiResponse<Record>> {
        self.track(entity, Operation::Record(id));
        let tables = self.tables.read().await;
        tables
            .get(entity)
            .and_then(|table| table.rows.get(&id))
            .cloned()
            .map(|record| ApiResponse::ok(record, "Fetched successfully"))
            .ok_or_else(|| TransportError::not_found(entity, id))
    }

    async fn post(&self, entity: &str, mut record: Record) -> Result<ApiResponse<Record>> {
        self.track(entity, Operation::Post);
        let mut tables = self.tables.write().await;
        let table = tables.entry(entity.to_string()).or_default();
        self.check_unique(entity, table, &record, None)?;
        let id = table.allocate_id();
        record.insert("id", id);
        table.rows.insert(id, record.clone());
        Ok(ApiResponse::created(record, "Created successfully"))
    }

    async fn put(
        &self,
        entity: &str,
        id: RecordId,
        mut record: Record,
    ) -> Result<ApiResponse<Record>> {
        self.track(entity, Operation::Put(id));
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(entity)
            .filter(|table| table.rows.contains_key(&id))
            .ok_or_else(|| TransportError::not_found(entity, id))?;
        self.check_unique(entity, table, &record, Some(id))?;
        record.insert("id", id);
        table.rows.insert(id, record.clone());
        Ok(ApiResponse::ok(record, "Updated successfully"))
    }

    async fn delete(&self, entity: &str, id: RecordId) -> Result<ApiResponse<RecordId>> {
        self.track(entity, Operation::Delete(id));
        let mut tables = self.tables.write().await;
        tables
            .get_mut(entity)
            .and_then(|table| table.rows.remove(&id))
            .map(|_| ApiResponse::ok(id, "Deleted successfully"))
            .ok_or_else(|| TransportError::not_found(entity, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(email: &str) -> Record {
        Record::new().with("email", email)
    }

    #[tokio::test]
    async fn post_assigns_increasing_ids() {
        let transport = InMemoryTransport::new();
        let first = transport.post("users", user("a@clinic.test")).await.unwrap();
        let second = transport.post("users", user("b@clinic.test")).await.unwrap();
        assert_eq!(first.status, 201);
        assert_eq!(first.data.id(), Some(1));
        assert_eq!(second.data.id(), Some(2));
    }

    #[tokio::test]
    async fn ids_continue_after_seeded_records() {
        let transport = InMemoryTransport::new()
            .with_records("users", [user("a@clinic.test").with("id", 10)]);
        let created = transport.post("users", user("b@clinic.test")).await.unwrap();
        assert_eq!(created.data.id(), Some(11));
    }

    #[tokio::test]
    async fn unique_fields_conflict() {
        let transport = InMemoryTransport::new().with_unique("users", &["email"]);
        transport.post("users", user("a@clinic.test")).await.unwrap();
        let err = transport.post("users", user("a@clinic.test")).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn put_may_keep_its_own_unique_value() {
        let transport = InMemoryTransport::new().with_unique("users", &["email"]);
        let created = transport.post("users", user("a@clinic.test")).await.unwrap();
        let id = created.data.id().unwrap();
        let updated = transport
            .put("users", id, user("a@clinic.test").with("name", "Ann"))
            .await
            .unwrap();
        assert_eq!(updated.data.get("name"), Some(&json!("Ann")));
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let transport = InMemoryTransport::new();
        assert!(transport.record("users", 3).await.unwrap_err().is_not_found());
        assert!(transport.put("users", 3, user("x")).await.unwrap_err().is_not_found());
        assert!(transport.delete("users", 3).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn unknown_collection_lists_empty() {
        let transport = InMemoryTransport::new();
        let response = transport.list("checkups").await.unwrap();
        assert!(response.data.is_empty());
        assert_eq!(transport.request_count(), 1);
    }
}
