//! Query cache in front of a transport.
//!
//! Reads are served from the cache once fetched. A successful write
//! invalidates the written entity's collection and the touched record, so the
//! next read refetches. Failed writes leave the cache untouched.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use clinic_model::{Record, RecordId};

use crate::error::Result;
use crate::response::ApiResponse;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    List(String),
    Record(String, RecordId),
}

impl CacheKey {
    fn entity(&self) -> &str {
        match self {
            Self::List(entity) | Self::Record(entity, _) => entity,
        }
    }
}

#[derive(Debug, Clone)]
enum Cached {
    List(ApiResponse<Vec<Record>>),
    Record(ApiResponse<Record>),
}

#[derive(Debug)]
pub struct CachingClient<T> {
    inner: T,
    entries: RwLock<HashMap<CacheKey, Cached>>,
}

impl<T: Transport> CachingClient<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Drop every cached entry for `entity`.
    pub async fn invalidate(&self, entity: &str) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| key.entity() != entity);
        info!(entity, dropped = before - entries.len(), "invalidated query cache");
    }

    async fn invalidate_record(&self, entity: &str, id: RecordId) {
        let mut entries = self.entries.write().await;
        entries.remove(&CacheKey::List(entity.to_string()));
        entries.remove(&CacheKey::Record(entity.to_string(), id));
        info!(entity, id, "invalidated list and record cache");
    }
}

impl<T: Transport> Transport for CachingClient<T> {
    async fn list(&self, entity: &str) -> Result<ApiResponse<Vec<Record>>> {
        let key = CacheKey::List(entity.to_string());
        if let Some(Cached::List(response)) = self.entries.read().await.get(&key) {
            debug!(entity, "query cache hit");
            return Ok(response.clone());
        }
        debug!(entity, "query cache miss");
        let response = self.inner.list(entity).await?;
        self.entries
            .write()
            .await
            .insert(key, Cached::List(response.clone()));
        Ok(response)
    }

    async fn record(&self, entity: &str, id: RecordId) -> Result<ApiResponse<Record>> {
        let key = CacheKey::Record(entity.to_string(), id);
        if let Some(Cached::Record(response)) = self.entries.read().await.get(&key) {
            debug!(entity, id, "query cache hit");
            return Ok(response.clone());
        }
        debug!(entity, id, "query cache miss");
        let response = self.inner.record(entity, id).await?;
        self.entries
            .write()
            .await
            .insert(key, Cached::Record(response.clone()));
        Ok(response)
    }

    async fn post(&self, entity: &str, record: Record) -> Result<ApiResponse<Record>> {
        let response = self.inner.post(entity, record).await?;
        if let Some(id) = response.data.id() {
            self.invalidate_record(entity, id).await;
        } else {
            self.invalidate(entity).await;
        }
        Ok(response)
    }

    async fn put(&self, entity: &str, id: RecordId, record: Record) -> Result<ApiResponse<Record>> {
        let response = self.inner.put(entity, id, record).await?;
        self.invalidate_record(entity, id).await;
        Ok(response)
    }

    async fn delete(&self, entity: &str, id: RecordId) -> Result<ApiResponse<RecordId>> {
        let response = self.inner.delete(entity, id).await?;
        self.invalidate_record(entity, id).await;
        Ok(response)
    }
}
