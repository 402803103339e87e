use crate::config::RedisConfig;
use async_trait::async_trait;
use dashmap::DashMap;
use redis::AsyncCommands;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[from] redis::RedisError),
    #[error("stored document is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Document store keyed by (collection, document id).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;
    /// Removing a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    documents: Arc<DashMap<(String, String), Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let key = (collection.to_string(), id.to_string());
        Ok(self.documents.get(&key).map(|doc| doc.value().clone()))
    }

    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        self.documents
            .insert((collection.to_string(), id.to_string()), document);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.documents
            .remove(&(collection.to_string(), id.to_string()));
        Ok(())
    }
}

/// Stores each document as a JSON string under `{prefix}:{collection}:{id}`.
pub struct RedisStore {
    client: redis::Client,
    key_prefix: String,
    ttl_seconds: u64,
}

impl RedisStore {
    pub fn new(config: &RedisConfig) -> anyhow::Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        Ok(Self {
            client,
            key_prefix: config.key_prefix.clone(),
            ttl_seconds: config.ttl_seconds,
        })
    }

    fn key(&self, collection: &str, id: &str) -> String {
        if self.key_prefix.is_empty() {
            format!("{}:{}", collection, id)
        } else {
            format!("{}:{}:{}", self.key_prefix, collection, id)
        }
    }
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = self.key(collection, id);

        let raw: Option<String> = conn.get(&key).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => {
                debug!("No document at {}", key);
                Ok(None)
            }
        }
    }

    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = self.key(collection, id);
        let json = serde_json::to_string(&document)?;

        if self.ttl_seconds > 0 {
            let _: () = conn.set_ex(&key, json, self.ttl_seconds).await?;
        } else {
            let _: () = conn.set(&key, json).await?;
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = self.key(collection, id);

        let removed: usize = conn.del(&key).await?;
        debug!("Deleted {} document(s) at {}", removed, key);
        Ok(())
    }
}
