//! Persistence of visitor flow state between requests
//!
//! The whole [`CustomerFlowState`] is stored as one JSON blob and replaced
//! wholesale on every save.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    config::SessionConfig,
    error::{AppError, AppResult},
    models::flow::CustomerFlowState,
};

/// Storage backend for visitor sessions
#[async_trait]
pub trait FlowStateStore: Send + Sync {
    async fn load(&self, session_id: Uuid) -> AppResult<Option<CustomerFlowState>>;
    async fn save(&self, state: &CustomerFlowState) -> AppResult<()>;
    async fn delete(&self, session_id: Uuid) -> AppResult<()>;
    /// Backend health check
    async fn ping(&self) -> AppResult<()>;
}

pub type SharedFlowStore = Arc<dyn FlowStateStore>;

/// Redis-backed store, keys expire after the configured TTL
#[derive(Clone)]
pub struct RedisFlowStore {
    client: Client,
    key_prefix: String,
    ttl_seconds: u64,
}

impl RedisFlowStore {
    /// Create a new store and test the connection
    pub async fn new(url: &str, config: &SessionConfig) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let store = Self {
            client,
            key_prefix: config.key_prefix.clone(),
            ttl_seconds: config.ttl_seconds,
        };
        store.ping().await?;
        Ok(store)
    }

    fn key(&self, session_id: Uuid) -> String {
        format!("{}:{}", self.key_prefix, session_id)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl FlowStateStore for RedisFlowStore {
    async fn load(&self, session_id: Uuid) -> AppResult<Option<CustomerFlowState>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(self.key(session_id)).await?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &CustomerFlowState) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let json = serde_json::to_string(state)?;
        conn.set_ex::<_, _, ()>(self.key(state.session_id), json, self.ttl_seconds)
            .await?;
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(self.key(session_id)).await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}

/// Process-local store for tests and single-instance deployments.
///
/// Entries expire like Redis keys: each save restarts the TTL, an expired
/// entry loads as missing and is evicted on the next save.
pub struct MemoryFlowStore {
    // Serialized like the Redis backend so both round-trip identically
    sessions: RwLock<HashMap<Uuid, StoredSession>>,
    ttl: Duration,
}

struct StoredSession {
    json: String,
    expires_at: Instant,
}

impl MemoryFlowStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_seconds))
    }

    /// Number of held entries, expired ones included until evicted
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl FlowStateStore for MemoryFlowStore {
    async fn load(&self, session_id: Uuid) -> AppResult<Option<CustomerFlowState>> {
        let sessions = self.sessions.read().await;
        match sessions.get(&session_id) {
            Some(entry) if entry.expires_at > Instant::now() => {
                Ok(Some(serde_json::from_str(&entry.json)?))
            }
            _ => Ok(None),
        }
    }

    async fn save(&self, state: &CustomerFlowState) -> AppResult<()> {
        let json = serde_json::to_string(state)?;
        let now = Instant::now();

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| entry.expires_at > now);
        sessions.insert(
            state.session_id,
            StoredSession {
                json,
                expires_at: now + self.ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AppResult<()> {
        self.sessions.write().await.remove(&session_id);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::flow::FlowStep;

    #[test]
    fn test_memory_store_round_trip() {
        tokio_test::block_on(async {
            let store = MemoryFlowStore::new(Duration::from_secs(60));
            let mut state = CustomerFlowState::new(Uuid::new_v4(), Some(1));
            store.save(&state).await.unwrap();

            state.current_step = FlowStep::Identifying;
            state.presented_id = Some("abc".into());
            store.save(&state).await.unwrap();

            let loaded = store.load(state.session_id).await.unwrap().unwrap();
            assert_eq!(loaded, state);
            assert_eq!(store.len().await, 1);
        });
    }

    #[test]
    fn test_memory_store_missing_and_delete() {
        tokio_test::block_on(async {
            let store = MemoryFlowStore::new(Duration::from_secs(60));
            assert!(store.load(Uuid::new_v4()).await.unwrap().is_none());

            let state = CustomerFlowState::new(Uuid::new_v4(), None);
            store.save(&state).await.unwrap();
            store.delete(state.session_id).await.unwrap();
            assert!(store.load(state.session_id).await.unwrap().is_none());
        });
    }

    #[test]
    fn test_memory_store_expires_idle_sessions() {
        tokio_test::block_on(async {
            let store = MemoryFlowStore::new(Duration::from_millis(20));
            let idle = CustomerFlowState::new(Uuid::new_v4(), Some(1));
            store.save(&idle).await.unwrap();
            assert!(store.load(idle.session_id).await.unwrap().is_some());

            std::thread::sleep(Duration::from_millis(40));
            assert!(store.load(idle.session_id).await.unwrap().is_none());

            let fresh = CustomerFlowState::new(Uuid::new_v4(), Some(1));
            store.save(&fresh).await.unwrap();
            assert_eq!(store.len().await, 1);
            assert!(store.load(fresh.session_id).await.unwrap().is_some());
        });
    }

    #[test]
    fn test_memory_store_ttl_from_config() {
        let config = SessionConfig {
            ttl_seconds: 90,
            ..SessionConfig::default()
        };
        assert_eq!(MemoryFlowStore::from_config(&config).ttl, Duration::from_secs(90));
    }

    #[test]
    fn test_redis_key_uses_prefix() {
        let store = RedisFlowStore {
            client: Client::open("redis://127.0.0.1:6379").unwrap(),
            key_prefix: "customer-flow-storage".into(),
            ttl_seconds: 60,
        };
        let id = Uuid::nil();
        assert_eq!(
            store.key(id),
            "customer-flow-storage:00000000-0000-0000-0000-000000000000"
        );
    }
}
