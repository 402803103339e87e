use crate::config::CacheConfig;
use crate::services::store::DocumentStore;
use crate::utils::Clock;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const SESSION_LIFETIME_DAYS: i64 = 7;

/// Stored form of a signed-in user's session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub user: Value,
    pub expires_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Per-user sessions that lapse a week after they were saved, plus the
/// onboarding flag that outlives them.
pub struct SessionStore {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    collection: String,
}

impl SessionStore {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, config: &CacheConfig) -> Self {
        Self {
            store,
            clock,
            collection: config.sessions_collection.clone(),
        }
    }

    /// Saves `user` and returns the expiry instant.
    pub async fn save_session(&self, session_id: &str, user: Value) -> Result<DateTime<Utc>> {
        let expires_at = self.now() + Duration::days(SESSION_LIFETIME_DAYS);
        let session = StoredSession { user, expires_at };

        self.store
            .put(&self.collection, session_id, serde_json::to_value(&session)?)
            .await?;

        info!("Saved session {} until {}", session_id, expires_at);
        Ok(expires_at)
    }

    /// The saved user data, or `None` when absent or expired. An expired
    /// session is removed on the way out.
    pub async fn get_session(&self, session_id: &str) -> Result<Option<Value>> {
        let Some(document) = self.store.get(&self.collection, session_id).await? else {
            debug!("No session stored for {}", session_id);
            return Ok(None);
        };

        let session: StoredSession = serde_json::from_value(document)?;
        if session.is_expired(self.now()) {
            info!("Session {} expired at {}, clearing", session_id, session.expires_at);
            self.clear_session(session_id).await?;
            return Ok(None);
        }

        Ok(Some(session.user))
    }

    pub async fn clear_session(&self, session_id: &str) -> Result<()> {
        self.store.delete(&self.collection, session_id).await?;
        Ok(())
    }

    /// Clears the session and the onboarding flag.
    pub async fn clear_all(&self, session_id: &str) -> Result<()> {
        self.clear_session(session_id).await?;
        self.store
            .delete(&self.collection, &onboarding_id(session_id))
            .await?;
        info!("Cleared all session data for {}", session_id);
        Ok(())
    }

    pub async fn mark_onboarding_complete(&self, session_id: &str) -> Result<()> {
        self.store
            .put(&self.collection, &onboarding_id(session_id), Value::Bool(true))
            .await?;
        Ok(())
    }

    /// True until onboarding is marked complete. Store errors count as a
    /// first launch.
    pub async fn is_first_time(&self, session_id: &str) -> bool {
        match self.store.get(&self.collection, &onboarding_id(session_id)).await {
            Ok(flag) => flag.is_none(),
            Err(e) => {
                warn!("Onboarding lookup for {} failed: {}", session_id, e);
                true
            }
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }
}

fn onboarding_id(session_id: &str) -> String {
    format!("{}_onboarding", session_id)
}
