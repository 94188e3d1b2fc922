use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{error::AppResult, models::UserEventProfile};

#[cfg(test)]
use mockall::automock;

/// Backing store for user event profiles
///
/// Implementations only persist whole profiles. Write ordering per user is
/// enforced by the engine, which holds that user's lock around every
/// load-modify-save cycle.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch one profile, `None` when the user is unknown
    async fn load(&self, user_id: &str) -> AppResult<Option<UserEventProfile>>;

    /// Fetch every known profile
    async fn load_all(&self) -> AppResult<Vec<UserEventProfile>>;

    /// Insert or replace a profile
    async fn save(&self, profile: &UserEventProfile) -> AppResult<()>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}

/// Process-local profile store
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, UserEventProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with profiles
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserEventProfile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect();
        Self {
            profiles: RwLock::new(profiles),
        }
    }
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load(&self, user_id: &str) -> AppResult<Option<UserEventProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn load_all(&self) -> AppResult<Vec<UserEventProfile>> {
        let profiles = self.profiles.read().await;
        let mut all: Vec<UserEventProfile> = profiles.values().cloned().collect();
        all.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(all)
    }

    async fn save(&self, profile: &UserEventProfile) -> AppResult<()> {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
