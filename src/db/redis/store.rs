use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;

use crate::db::ProfileStore;
use crate::error::AppResult;
use crate::models::UserEventProfile;

/// Keys used by the Redis profile store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// JSON document of one user's profile
    Profile(String),
    /// Set of every user id with a stored profile
    ProfileIndex,
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKey::Profile(user_id) => write!(f, "profile:{}", user_id),
            StoreKey::ProfileIndex => write!(f, "profiles:index"),
        }
    }
}

/// Creates a Redis client for the profile store
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Profile store keeping one JSON document per user in Redis
#[derive(Clone)]
pub struct RedisProfileStore {
    redis_client: Client,
}

impl RedisProfileStore {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    fn decode(user_id: &str, json: &str) -> AppResult<UserEventProfile> {
        serde_json::from_str(json).map_err(|e| {
            tracing::warn!(user_id = %user_id, error = %e, "Stored profile is unreadable");
            e.into()
        })
    }
}

#[async_trait::async_trait]
impl ProfileStore for RedisProfileStore {
    async fn load(&self, user_id: &str) -> AppResult<Option<UserEventProfile>> {
        let key = StoreKey::Profile(user_id.to_string()).to_string();
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let stored: Option<String> = conn.get(&key).await.map_err(|e| {
            tracing::warn!(error = %e, "Redis get failed");
            e
        })?;

        stored.map(|json| Self::decode(user_id, &json)).transpose()
    }

    async fn load_all(&self) -> AppResult<Vec<UserEventProfile>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let mut user_ids: Vec<String> = conn.smembers(StoreKey::ProfileIndex.to_string()).await?;
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        user_ids.sort();

        let keys: Vec<String> = user_ids
            .iter()
            .map(|id| StoreKey::Profile(id.clone()).to_string())
            .collect();
        let stored: Vec<Option<String>> = redis::cmd("MGET").arg(&keys).query_async(&mut conn).await?;

        let mut profiles = Vec::with_capacity(stored.len());
        for (user_id, json) in user_ids.iter().zip(stored) {
            match json {
                Some(json) => profiles.push(Self::decode(user_id, &json)?),
                None => tracing::debug!(user_id = %user_id, "Indexed profile is missing"),
            }
        }

        tracing::debug!(count = profiles.len(), "Loaded profiles from Redis");

        Ok(profiles)
    }

    async fn save(&self, profile: &UserEventProfile) -> AppResult<()> {
        let key = StoreKey::Profile(profile.user_id.clone()).to_string();
        let json = serde_json::to_string(profile)?;

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let _: () = redis::pipe()
            .atomic()
            .set(&key, json)
            .ignore()
            .sadd(StoreKey::ProfileIndex.to_string(), &profile.user_id)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Redis profile write failed");
                e
            })?;

        tracing::debug!(
            user_id = %profile.user_id,
            log_len = profile.engagement_log.len(),
            "Stored profile"
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
