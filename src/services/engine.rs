use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

use crate::{
    db::ProfileStore,
    error::{AppError, AppResult},
    models::{
        EngagementAction, EngagementRecord, EventFeatures, Recommendation, UserEventProfile,
        UserPreferences,
    },
    services::feeds::CatalogFeed,
};

use super::{
    CatalogSnapshot, CollaborativeScorer, ContentScorer, HybridAggregator, HybridWeights,
    PopularityScorer, ScoringContext, TrendSettings,
};

/// Tuning knobs for the engine
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Catalog events each scorer considers per request
    pub max_candidates: usize,
    /// Engagement records retained per user
    pub max_engagement_log: usize,
    /// Per-scorer deadline; `None` waits indefinitely
    pub scorer_timeout: Option<Duration>,
    pub trend: TrendSettings,
    pub weights: HybridWeights,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_candidates: 5000,
            max_engagement_log: 1000,
            scorer_timeout: Some(Duration::from_millis(250)),
            trend: TrendSettings::default(),
            weights: HybridWeights::default(),
        }
    }
}

/// One async mutex per user id, so writes to a profile never interleave
#[derive(Default)]
pub struct ProfileLocks {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProfileLocks {
    /// Returns the lock guarding a user's profile
    fn lock_for(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // drop locks no writer is holding or waiting on
        if locks.len() > 1024 {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Hybrid event recommendation engine
///
/// Reads the catalog snapshot and the profile store, and owns the only write
/// path into the store.
pub struct RecommendationEngine {
    store: Arc<dyn ProfileStore>,
    catalog: RwLock<Arc<CatalogSnapshot>>,
    aggregator: HybridAggregator,
    settings: EngineSettings,
    writers: ProfileLocks,
}

impl RecommendationEngine {
    /// Creates an engine over a store with an empty catalog
    pub fn new(store: Arc<dyn ProfileStore>, settings: EngineSettings) -> Self {
        let aggregator = HybridAggregator::new(
            CollaborativeScorer::new(),
            ContentScorer::new(),
            PopularityScorer::new(settings.trend.clone()),
        )
        .with_weights(settings.weights);

        tracing::info!(store = store.name(), "Recommendation engine created");

        Self {
            store,
            catalog: RwLock::new(Arc::new(CatalogSnapshot::empty())),
            aggregator,
            settings,
            writers: ProfileLocks::default(),
        }
    }

    /// The snapshot new requests will score against
    pub async fn catalog(&self) -> Arc<CatalogSnapshot> {
        self.catalog.read().await.clone()
    }

    /// Swaps in a new catalog built from raw feed entries
    ///
    /// Requests already running keep the snapshot they started with.
    pub async fn replace_catalog(&self, events: Vec<EventFeatures>) -> Arc<CatalogSnapshot> {
        let snapshot = Arc::new(CatalogSnapshot::new(events));
        *self.catalog.write().await = snapshot.clone();

        tracing::info!(
            events = snapshot.len(),
            dropped = snapshot.dropped(),
            "Catalog snapshot replaced"
        );

        snapshot
    }

    /// Pulls the catalog from a feed and swaps it in
    pub async fn refresh_catalog(&self, feed: &dyn CatalogFeed) -> AppResult<Arc<CatalogSnapshot>> {
        let events = feed.fetch_events().await.map_err(|e| {
            tracing::warn!(feed = feed.name(), error = %e, "Catalog refresh failed");
            e
        })?;
        Ok(self.replace_catalog(events).await)
    }

    /// Ranked recommendations for a user, scored as of now
    pub async fn get_recommendations(
        &self,
        user_id: &str,
        limit: usize,
    ) -> AppResult<Vec<Recommendation>> {
        self.get_recommendations_at(user_id, limit, Utc::now()).await
    }

    /// Ranked recommendations for a user, with trends measured at `now`
    ///
    /// Unknown users get an empty list. Only store I/O can fail.
    #[instrument(skip(self, now), fields(store = self.store.name()))]
    pub async fn get_recommendations_at(
        &self,
        user_id: &str,
        limit: usize,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Recommendation>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let catalog = self.catalog().await;

        let Some(target) = self.store.load(user_id).await? else {
            tracing::debug!("No profile, returning no recommendations");
            return Ok(Vec::new());
        };

        let profiles = self.store.load_all().await?;

        let ctx = Arc::new(ScoringContext {
            target,
            profiles,
            catalog,
            now,
            max_candidates: self.settings.max_candidates,
        });

        let recommendations = self
            .aggregator
            .recommend_concurrent(ctx, limit, self.settings.scorer_timeout)
            .await;

        tracing::info!(count = recommendations.len(), "Recommendations generated");

        Ok(recommendations)
    }

    /// Appends an engagement to a user's profile, creating the profile if needed
    pub async fn record_engagement(
        &self,
        user_id: &str,
        event_id: &str,
        action: EngagementAction,
        rating: Option<f64>,
    ) -> AppResult<EngagementRecord> {
        let record = EngagementRecord::new(event_id, action, rating, Utc::now())?;
        self.append_engagement(user_id, record).await
    }

    /// Appends an already-built record, holding the user's write lock throughout
    #[instrument(skip(self, record), fields(event_id = %record.event_id, action = %record.action))]
    pub async fn append_engagement(
        &self,
        user_id: &str,
        record: EngagementRecord,
    ) -> AppResult<EngagementRecord> {
        if action_requires_rating(record.action) && record.rating.is_none() {
            return Err(AppError::Validation(
                "a rated engagement requires a rating".to_string(),
            ));
        }

        let lock = self.writers.lock_for(user_id);
        let _guard = lock.lock().await;

        let mut profile = self
            .store
            .load(user_id)
            .await?
            .unwrap_or_else(|| UserEventProfile::new(user_id));

        profile.record(record.clone());
        let evicted = profile.enforce_retention(self.settings.max_engagement_log);
        if evicted > 0 {
            tracing::debug!(evicted, "Trimmed engagement log");
        }

        self.store.save(&profile).await?;

        tracing::info!(
            attended = profile.attended_events.len(),
            log_len = profile.engagement_log.len(),
            "Engagement recorded"
        );

        Ok(record)
    }

    /// Replaces a user's declared preferences, creating the profile if needed
    ///
    /// Attendance history and the engagement log are left as they are.
    #[instrument(skip(self, preferences))]
    pub async fn update_preferences(
        &self,
        user_id: &str,
        preferences: UserPreferences,
    ) -> AppResult<UserEventProfile> {
        let lock = self.writers.lock_for(user_id);
        let _guard = lock.lock().await;

        let mut profile = self
            .store
            .load(user_id)
            .await?
            .unwrap_or_else(|| UserEventProfile::new(user_id));
        profile.set_preferences(preferences);
        self.store.save(&profile).await?;

        tracing::info!("Preferences updated");

        Ok(profile)
    }

    pub async fn profile(&self, user_id: &str) -> AppResult<Option<UserEventProfile>> {
        self.store.load(user_id).await
    }
}

fn action_requires_rating(action: EngagementAction) -> bool {
    matches!(action, EngagementAction::Rated)
}

/// Refreshes the engine's catalog from a feed on a fixed interval
///
/// A failed refresh keeps the previous snapshot.
pub fn spawn_catalog_refresh(
    engine: Arc<RecommendationEngine>,
    feed: Arc<dyn CatalogFeed>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            if let Ok(snapshot) = engine.refresh_catalog(feed.as_ref()).await {
                tracing::debug!(feed = feed.name(), events = snapshot.len(), "Catalog refreshed");
            }
        }
    })
}
