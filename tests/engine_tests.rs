use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

use event_recommender::db::{InMemoryProfileStore, ProfileStore};
use event_recommender::models::{
    EngagementAction, EventFeatures, Location, RecommendationSource, UserEventProfile,
    UserPreferences,
};
use event_recommender::services::{
    user_similarity, ContentScorer, EngineSettings, HybridAggregator, HybridWeights,
    RecommendationEngine, Scorer, ScoringContext, TrendSettings,
};

fn event(id: &str, category: &str, city: &str, hour: u32) -> EventFeatures {
    EventFeatures {
        id: id.to_string(),
        category: category.to_string(),
        tags: BTreeSet::new(),
        location: Location {
            city: city.to_string(),
            venue: String::new(),
            latitude: 0.0,
            longitude: 0.0,
        },
        starts_at: NaiveDate::from_ymd_opt(2026, 11, 20)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap(),
        price: 0.0,
        capacity: 100,
        registered: 0,
        organizer: String::new(),
        description: String::new(),
        popularity: 0.0,
        average_rating: 0.0,
        review_count: 0,
    }
}

fn engine() -> RecommendationEngine {
    let store: Arc<dyn ProfileStore> = Arc::new(InMemoryProfileStore::new());
    RecommendationEngine::new(store, EngineSettings::default())
}

async fn attend(engine: &RecommendationEngine, user: &str, events: &[&str]) {
    for event_id in events {
        engine
            .record_engagement(user, event_id, EngagementAction::Attended, None)
            .await
            .unwrap();
    }
}

async fn interests(engine: &RecommendationEngine, user: &str, categories: &[&str]) {
    let prefs = categories
        .iter()
        .fold(UserPreferences::new(), |p, c| p.with_category(*c));
    engine.update_preferences(user, prefs).await.unwrap();
}

/// Users A and B from the worked similarity example
async fn scenario_engine() -> RecommendationEngine {
    let engine = engine();
    engine
        .replace_catalog(vec![
            event("E1", "Tech", "Berlin", 19),
            event("E2", "Tech", "Berlin", 19),
            event("E3", "Outdoors", "Munich", 9),
        ])
        .await;
    attend(&engine, "A", &["E1", "E2"]).await;
    interests(&engine, "A", &["Tech"]).await;
    attend(&engine, "B", &["E1", "E3"]).await;
    interests(&engine, "B", &["Tech", "Outdoors"]).await;
    engine
}

#[tokio::test]
async fn test_scenario_a_similarity() {
    let engine = scenario_engine().await;
    let a = engine.profile("A").await.unwrap().unwrap();
    let b = engine.profile("B").await.unwrap().unwrap();

    let sim = user_similarity(&a, &b);
    assert!((sim - 0.3833).abs() < 1e-3);
    assert!(sim > 0.3);
    assert_eq!(sim, user_similarity(&b, &a));
}

#[tokio::test]
async fn test_scenario_b_collaborative_recommendation() {
    let engine = scenario_engine().await;

    let recs = engine.get_recommendations("A", 10).await.unwrap();

    let e3 = recs.iter().find(|r| r.event_id == "E3").unwrap();
    let collaborative: f64 = (0.7 / 3.0 + 0.3 * 0.5) * 0.8;
    assert!((collaborative - 0.307).abs() < 1e-3);
    assert!((e3.score - collaborative * 1.2).abs() < 1e-9);
    assert_eq!(e3.source, RecommendationSource::Collaborative);
    assert!(recs.iter().all(|r| r.event_id != "E1" && r.event_id != "E2"));
}

#[tokio::test]
async fn test_scenario_c_content_scoring() {
    let mut past = event("P1", "Tech", "Hamburg", 10);
    past.tags = ["rust".to_string()].into_iter().collect();
    let mut candidate = event("C1", "Tech", "Berlin", 3);
    candidate.tags = ["rust".to_string(), "embedded".to_string()].into_iter().collect();
    candidate.average_rating = 4.6;

    let engine = engine();
    engine.replace_catalog(vec![past, candidate]).await;
    attend(&engine, "alice", &["P1"]).await;
    engine
        .update_preferences(
            "alice",
            UserPreferences::new().with_category("Tech").with_location("Berlin"),
        )
        .await
        .unwrap();

    let target = engine.profile("alice").await.unwrap().unwrap();
    let ctx = ScoringContext {
        target: target.clone(),
        profiles: vec![target],
        catalog: engine.catalog().await,
        now: Utc::now(),
        max_candidates: 100,
    };

    let recs = ContentScorer::new().score(&ctx, 10);
    assert_eq!(recs.len(), 1);
    assert!((recs[0].score - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn test_scenario_d_zero_capacity() {
    let mut full = event("E1", "Tech", "Berlin", 19);
    full.capacity = 0;
    full.registered = 500;
    full.popularity = 0.5;

    let engine = engine();
    engine.replace_catalog(vec![full]).await;
    engine
        .record_engagement("alice", "other", EngagementAction::Viewed, None)
        .await
        .unwrap();

    let recs = engine.get_recommendations("alice", 10).await.unwrap();
    assert_eq!(recs.len(), 1);
    // popularity 0.5 × 0.4, then × 0.8 in the merge; no pressure term
    assert!((recs[0].score - 0.16).abs() < 1e-9);
    assert_eq!(recs[0].source, RecommendationSource::Popularity);
}

#[tokio::test]
async fn test_scenario_e_stable_tie_order() {
    let engine = engine();
    engine
        .replace_catalog(vec![
            event("E9", "Tech", "Berlin", 19),
            event("E2", "Tech", "Berlin", 19),
            event("E5", "Tech", "Berlin", 19),
        ])
        .await;
    interests(&engine, "alice", &["Tech"]).await;

    let first: Vec<String> = engine
        .get_recommendations("alice", 10)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.event_id)
        .collect();
    assert_eq!(first, vec!["E2", "E5", "E9"]);

    for _ in 0..10 {
        let again: Vec<String> = engine
            .get_recommendations("alice", 10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.event_id)
            .collect();
        assert_eq!(again, first);
    }
}

#[tokio::test]
async fn test_unknown_users_get_nothing() {
    let engine = scenario_engine().await;
    for user in ["nobody", "", "a"] {
        assert!(engine.get_recommendations(user, 20).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_limit_and_confidence_bounds() {
    let engine = engine();
    let mut events = Vec::new();
    for i in 0..30 {
        let mut e = event(&format!("E{:02}", i), "Tech", "Berlin", 19);
        e.popularity = 1.0;
        e.registered = 95;
        e.average_rating = 4.8;
        e.review_count = 40;
        events.push(e);
    }
    engine.replace_catalog(events).await;
    engine
        .update_preferences(
            "alice",
            UserPreferences::new().with_category("Tech").with_location("Berlin"),
        )
        .await
        .unwrap();

    for limit in [1, 3, 7, 20] {
        let recs = engine.get_recommendations("alice", limit).await.unwrap();
        assert!(recs.len() <= limit);
        for rec in &recs {
            assert!((0.0..=1.0).contains(&rec.confidence));
            assert!(rec.score >= 0.0);
        }
        for pair in recs.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}

#[tokio::test]
async fn test_hybrid_score_dominates_individual_signals() {
    let engine = scenario_engine().await;
    // make E3 a content match for A too
    interests(&engine, "A", &["Tech", "Outdoors"]).await;

    let target = engine.profile("A").await.unwrap().unwrap();
    let ctx = ScoringContext {
        target: target.clone(),
        profiles: vec![
            target,
            engine.profile("B").await.unwrap().unwrap(),
        ],
        catalog: engine.catalog().await,
        now: Utc::now(),
        max_candidates: 100,
    };

    let aggregator = HybridAggregator::default();
    let merged = aggregator.recommend(&ctx, 10);
    let e3 = merged.iter().find(|r| r.event_id == "E3").unwrap();

    let content = ContentScorer::new().score(&ctx, 10);
    let content_e3 = content.iter().find(|r| r.event_id == "E3").unwrap();

    assert_eq!(e3.source, RecommendationSource::Hybrid);
    assert!(e3.score >= content_e3.score);
    assert!(e3.reasons.len() >= 2);
}

#[tokio::test]
async fn test_trend_uses_engagement_across_users() {
    let engine = engine();
    let mut e = event("HOT", "Music", "Hamburg", 20);
    e.capacity = 0;
    engine.replace_catalog(vec![e]).await;
    engine
        .record_engagement("alice", "elsewhere", EngagementAction::Viewed, None)
        .await
        .unwrap();

    assert!(engine.get_recommendations("alice", 5).await.unwrap().is_empty());

    for fan in ["f1", "f2", "f3", "f4"] {
        engine
            .record_engagement(fan, "HOT", EngagementAction::Registered, None)
            .await
            .unwrap();
    }

    let recs = engine.get_recommendations("alice", 5).await.unwrap();
    assert_eq!(recs.len(), 1);
    assert!(recs[0].reasons.iter().any(|r| r == "Trending right now"));
}

#[tokio::test]
async fn test_trend_window_is_anchored_to_now() {
    let engine = engine();
    engine.replace_catalog(vec![event("HOT", "Music", "Hamburg", 20)]).await;
    engine
        .record_engagement("alice", "elsewhere", EngagementAction::Viewed, None)
        .await
        .unwrap();
    for fan in ["f1", "f2", "f3", "f4"] {
        engine
            .record_engagement(fan, "HOT", EngagementAction::Attended, None)
            .await
            .unwrap();
    }

    let lookback = TrendSettings::default().lookback;
    let later = Utc::now() + lookback + chrono::Duration::hours(1);
    let recs = engine
        .get_recommendations_at("alice", 5, later)
        .await
        .unwrap();
    assert!(recs.is_empty());

    let fixed = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    assert!(engine
        .get_recommendations_at("alice", 5, fixed)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_concurrent_writes_to_one_user_are_serialized() {
    let engine = Arc::new(engine());

    let mut tasks = Vec::new();
    for i in 0..50 {
        let engine = engine.clone();
        tasks.push(tokio::spawn(async move {
            let action = if i % 2 == 0 {
                EngagementAction::Attended
            } else {
                EngagementAction::Viewed
            };
            engine
                .record_engagement("alice", &format!("E{}", i), action, None)
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let profile = engine.profile("alice").await.unwrap().unwrap();
    assert_eq!(profile.engagement_log.len(), 50);
    assert_eq!(profile.attended_events.len(), 25);
    assert!(profile.attendance_is_logged());
}

#[tokio::test]
async fn test_concurrent_writes_to_many_users() {
    let engine = Arc::new(engine());

    let mut tasks = Vec::new();
    for user in 0..10 {
        for i in 0..10 {
            let engine = engine.clone();
            tasks.push(tokio::spawn(async move {
                engine
                    .record_engagement(
                        &format!("user{}", user),
                        &format!("E{}", i),
                        EngagementAction::Registered,
                        None,
                    )
                    .await
            }));
        }
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    for user in 0..10 {
        let profile: UserEventProfile = engine
            .profile(&format!("user{}", user))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.engagement_log.len(), 10);
        assert_eq!(profile.attended_events.len(), 10);
    }
}

#[tokio::test]
async fn test_recommendations_do_not_mutate_profiles() {
    let engine = scenario_engine().await;
    let before = engine.profile("A").await.unwrap();

    engine.get_recommendations("A", 10).await.unwrap();

    assert_eq!(engine.profile("A").await.unwrap(), before);
}

#[tokio::test]
async fn test_largest_limit_is_accepted() {
    let engine = scenario_engine().await;

    let recs = engine.get_recommendations("A", usize::MAX).await.unwrap();

    assert!(recs.iter().any(|r| r.event_id == "E3"));
    assert!(recs.iter().all(|r| r.event_id != "E1" && r.event_id != "E2"));
}

#[tokio::test]
async fn test_expired_scorer_deadline_still_answers() {
    let settings = EngineSettings {
        scorer_timeout: Some(std::time::Duration::from_nanos(1)),
        ..EngineSettings::default()
    };
    let store: Arc<dyn ProfileStore> = Arc::new(InMemoryProfileStore::new());
    let engine = RecommendationEngine::new(store, settings);
    engine
        .replace_catalog(vec![event("E1", "Tech", "Berlin", 19)])
        .await;
    interests(&engine, "alice", &["Tech"]).await;

    let recs = engine.get_recommendations("alice", 5).await.unwrap();

    // whatever finished in time is still a valid ranking
    assert!(recs.len() <= 1);
    assert!(recs.iter().all(|r| r.event_id == "E1"));
}

#[tokio::test]
async fn test_configured_weights_reach_the_merge() {
    let settings = EngineSettings {
        weights: HybridWeights {
            collaborative: 1.2,
            content: 2.0,
            popularity: 0.8,
        },
        ..EngineSettings::default()
    };
    let store: Arc<dyn ProfileStore> = Arc::new(InMemoryProfileStore::new());
    let engine = RecommendationEngine::new(store, settings);
    engine
        .replace_catalog(vec![event("E1", "Tech", "Berlin", 19)])
        .await;
    interests(&engine, "alice", &["Tech"]).await;

    let recs = engine.get_recommendations("alice", 5).await.unwrap();

    assert_eq!(recs.len(), 1);
    assert!((recs[0].score - 0.8).abs() < 1e-9);
    assert_eq!(recs[0].confidence, 0.8);
}
