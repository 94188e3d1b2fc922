use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use event_recommender::{
    config::Config,
    create_router,
    db::{self, InMemoryProfileStore, ProfileStore, RedisProfileStore},
    services::{
        feeds::{CatalogFeed, HttpCatalogFeed, PostgresCatalogFeed},
        spawn_catalog_refresh, RecommendationEngine,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_recommender=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn ProfileStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisProfileStore::new(db::create_redis_client(url)?)),
        None => {
            tracing::warn!("REDIS_URL not set, profiles are kept in memory only");
            Arc::new(InMemoryProfileStore::new())
        }
    };

    let engine = Arc::new(RecommendationEngine::new(store, config.engine_settings()));

    let feed: Option<Arc<dyn CatalogFeed>> =
        match (&config.catalog_feed_url, &config.database_url) {
            (Some(url), _) => Some(Arc::new(HttpCatalogFeed::new(url.clone()))),
            (None, Some(database_url)) => Some(Arc::new(PostgresCatalogFeed::new(
                db::create_pool(database_url).await?,
            ))),
            (None, None) => None,
        };

    let mut state =
        AppState::new(engine.clone()).with_limits(config.default_limit, config.max_limit);

    if let Some(feed) = feed {
        tracing::info!(
            feed = feed.name(),
            every_secs = config.catalog_refresh_secs,
            "Catalog refresh scheduled"
        );
        spawn_catalog_refresh(
            engine,
            feed.clone(),
            Duration::from_secs(config.catalog_refresh_secs.max(1)),
        );
        state = state.with_catalog_feed(feed);
    } else {
        tracing::info!("No catalog feed configured, catalog is set through the API");
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
