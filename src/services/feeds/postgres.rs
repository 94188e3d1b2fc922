use chrono::NaiveDateTime;
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{EventFeatures, Location},
    services::feeds::CatalogFeed,
};

const SELECT_EVENTS: &str = r#"
    SELECT id, category, tags, city, venue, latitude, longitude, starts_at,
           price, capacity, registered, organizer, description,
           popularity, average_rating, review_count
    FROM events
    ORDER BY id
"#;

/// Row of the `events` table
#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: String,
    category: String,
    tags: Vec<String>,
    city: String,
    venue: String,
    latitude: f64,
    longitude: f64,
    starts_at: NaiveDateTime,
    price: f64,
    capacity: i32,
    registered: i32,
    organizer: String,
    description: String,
    popularity: f64,
    average_rating: f64,
    review_count: i32,
}

/// Non-negative database integer as a count
fn count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

impl From<EventRow> for EventFeatures {
    fn from(row: EventRow) -> Self {
        EventFeatures {
            id: row.id,
            category: row.category,
            tags: row.tags.into_iter().collect(),
            location: Location {
                city: row.city,
                venue: row.venue,
                latitude: row.latitude,
                longitude: row.longitude,
            },
            starts_at: row.starts_at,
            price: row.price,
            capacity: count(row.capacity),
            registered: count(row.registered),
            organizer: row.organizer,
            description: row.description,
            popularity: row.popularity,
            average_rating: row.average_rating,
            review_count: count(row.review_count),
        }
    }
}

/// Reads the catalog from the `events` table
#[derive(Clone)]
pub struct PostgresCatalogFeed {
    db_pool: PgPool,
}

impl PostgresCatalogFeed {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait::async_trait]
impl CatalogFeed for PostgresCatalogFeed {
    async fn fetch_events(&self) -> AppResult<Vec<EventFeatures>> {
        let rows: Vec<EventRow> = sqlx::query_as(SELECT_EVENTS)
            .fetch_all(&self.db_pool)
            .await?;

        tracing::info!(count = rows.len(), "Loaded catalog from database");

        Ok(rows.into_iter().map(EventFeatures::from).collect())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
