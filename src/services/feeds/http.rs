use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::EventFeatures,
    services::feeds::CatalogFeed,
};

/// Pulls the catalog as a JSON array of events from an HTTP endpoint
#[derive(Clone)]
pub struct HttpCatalogFeed {
    http_client: HttpClient,
    url: String,
}

impl HttpCatalogFeed {
    pub fn new(url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            url,
        }
    }
}

#[async_trait::async_trait]
impl CatalogFeed for HttpCatalogFeed {
    async fn fetch_events(&self) -> AppResult<Vec<EventFeatures>> {
        tracing::debug!(url = %self.url, "Fetching catalog over HTTP");

        let response = self.http_client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                url = %self.url,
                status = %status,
                body = %body,
                "Catalog feed request failed"
            );
            return Err(AppError::CatalogFeed(format!(
                "feed returned status {}: {}",
                status, body
            )));
        }

        let events: Vec<EventFeatures> = response.json().await?;

        tracing::info!(count = events.len(), "Fetched catalog over HTTP");

        Ok(events)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
