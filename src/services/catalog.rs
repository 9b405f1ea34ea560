//! Catalog client for the external volumes-search API
//!
//! The upstream is reached through the [`CatalogClient`] trait so handlers and
//! tests do not depend on the network. [`GoogleBooksClient`] is the production
//! implementation; [`CatalogService`] adds input checks, truncation and the
//! display palette on top of it.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::volume::{CatalogEntry, Volume, VolumesPage},
};

/// Display colors assigned to search results by position
pub const PALETTE: [&str; 6] = [
    "#e9c46ab3",
    "#023e7db3",
    "#e63946b3",
    "#56cfe1b3",
    "#9d0208b3",
    "#003566b3",
];

/// Upper bound on the number of results a search page shows
pub const MAX_SEARCH_RESULTS: usize = 5;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Run a free-text search, asking for at most `max_results` volumes
    async fn search_volumes(&self, query: &str, max_results: usize) -> AppResult<VolumesPage>;

    /// Fetch a single volume by its catalog id
    async fn get_volume(&self, id: &str) -> AppResult<Volume>;
}

/// Google Books v1 client
#[derive(Clone)]
pub struct GoogleBooksClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleBooksClient {
    pub fn new(config: &CatalogConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("bookshelf-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> AppResult<reqwest::Response> {
        self.http
            .get(url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::CatalogUnavailable(format!("request to {} failed: {}", url, e)))
    }
}

#[async_trait]
impl CatalogClient for GoogleBooksClient {
    async fn search_volumes(&self, query: &str, max_results: usize) -> AppResult<VolumesPage> {
        let url = format!("{}/volumes", self.base_url);
        let max_results = max_results.to_string();
        let response = self
            .get(&url, &[("q", query), ("maxResults", max_results.as_str())])
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::CatalogUnavailable(format!(
                "volumes search returned {}",
                status
            )));
        }

        let page: VolumesPage = response.json().await.map_err(|e| {
            AppError::CatalogUnavailable(format!("malformed volumes search payload: {}", e))
        })?;

        // The API omits `items` when nothing matched; anything else is malformed
        if page.items.is_none() && page.total_items != Some(0) {
            return Err(AppError::CatalogUnavailable(
                "volumes search payload has no items".to_string(),
            ));
        }

        Ok(page)
    }

    async fn get_volume(&self, id: &str) -> AppResult<Volume> {
        let url = format!("{}/volumes/{}", self.base_url, id);
        let response = self.get(&url, &[]).await?;

        match response.status() {
            status if status.is_success() => response.json().await.map_err(|e| {
                AppError::CatalogUnavailable(format!("malformed volume payload: {}", e))
            }),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => {
                Err(AppError::NotFound(format!("No catalog entry with id {}", id)))
            }
            status => Err(AppError::CatalogUnavailable(format!(
                "volume lookup returned {}",
                status
            ))),
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    client: Arc<dyn CatalogClient>,
    max_results: usize,
}

impl CatalogService {
    pub fn new(client: Arc<dyn CatalogClient>, max_results: usize) -> Self {
        Self {
            client,
            max_results: max_results.clamp(1, MAX_SEARCH_RESULTS),
        }
    }

    /// Search by title: first results in upstream order, each with a palette color
    pub async fn search(&self, title: &str) -> AppResult<Vec<CatalogEntry>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Please enter a title to search for".to_string()));
        }

        tracing::debug!("Catalog search: {}", title);
        let page = self.client.search_volumes(title, self.max_results).await?;

        let entries: Vec<CatalogEntry> = page
            .items
            .unwrap_or_default()
            .into_iter()
            .take(self.max_results)
            .enumerate()
            .map(|(idx, volume)| CatalogEntry {
                volume,
                color: PALETTE[idx % PALETTE.len()],
            })
            .collect();

        tracing::info!("Catalog search for {:?} returned {} entries", title, entries.len());
        Ok(entries)
    }

    /// Fetch the full payload of one catalog entry
    pub async fn volume(&self, id: &str) -> AppResult<Volume> {
        if !is_valid_volume_id(id) {
            return Err(AppError::Validation(format!("Invalid catalog id: {}", id)));
        }
        self.client.get_volume(id).await
    }
}

fn is_valid_volume_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
