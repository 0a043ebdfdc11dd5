//! HTTP implementation of the catalog backend
//!
//! Every list/search request carries a `t` query parameter holding the current timestamp in
//! milliseconds. The backend (and anything between us and it) caches GET responses, and the
//! nonce keeps a page fetched right after a mutation from being served stale.
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{MetadataMovie, MovieRecord, NewMovie, PageResult},
    services::providers::CatalogBackend,
};
use chrono::Utc;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

/// Connection-level failures (refused, reset, timed out) carry reqwest's own description
fn transport_error(e: reqwest::Error) -> AppError {
    tracing::warn!(error = %e, timeout = e.is_timeout(), "Backend request failed");
    AppError::Transport(e.to_string())
}

#[derive(Clone)]
pub struct HttpCatalogBackend {
    http_client: HttpClient,
    base_url: String,
}

impl HttpCatalogBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(config.backend_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn nonce() -> String {
        Utc::now().timestamp_millis().to_string()
    }

    /// Turns a non-success response into the matching error, reading `{ "error": ... }`
    /// bodies when the backend sends them
    async fn ensure_success(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);

        Err(match status {
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::CONFLICT => AppError::Conflict(message),
            _ => AppError::ExternalApi(format!(
                "Backend returned status {}: {}",
                status, message
            )),
        })
    }

    async fn fetch_page(&self, path: &str, query: &[(&str, String)]) -> AppResult<PageResult> {
        let response = self
            .http_client
            .get(self.url(path))
            .query(query)
            .query(&[("t", Self::nonce())])
            .send()
            .await
            .map_err(transport_error)?;

        let page: PageResult = Self::ensure_success(response).await?.json().await?;
        Ok(page)
    }
}

#[async_trait::async_trait]
impl CatalogBackend for HttpCatalogBackend {
    async fn list_movies(&self, page: u32, limit: u32) -> AppResult<PageResult> {
        let result = self
            .fetch_page(
                "/movies",
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        tracing::debug!(
            page,
            limit,
            results = result.items.len(),
            total = result.meta.total_items,
            "Movie page fetched"
        );

        Ok(result)
    }

    async fn search_movies(&self, query: &str, page: u32, limit: u32) -> AppResult<PageResult> {
        let result = self
            .fetch_page(
                "/movies/search",
                &[
                    ("q", query.to_string()),
                    ("page", page.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        tracing::debug!(
            query = %query,
            page,
            limit,
            results = result.items.len(),
            "Movie search completed"
        );

        Ok(result)
    }

    async fn create_movie(&self, movie: &NewMovie) -> AppResult<MovieRecord> {
        let response = self
            .http_client
            .post(self.url("/movies"))
            .json(movie)
            .send()
            .await
            .map_err(transport_error)?;

        let created: MovieRecord = Self::ensure_success(response).await?.json().await?;

        tracing::info!(id = created.id, title = %created.title, "Movie created");
        Ok(created)
    }

    async fn update_movie(&self, movie: &MovieRecord) -> AppResult<MovieRecord> {
        let response = self
            .http_client
            .put(self.url(&format!("/movies/{}", movie.id)))
            .json(movie)
            .send()
            .await
            .map_err(transport_error)?;

        let updated: MovieRecord = Self::ensure_success(response).await?.json().await?;

        tracing::info!(id = updated.id, title = %updated.title, "Movie updated");
        Ok(updated)
    }

    async fn delete_movie(&self, id: u64) -> AppResult<()> {
        let response = self
            .http_client
            .delete(self.url(&format!("/movies/{}", id)))
            .send()
            .await
            .map_err(transport_error)?;

        Self::ensure_success(response).await?;

        tracing::info!(id, "Movie deleted");
        Ok(())
    }

    async fn search_metadata(&self, query: &str) -> AppResult<Vec<MetadataMovie>> {
        let response = self
            .http_client
            .get(self.url("/tmdb/search"))
            .query(&[("query", query.trim())])
            .send()
            .await
            .map_err(transport_error)?;

        let results: serde_json::Value = Self::ensure_success(response).await?.json().await?;

        // Anything but an array means "no results"; entries that don't look like movies are
        // skipped rather than failing the whole search.
        let movies: Vec<MetadataMovie> = results
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        tracing::info!(
            query = %query,
            results = movies.len(),
            "Metadata search completed"
        );

        Ok(movies)
    }

    async fn fetch_metadata(&self, external_id: &str) -> AppResult<MetadataMovie> {
        let response = self
            .http_client
            .get(self.url(&format!("/tmdb/movie/{}", external_id)))
            .send()
            .await
            .map_err(transport_error)?;

        let movie: MetadataMovie = Self::ensure_success(response).await?.json().await?;

        tracing::info!(external_id = %external_id, title = %movie.title, "Metadata fetched");
        Ok(movie)
    }

    async fn fetch_version(&self) -> AppResult<String> {
        let response = self
            .http_client
            .get(self.url("/version"))
            .send()
            .await
            .map_err(transport_error)?;
        let version: VersionResponse = Self::ensure_success(response).await?.json().await?;
        Ok(version.version)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
