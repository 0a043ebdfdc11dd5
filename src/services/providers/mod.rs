//! Catalog backend abstraction
//!
//! The view-model and the editor talk to the backend only through this trait, so tests can
//! substitute mocks and the HTTP implementation stays swappable.
use crate::{
    error::AppResult,
    models::{MetadataMovie, MovieRecord, NewMovie, PageResult},
};

pub mod http;

pub use http::HttpCatalogBackend;

/// Operations offered by the Backend Catalog Service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Fetch one page of the whole collection, ordered by title
    async fn list_movies(&self, page: u32, limit: u32) -> AppResult<PageResult>;

    /// Fetch one page of movies whose title or description matches `query`
    async fn search_movies(&self, query: &str, page: u32, limit: u32) -> AppResult<PageResult>;

    async fn create_movie(&self, movie: &NewMovie) -> AppResult<MovieRecord>;

    async fn update_movie(&self, movie: &MovieRecord) -> AppResult<MovieRecord>;

    async fn delete_movie(&self, id: u64) -> AppResult<()>;

    /// Search the external metadata provider by title
    async fn search_metadata(&self, query: &str) -> AppResult<Vec<MetadataMovie>>;

    /// Fetch full metadata details by external id
    async fn fetch_metadata(&self, external_id: &str) -> AppResult<MetadataMovie>;

    /// Backend build version
    async fn fetch_version(&self) -> AppResult<String>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}
