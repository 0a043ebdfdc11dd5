use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{MetadataMovie, MovieRecord, NewMovie},
    services::{catalog::InvalidationHandle, providers::CatalogBackend},
};

/// Add/edit/delete collaborator of the catalog
///
/// Performs mutations against the backend and, only when one succeeds, tells the catalog to
/// refetch through its [`InvalidationHandle`]. It never needs to know what the catalog is
/// currently showing.
#[derive(Clone)]
pub struct CatalogEditor {
    backend: Arc<dyn CatalogBackend>,
    invalidation: InvalidationHandle,
}

impl CatalogEditor {
    pub fn new(backend: Arc<dyn CatalogBackend>, invalidation: InvalidationHandle) -> Self {
        Self {
            backend,
            invalidation,
        }
    }

    /// Search the metadata provider for candidates to add
    pub async fn search_metadata(&self, query: &str) -> AppResult<Vec<MetadataMovie>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        self.backend.search_metadata(query.trim()).await
    }

    /// Add a metadata hit to the collection with the user's rating
    pub async fn add_from_metadata(
        &self,
        movie: &MetadataMovie,
        rating: f64,
    ) -> AppResult<MovieRecord> {
        let payload = NewMovie::from_metadata(movie, rating);

        let created = self
            .backend
            .create_movie(&payload)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AppError::Conflict(format!(
                    "\"{}\" is already in the collection",
                    movie.title
                )),
                other => other,
            })?;

        self.invalidation.invalidate();
        Ok(created)
    }

    /// Pull fresh metadata for a record; the result is not saved until [`Self::save`]
    pub async fn refresh_from_metadata(&self, movie: &MovieRecord) -> AppResult<MovieRecord> {
        let external_id = movie
            .external_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::InvalidInput(format!("\"{}\" has no metadata id", movie.title))
            })?;

        let details = self.backend.fetch_metadata(external_id).await?;
        Ok(movie.merged_with_metadata(&details))
    }

    pub async fn save(&self, movie: &MovieRecord) -> AppResult<MovieRecord> {
        if movie.title.trim().is_empty() || movie.year == 0 {
            return Err(AppError::InvalidInput(
                "Title and year are required".to_string(),
            ));
        }

        let updated = self.backend.update_movie(movie).await?;
        self.invalidation.invalidate();
        Ok(updated)
    }

    pub async fn delete(&self, id: u64) -> AppResult<()> {
        self.backend.delete_movie(id).await?;
        self.invalidation.invalidate();
        Ok(())
    }
}
