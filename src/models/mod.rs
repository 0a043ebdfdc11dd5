use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod metadata;

pub use metadata::{CastMember, Credits, CrewMember, MetadataMovie, NewMovie};

/// Base URL used to render poster paths returned by the metadata provider
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// A movie in the collection, as returned by the backend
///
/// Records are never edited in place by the view-model; a refetch replaces them wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub id: u64,
    pub title: String,
    pub year: i32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    /// Reference into the external metadata catalog
    #[serde(default, rename = "tmdb_id")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MovieRecord {
    /// Full poster URL, preferring `poster_path` over an uploaded `image_path`
    pub fn poster_url(&self) -> Option<String> {
        [&self.poster_path, &self.image_path]
            .into_iter()
            .flatten()
            .find(|path| !path.is_empty())
            .map(|path| format!("{}{}", POSTER_BASE_URL, path))
    }

    /// Overlay metadata details onto this record without touching its identity
    ///
    /// The description and overview take the metadata overview when it is non-empty; poster
    /// and release date are replaced only when the metadata carries them.
    pub fn merged_with_metadata(&self, details: &MetadataMovie) -> MovieRecord {
        let overview = details.overview.clone().filter(|o| !o.is_empty());

        MovieRecord {
            id: self.id,
            title: details.title.clone(),
            poster_path: details.poster_path.clone().or_else(|| self.poster_path.clone()),
            release_date: details
                .release_date
                .clone()
                .or_else(|| self.release_date.clone()),
            description: overview.clone().or_else(|| self.description.clone()),
            overview: overview.or_else(|| self.overview.clone()),
            ..self.clone()
        }
    }
}

impl Display for MovieRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title, self.year)
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Pagination metadata of a page envelope
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub page: u32,
    #[serde(rename = "limit")]
    pub page_size: u32,
    #[serde(rename = "total")]
    pub total_items: u64,
    pub total_pages: u32,
}

/// One fetched page of movies: `{ data, meta }` on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageResult {
    #[serde(rename = "data", default)]
    pub items: Vec<MovieRecord>,
    pub meta: PageMeta,
}

impl PageResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What the catalog is currently asking the backend for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParameters {
    /// Empty means browse mode
    pub search_term: String,
    pub page: u32,
    pub page_size: u32,
}

impl QueryParameters {
    pub fn new(page_size: u32) -> Self {
        Self {
            search_term: String::new(),
            page: 1,
            page_size,
        }
    }

    pub fn is_search(&self) -> bool {
        !self.search_term.is_empty()
    }
}

/// Movies sharing an index letter, in the order they appeared on the page
#[derive(Debug, Clone, PartialEq)]
pub struct LetterGroup {
    /// `'A'..='Z'` or `'#'`
    pub letter: char,
    pub members: Vec<MovieRecord>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn movie(id: u64, title: &str) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            year: 2000,
            rating: 0.0,
            poster_path: None,
            image_path: None,
            description: None,
            overview: None,
            release_date: None,
            external_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn page(titles: &[&str], page: u32, total_pages: u32) -> PageResult {
        PageResult {
            items: titles
                .iter()
                .enumerate()
                .map(|(i, t)| movie(i as u64 + 1, t))
                .collect(),
            meta: PageMeta {
                page,
                page_size: 20,
                total_items: titles.len() as u64,
                total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_envelope_deserializes_wire_names() {
        let json = r#"{
            "data": [{"id": 1, "title": "Avatar", "year": 2009, "rating": 4.5,
                      "poster_path": "/avatar.jpg", "tmdb_id": "19995",
                      "created_at": "2024-03-01T12:00:00Z"}],
            "meta": {"page": 1, "limit": 20, "total": 1, "total_pages": 1}
        }"#;

        let page: PageResult = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Avatar");
        assert_eq!(page.items[0].external_id, Some("19995".to_string()));
        assert!(page.items[0].created_at.is_some());
        assert_eq!(page.meta.page_size, 20);
        assert_eq!(page.meta.total_items, 1);
        assert_eq!(page.meta.total_pages, 1);
    }

    #[test]
    fn test_missing_optional_fields_default_to_none() {
        let json = r#"{"id": 7, "title": "Heat", "year": 1995}"#;
        let movie: MovieRecord = serde_json::from_str(json).unwrap();
        assert_eq!(movie.rating, 0.0);
        assert_eq!(movie.description, None);
        assert_eq!(movie.updated_at, None);
    }

    #[test]
    fn test_malformed_page_is_rejected() {
        let json = r#"{"data": [{"id": "one", "title": 3}], "meta": {}}"#;
        assert!(serde_json::from_str::<PageResult>(json).is_err());
    }

    #[test]
    fn test_poster_url_prefers_poster_path() {
        let mut movie = fixtures::movie(1, "Alien");
        assert_eq!(movie.poster_url(), None);

        movie.image_path = Some("/upload.png".to_string());
        assert_eq!(
            movie.poster_url(),
            Some(format!("{}/upload.png", POSTER_BASE_URL))
        );

        movie.poster_path = Some("/alien.jpg".to_string());
        assert_eq!(
            movie.poster_url(),
            Some(format!("{}/alien.jpg", POSTER_BASE_URL))
        );
    }

    #[test]
    fn test_poster_url_skips_empty_paths() {
        let mut movie = fixtures::movie(1, "Alien");
        movie.poster_path = Some(String::new());
        assert_eq!(movie.poster_url(), None);
    }

    #[test]
    fn test_merge_keeps_identity_and_prefers_metadata_overview() {
        let mut movie = fixtures::movie(42, "Old Title");
        movie.description = Some("old description".to_string());
        movie.rating = 4.0;
        movie.external_id = Some("603".to_string());

        let details = MetadataMovie {
            id: 603,
            title: "The Matrix".to_string(),
            poster_path: Some("/matrix.jpg".to_string()),
            release_date: Some("1999-03-30".to_string()),
            vote_average: Some(8.2),
            media_type: None,
            overview: Some("A hacker learns the truth.".to_string()),
            credits: None,
        };

        let merged = movie.merged_with_metadata(&details);
        assert_eq!(merged.id, 42);
        assert_eq!(merged.title, "The Matrix");
        assert_eq!(merged.rating, 4.0);
        assert_eq!(merged.description.as_deref(), Some("A hacker learns the truth."));
        assert_eq!(merged.poster_path.as_deref(), Some("/matrix.jpg"));
    }

    #[test]
    fn test_merge_keeps_description_when_overview_empty() {
        let mut movie = fixtures::movie(1, "Heat");
        movie.description = Some("LA crime saga".to_string());

        let details = MetadataMovie {
            id: 949,
            title: "Heat".to_string(),
            poster_path: None,
            release_date: None,
            vote_average: None,
            media_type: None,
            overview: Some(String::new()),
            credits: None,
        };

        let merged = movie.merged_with_metadata(&details);
        assert_eq!(merged.description.as_deref(), Some("LA crime saga"));
        assert_eq!(merged.overview, None);
    }

    #[test]
    fn test_new_parameters_start_in_browse_mode() {
        let params = QueryParameters::new(20);
        assert!(!params.is_search());
        assert_eq!(params.page, 1);
    }
}
