// ============================================================================
// Metadata provider (TMDB) types, proxied through the catalog backend
// ============================================================================

use serde::{Deserialize, Serialize};

/// A movie as described by the external metadata provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub credits: Option<Credits>,
}

impl MetadataMovie {
    /// Release year taken from the leading `YYYY` of the release date
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .and_then(|year| year.parse().ok())
    }

    /// Names of the crew members credited as director
    pub fn directors(&self) -> Vec<&str> {
        self.credits
            .iter()
            .flat_map(|c| c.crew.iter())
            .filter(|member| member.job == "Director")
            .map(|member| member.name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub name: String,
    pub job: String,
}

/// Payload for `POST /movies`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub year: i32,
    pub image_path: Option<String>,
    pub poster_path: Option<String>,
    pub tmdb_id: String,
    pub overview: String,
    pub release_date: Option<String>,
    pub rating: f64,
}

impl NewMovie {
    /// Build the create payload for a metadata hit and the user's own rating
    pub fn from_metadata(movie: &MetadataMovie, rating: f64) -> Self {
        let overview = movie.overview.clone().unwrap_or_default();

        Self {
            title: movie.title.clone(),
            description: overview.clone(),
            year: movie.release_year().unwrap_or(0),
            image_path: movie.poster_path.clone(),
            poster_path: movie.poster_path.clone(),
            tmdb_id: movie.id.to_string(),
            overview,
            release_date: movie.release_date.clone(),
            rating,
        }
    }
}
