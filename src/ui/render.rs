use crate::{
    models::{LetterGroup, MetadataMovie, MovieRecord},
    services::{CatalogViewModel, FetchState},
};

fn movie_line(movie: &MovieRecord) -> String {
    if movie.rating > 0.0 {
        format!("  [{}] {}  *{:.1}", movie.id, movie, movie.rating)
    } else {
        format!("  [{}] {}", movie.id, movie)
    }
}

fn index_line(catalog: &CatalogViewModel) -> String {
    catalog
        .alphabet_index()
        .iter()
        .map(|entry| match (entry.available, entry.active) {
            (true, true) => format!("[{}]", entry.letter),
            (true, false) => entry.letter.to_string(),
            (false, _) => "·".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One letter section of the grouped list
pub fn render_group(group: &LetterGroup) -> String {
    std::iter::once(format!("-- {} --", group.letter))
        .chain(group.members.iter().map(movie_line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text rendering of the catalog's visible state
///
/// Loading, failure and "no results" each get their own message so they can never be
/// mistaken for one another.
pub fn render_catalog(catalog: &CatalogViewModel) -> String {
    let page = match catalog.state() {
        FetchState::Idle => return "Nothing loaded yet".to_string(),
        FetchState::Loading => return "Loading...".to_string(),
        FetchState::Failed(message) => return format!("Error: {}", message),
        FetchState::Success(page) => page,
    };

    let term = &catalog.params().search_term;
    let mut lines = Vec::new();

    if catalog.is_search_mode() {
        lines.push(format!(
            "Results for \"{}\" ({} found)",
            term, page.meta.total_items
        ));
    }

    if page.is_empty() {
        lines.push(if catalog.is_search_mode() {
            format!("No movies found for \"{}\"", term)
        } else {
            "No movies in the collection".to_string()
        });
    } else if catalog.is_search_mode() {
        lines.extend(page.items.iter().map(movie_line));
    } else {
        lines.extend(catalog.grouped_by_letter().iter().map(render_group));
        lines.push(index_line(catalog));
    }

    if page.meta.total_pages > 1 {
        lines.push(format!(
            "Page {} of {}",
            catalog.params().page,
            page.meta.total_pages
        ));
    }

    lines.join("\n")
}

/// Detail view of a single movie
pub fn render_movie(movie: &MovieRecord) -> String {
    let mut lines = vec![movie.to_string()];

    if movie.rating > 0.0 {
        lines.push(format!("Rating: {:.1}", movie.rating));
    }
    fn non_empty(text: &Option<String>) -> Option<&str> {
        text.as_deref().filter(|t| !t.is_empty())
    }
    if let Some(text) = non_empty(&movie.description).or(non_empty(&movie.overview)) {
        lines.push(text.to_string());
    }
    if let Some(url) = movie.poster_url() {
        lines.push(format!("Poster: {}", url));
    }
    if let Some(id) = movie.external_id.as_deref().filter(|id| !id.is_empty()) {
        lines.push(format!("TMDB: {}", id));
    }

    lines.join("\n")
}

/// A metadata search hit, as offered before adding it
pub fn render_metadata(movie: &MetadataMovie) -> String {
    let mut line = match movie.release_year() {
        Some(year) => format!("{} ({})", movie.title, year),
        None => movie.title.clone(),
    };
    let directors = movie.directors();
    if !directors.is_empty() {
        line.push_str(&format!(", directed by {}", directors.join(" & ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::AppError;
    use crate::models::fixtures;
    use crate::models::PageResult;
    use crate::services::providers::MockCatalogBackend;
    use std::sync::Arc;

    async fn loaded(page: PageResult, search: Option<&str>) -> CatalogViewModel {
        let mut mock = MockCatalogBackend::new();
        mock.expect_name().return_const("mock");
        let browse = page.clone();
        mock.expect_list_movies()
            .returning(move |_, _| Ok(browse.clone()));
        mock.expect_search_movies()
            .returning(move |_, _, _| Ok(page.clone()));

        let mut catalog = CatalogViewModel::new(Arc::new(mock), &Config::default());
        match search {
            Some(term) => {
                catalog.set_search_term(term);
                catalog.submit_search();
            }
            None => catalog.mount(),
        }
        catalog.settle().await;
        catalog
    }

    #[tokio::test]
    async fn test_browse_rendering_groups_and_index() {
        let catalog = loaded(fixtures::page(&["Alien", "Brazil", "Heat"], 1, 1), None).await;
        let text = render_catalog(&catalog);

        assert!(text.contains("-- A --\n  [1] Alien (2000)"));
        assert!(text.contains("-- B --"));
        assert!(text.contains("· A B · · · · · H ·"));
        assert!(!text.contains("Page"));
    }

    #[tokio::test]
    async fn test_search_rendering_is_flat() {
        let catalog = loaded(fixtures::page(&["Batman", "Batman Returns"], 1, 1), Some("bat")).await;
        let text = render_catalog(&catalog);

        assert!(text.starts_with("Results for \"bat\" (2 found)"));
        assert!(!text.contains("-- B --"));
        assert!(text.contains("[2] Batman Returns"));
    }

    #[tokio::test]
    async fn test_empty_states_differ_by_mode() {
        let browse = loaded(fixtures::page(&[], 1, 1), None).await;
        assert_eq!(render_catalog(&browse), "No movies in the collection");

        let search = loaded(fixtures::page(&[], 1, 1), Some("zzz")).await;
        assert!(render_catalog(&search).ends_with("No movies found for \"zzz\""));
    }

    #[tokio::test]
    async fn test_failure_and_pagination_rendering() {
        let mut mock = MockCatalogBackend::new();
        mock.expect_name().return_const("mock");
        mock.expect_list_movies()
            .returning(|_, _| Err(AppError::Transport("Network down".to_string())));
        let mut catalog = CatalogViewModel::new(Arc::new(mock), &Config::default());
        assert_eq!(render_catalog(&catalog), "Nothing loaded yet");
        catalog.mount();
        assert_eq!(render_catalog(&catalog), "Loading...");
        catalog.settle().await;
        assert_eq!(render_catalog(&catalog), "Error: Network down");

        let paged = loaded(fixtures::page(&["Alien"], 1, 4), None).await;
        assert!(render_catalog(&paged).ends_with("Page 1 of 4"));
    }

    #[test]
    fn test_metadata_hit() {
        let hit: MetadataMovie = serde_json::from_str(
            r#"{
                "id": 603, "title": "The Matrix", "release_date": "1999-03-31",
                "credits": { "cast": [], "crew": [
                    {"name": "Lana Wachowski", "job": "Director"},
                    {"name": "Lilly Wachowski", "job": "Director"},
                    {"name": "Bill Pope", "job": "Director of Photography"}
                ]}
            }"#,
        )
        .unwrap();
        assert_eq!(
            render_metadata(&hit),
            "The Matrix (1999), directed by Lana Wachowski & Lilly Wachowski"
        );

        let bare: MetadataMovie = serde_json::from_str(r#"{"id": 1, "title": "Primer"}"#).unwrap();
        assert_eq!(render_metadata(&bare), "Primer");
    }

    #[test]
    fn test_movie_detail() {
        let mut movie = fixtures::movie(3, "Heat");
        movie.rating = 4.5;
        movie.description = Some(String::new());
        movie.overview = Some("LA crime saga".to_string());
        movie.external_id = Some("949".to_string());

        let text = render_movie(&movie);
        assert!(text.starts_with("Heat (2000)\nRating: 4.5"));
        assert!(text.contains("\nLA crime saga\n"));
        assert!(text.ends_with("TMDB: 949"));
    }
}
