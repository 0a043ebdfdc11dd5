use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dvd_catalog::{
    config::Config,
    error::{AppError, AppResult},
    models::MovieRecord,
    services::{CatalogBackend, CatalogEditor, CatalogViewModel, HttpCatalogBackend},
    ui::{render_catalog, render_group, render_metadata, render_movie, Command, HELP},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dvd_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let backend: Arc<dyn CatalogBackend> = Arc::new(HttpCatalogBackend::from_config(&config)?);

    tracing::info!(
        backend_url = %config.backend_url,
        page_size = config.page_size,
        "Starting catalog client"
    );

    let mut catalog = CatalogViewModel::new(backend.clone(), &config);
    let editor = CatalogEditor::new(backend.clone(), catalog.invalidation_handle());

    catalog.mount();
    catalog.settle().await;
    println!("{}", render_catalog(&catalog));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match run(command, &mut catalog, &editor, backend.as_ref()).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("{}", e),
        }
    }

    Ok(())
}

/// Execute one command. Returns `false` when the user asked to quit.
async fn run(
    command: Command,
    catalog: &mut CatalogViewModel,
    editor: &CatalogEditor,
    backend: &dyn CatalogBackend,
) -> AppResult<bool> {
    match command {
        Command::Search(term) => {
            catalog.set_search_term(term);
            catalog.submit_search();
        }
        Command::Clear => catalog.clear_search(),
        Command::Page(page) => catalog.set_page(page)?,
        Command::Next => catalog.set_page(catalog.params().page + 1)?,
        Command::Prev => catalog.set_page(catalog.params().page.saturating_sub(1))?,
        Command::Letter(letter) => {
            if !catalog.select_letter(letter) {
                return Err(AppError::NotFound(format!(
                    "no movies under '{}' on this page",
                    letter
                )));
            }
            let section = catalog
                .grouped_by_letter()
                .into_iter()
                .find(|group| Some(group.letter) == catalog.current_letter());
            if let Some(group) = section {
                println!("{}", render_group(&group));
            }
            return Ok(true);
        }
        Command::Show(id) => {
            println!("{}", render_movie(&movie_on_page(catalog, id)?));
            return Ok(true);
        }
        Command::Rate(id, rating) => {
            let mut movie = movie_on_page(catalog, id)?;
            movie.rating = rating;
            let saved = editor.save(&movie).await?;
            println!("Saved {}", saved);
        }
        Command::Sync(id) => {
            let movie = movie_on_page(catalog, id)?;
            let merged = editor.refresh_from_metadata(&movie).await?;
            let saved = editor.save(&merged).await?;
            println!("{}", render_movie(&saved));
        }
        Command::Refresh => catalog.invalidate(),
        Command::Add(query) => {
            let results = editor.search_metadata(&query).await?;
            let hit = results
                .first()
                .ok_or_else(|| AppError::NotFound(format!("no metadata match for \"{}\"", query)))?;
            println!("Adding {}", render_metadata(hit));
            let created = editor.add_from_metadata(hit, 0.0).await?;
            println!("Added {}", created);
        }
        Command::Delete(id) => {
            editor.delete(id).await?;
            catalog.clear_selection();
            println!("Deleted movie {}", id);
        }
        Command::Version => {
            println!("Backend version {}", backend.fetch_version().await?);
            return Ok(true);
        }
        Command::Help => {
            println!("{}", HELP);
            return Ok(true);
        }
        Command::Quit => return Ok(false),
    }

    catalog.settle().await;
    println!("{}", render_catalog(catalog));
    Ok(true)
}

fn movie_on_page(catalog: &mut CatalogViewModel, id: u64) -> AppResult<MovieRecord> {
    catalog
        .select_movie(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("no movie {} on this page", id)))
}
