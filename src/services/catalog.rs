//! Catalog view-model
//!
//! [`CatalogViewModel`] is the single source of truth for which movies are visible and how they
//! are arranged. It owns the query parameters, issues list/search requests, keeps the fetched
//! page, and derives the alphabetical grouping and index from it.
//!
//! Fetches run as spawned tasks and report back over a channel. Every request is tagged with a
//! sequence number; a completion only updates visible state if its sequence number is still the
//! active one, so a slow response to superseded parameters is discarded on arrival. The owner
//! drives completions with [`CatalogViewModel::process_next`] or [`CatalogViewModel::settle`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    cache::{CacheKey, QueryCache},
    config::Config,
    error::{AppError, AppResult},
    models::{LetterGroup, MovieRecord, PageResult, QueryParameters},
    services::{
        grouping::{self, ALPHABET},
        providers::CatalogBackend,
    },
};

/// Fetch lifecycle: `Idle -> Loading -> Success | Failed`
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Idle,
    Loading,
    Success(PageResult),
    Failed(String),
}

/// Outcome of handling one catalog event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// A completion became the visible state
    Applied,
    /// A completion for superseded parameters was dropped
    Discarded,
    /// An external invalidation started a refetch
    Invalidated,
}

/// One entry of the alphabet index shown next to the grouped list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub letter: char,
    pub available: bool,
    pub active: bool,
}

enum CatalogEvent {
    Fetched {
        seq: u64,
        key: CacheKey,
        result: Result<PageResult, String>,
    },
    Invalidate,
}

/// Cloneable handle that lets mutation collaborators invalidate the catalog they don't own
#[derive(Clone)]
pub struct InvalidationHandle {
    events_tx: mpsc::UnboundedSender<CatalogEvent>,
}

impl InvalidationHandle {
    /// Ask the catalog to refetch; picked up on its next `process_next`/`settle`
    pub fn invalidate(&self) {
        if self.events_tx.send(CatalogEvent::Invalidate).is_err() {
            tracing::warn!("Catalog is gone, invalidation dropped");
        }
    }
}

pub struct CatalogViewModel {
    backend: Arc<dyn CatalogBackend>,
    cache: QueryCache,
    staged_term: String,
    params: QueryParameters,
    state: FetchState,
    known_total_pages: Option<u32>,
    next_seq: u64,
    /// Sequence number whose completion defines visible state
    active: Option<u64>,
    /// Latest issued request per query identity
    in_flight: HashMap<CacheKey, u64>,
    selected: Option<MovieRecord>,
    current_letter: Option<char>,
    events_tx: mpsc::UnboundedSender<CatalogEvent>,
    events_rx: mpsc::UnboundedReceiver<CatalogEvent>,
}

impl CatalogViewModel {
    pub fn new(backend: Arc<dyn CatalogBackend>, config: &Config) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            backend,
            cache: QueryCache::new(config.stale_time(), config.gc_time()),
            staged_term: String::new(),
            params: QueryParameters::new(config.page_size),
            state: FetchState::Idle,
            known_total_pages: None,
            next_seq: 0,
            active: None,
            in_flight: HashMap::new(),
            selected: None,
            current_letter: None,
            events_tx,
            events_rx,
        }
    }

    /// Issue the initial fetch. Does nothing once the catalog has left `Idle`.
    pub fn mount(&mut self) {
        if matches!(self.state, FetchState::Idle) {
            self.fetch(false);
        }
    }

    pub fn invalidation_handle(&self) -> InvalidationHandle {
        InvalidationHandle {
            events_tx: self.events_tx.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Stage a search string without touching the active query
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.staged_term = term.into();
    }

    /// Commit the staged term and go back to page 1. An empty term means browse mode.
    pub fn submit_search(&mut self) {
        if self.params.search_term != self.staged_term {
            self.params.search_term = self.staged_term.clone();
            self.known_total_pages = None;
            self.current_letter = None;
        }
        self.params.page = 1;

        tracing::info!(
            search_term = %self.params.search_term,
            "Search submitted"
        );
        self.fetch(false);
    }

    pub fn clear_search(&mut self) {
        self.staged_term.clear();
        self.submit_search();
    }

    /// Move to page `page`; rejected without side effects when outside `1..=total_pages`
    pub fn set_page(&mut self, page: u32) -> AppResult<()> {
        let out_of_range = page < 1 || self.known_total_pages.is_some_and(|total| page > total);
        if out_of_range {
            tracing::warn!(
                page,
                total_pages = ?self.known_total_pages,
                "Rejected out-of-range page"
            );
            return Err(AppError::InvalidInput(format!(
                "page {} is outside 1..={}",
                page,
                self.known_total_pages.unwrap_or(1)
            )));
        }

        self.params.page = page;
        self.fetch(false);
        Ok(())
    }

    /// Mark cached pages stale and refetch the current parameters
    ///
    /// Call after any successful mutation that could change list membership or ordering.
    /// Every request already in flight, for any parameters, may have been answered before the
    /// mutation landed: none of them can be joined later or write the cache.
    pub fn invalidate(&mut self) {
        self.cache.invalidate_all();
        self.in_flight.clear();
        tracing::debug!(
            key = %CacheKey::from(&self.params),
            cached = self.cache.len(),
            "Catalog invalidated"
        );
        self.fetch(true);
    }

    /// Open the detail view for a movie on the current page
    pub fn select_movie(&mut self, id: u64) -> Option<&MovieRecord> {
        self.selected = self
            .page_result()
            .and_then(|page| page.items.iter().find(|movie| movie.id == id))
            .cloned();
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Jump to an index letter. Only letters present on the current page can be selected.
    pub fn select_letter(&mut self, letter: char) -> bool {
        let letter = letter.to_ascii_uppercase();
        if self.available_letters().contains(&letter) {
            self.current_letter = Some(letter);
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------------
    // Event handling
    // ------------------------------------------------------------------------

    /// Wait for the next fetch completion or invalidation and apply it
    ///
    /// Returns `None` only if the event channel has closed, which cannot happen while the
    /// view-model holds its own sender.
    pub async fn process_next(&mut self) -> Option<Update> {
        let event = self.events_rx.recv().await?;
        Some(self.apply(event))
    }

    /// Apply everything already queued, then wait until the catalog is no longer loading
    pub async fn settle(&mut self) {
        loop {
            while let Ok(event) = self.events_rx.try_recv() {
                self.apply(event);
            }
            if !self.is_loading() {
                break;
            }
            match self.events_rx.recv().await {
                Some(event) => {
                    self.apply(event);
                }
                None => break,
            }
        }
    }

    fn apply(&mut self, event: CatalogEvent) -> Update {
        match event {
            CatalogEvent::Invalidate => {
                self.invalidate();
                Update::Invalidated
            }
            CatalogEvent::Fetched { seq, key, result } => {
                // Only the latest request for a key may populate the cache; an older one
                // could predate a mutation.
                if self.in_flight.get(&key) == Some(&seq) {
                    self.in_flight.remove(&key);
                    if let Ok(page) = &result {
                        self.cache.insert(key.clone(), page.clone());
                    }
                }

                if self.active != Some(seq) {
                    tracing::debug!(key = %key, seq, "Discarding superseded response");
                    return Update::Discarded;
                }
                self.active = None;

                match result {
                    Ok(page) => {
                        tracing::info!(
                            key = %key,
                            results = page.items.len(),
                            total = page.meta.total_items,
                            total_pages = page.meta.total_pages,
                            "Catalog page loaded"
                        );
                        self.show(page);
                    }
                    Err(message) => {
                        tracing::error!(key = %key, error = %message, "Catalog fetch failed");
                        self.state = FetchState::Failed(message);
                    }
                }
                Update::Applied
            }
        }
    }

    fn fetch(&mut self, force: bool) {
        let key = CacheKey::from(&self.params);

        if !force {
            if let Some(page) = self.cache.fresh(&key).cloned() {
                tracing::debug!(key = %key, "Serving fresh cached page");
                self.active = None;
                self.show(page);
                return;
            }

            if let Some(&seq) = self.in_flight.get(&key) {
                tracing::debug!(key = %key, seq, "Joining in-flight request");
                self.active = Some(seq);
                self.state = FetchState::Loading;
                return;
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight.insert(key.clone(), seq);
        self.active = Some(seq);
        self.state = FetchState::Loading;

        let backend = Arc::clone(&self.backend);
        let params = self.params.clone();
        let events_tx = self.events_tx.clone();

        tracing::debug!(key = %key, seq, backend = backend.name(), "Fetching catalog page");

        tokio::spawn(async move {
            let result = if params.is_search() {
                backend
                    .search_movies(&params.search_term, params.page, params.page_size)
                    .await
            } else {
                backend.list_movies(params.page, params.page_size).await
            };

            let event = CatalogEvent::Fetched {
                seq,
                key,
                result: result.map_err(|e| e.to_string()),
            };
            if events_tx.send(event).is_err() {
                tracing::debug!(seq, "Catalog dropped before fetch completed");
            }
        });
    }

    fn show(&mut self, page: PageResult) {
        self.known_total_pages = Some(page.meta.total_pages.max(1));
        self.state = FetchState::Success(page);

        if let Some(letter) = self.current_letter {
            if !self.available_letters().contains(&letter) {
                self.current_letter = None;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------------

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn params(&self) -> &QueryParameters {
        &self.params
    }

    pub fn staged_term(&self) -> &str {
        &self.staged_term
    }

    pub fn is_search_mode(&self) -> bool {
        self.params.is_search()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FetchState::Loading)
    }

    pub fn page_result(&self) -> Option<&PageResult> {
        match &self.state {
            FetchState::Success(page) => Some(page),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// True only for a successful fetch with zero items
    pub fn is_empty(&self) -> bool {
        self.page_result().is_some_and(PageResult::is_empty)
    }

    /// Total pages of the most recently shown result for the current search term
    pub fn total_pages(&self) -> Option<u32> {
        self.known_total_pages
    }

    /// Letter groups of the current page; empty in search mode
    pub fn grouped_by_letter(&self) -> Vec<LetterGroup> {
        if self.is_search_mode() {
            return Vec::new();
        }
        self.page_result()
            .map(|page| grouping::group_by_letter(&page.items))
            .unwrap_or_default()
    }

    /// Index letters present on the current page; empty in search mode
    pub fn available_letters(&self) -> BTreeSet<char> {
        grouping::available_letters(&self.grouped_by_letter())
    }

    /// Full `#A-Z` index with availability; suppressed in search mode
    pub fn alphabet_index(&self) -> Vec<IndexEntry> {
        if self.is_search_mode() {
            return Vec::new();
        }
        let available = self.available_letters();
        ALPHABET
            .chars()
            .map(|letter| IndexEntry {
                letter,
                available: available.contains(&letter),
                active: self.current_letter == Some(letter),
            })
            .collect()
    }

    pub fn current_letter(&self) -> Option<char> {
        self.current_letter
    }

    pub fn selected_movie(&self) -> Option<&MovieRecord> {
        self.selected.as_ref()
    }
}
