//! Client for a personal DVD collection backend
//!
//! The heart of the crate is [`services::CatalogViewModel`], which fetches, paginates, searches
//! and groups the movie list and keeps it in sync with mutations made through
//! [`services::CatalogEditor`]. The [`ui`] module binds both to a line-based terminal front-end.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod ui;
