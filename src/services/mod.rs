pub mod catalog;
pub mod editor;
pub mod grouping;
pub mod providers;

pub use catalog::{CatalogViewModel, FetchState, IndexEntry, InvalidationHandle, Update};
pub use editor::CatalogEditor;
pub use providers::{CatalogBackend, HttpCatalogBackend};
