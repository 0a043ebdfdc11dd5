//! Terminal front-end bindings for the catalog view-model

pub mod command;
pub mod render;

pub use command::{Command, HELP};
pub use render::{render_catalog, render_group, render_metadata, render_movie};
