//! Quake Catalogue Viewer: browse QuakeML earthquake catalogues on a map
//! and in a sortable table, with selection linked between the two.

pub mod data;
mod app;
mod entrypoints;

pub use app::QuakeCatalogueApp;
pub use entrypoints::run_native;
