// Shared modules
pub(crate) mod cli;
mod metadata;
mod profiling;
mod proxy;
mod run;

pub use metadata::short_version_info;
pub use profiling::profiling_ui;
pub use run::run_native;
