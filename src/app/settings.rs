use crate::entrypoints::cli::parse_args;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Quake Catalogue Viewer - Browse QuakeML earthquake catalogues on a map and in a table
pub struct Settings {
    /// QuakeML catalogue to open on startup
    #[clap(value_name = "FILE")]
    pub catalogue: Option<PathBuf>,

    /// Directory where downloaded map tiles are cached
    #[clap(long, value_name = "DIR", default_value = "cache")]
    pub tile_cache: PathBuf,

    /// Do not ask for proxy settings on startup
    #[clap(long, default_value = "false")]
    pub skip_proxy_prompt: bool,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    /// Parse settings from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::parse_from(["quake-catalogue-viewer"]);
        assert_eq!(settings.catalogue, None);
        assert_eq!(settings.tile_cache, PathBuf::from("cache"));
        assert!(!settings.skip_proxy_prompt);
        assert!(!settings.ignore_persisted);
    }

    #[test]
    fn test_catalogue_and_flags() {
        let settings = Settings::parse_from([
            "quake-catalogue-viewer",
            "events.xml",
            "--tile-cache",
            "/tmp/tiles",
            "--skip-proxy-prompt",
        ]);
        assert_eq!(settings.catalogue, Some(PathBuf::from("events.xml")));
        assert_eq!(settings.tile_cache, PathBuf::from("/tmp/tiles"));
        assert!(settings.skip_proxy_prompt);
    }
}
