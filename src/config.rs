//! Compile-time settings and the couple of knobs read from the environment.

use std::{env, path::PathBuf, str::FromStr};

use log::LevelFilter;

pub const FRAMES_PER_SECOND: u32 = 24;
pub const GOPHER_PNG: &str = "res/drawable/gopher.png";

pub const WINDOW_TITLE: &str = "Gopher";
pub const WINDOW_WIDTH: u32 = 480;
pub const WINDOW_HEIGHT: u32 = 800;

/// Log level filter, e.g. `debug` or `warn`.
pub const LOG_ENV: &str = "GOPHER_LOG";
/// Directory to read assets from instead of the embedded `res/`.
pub const ASSETS_ENV: &str = "GOPHER_ASSETS";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: LevelFilter,
    pub asset_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Info,
            asset_root: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(env::var(LOG_ENV).ok(), env::var(ASSETS_ENV).ok())
    }

    fn from_vars(log_level: Option<String>, asset_root: Option<String>) -> Self {
        let default = Self::default();
        Self {
            log_level: log_level
                .and_then(|level| LevelFilter::from_str(level.trim()).ok())
                .unwrap_or(default.log_level),
            asset_root: asset_root
                .filter(|root| !root.is_empty())
                .map(PathBuf::from),
        }
    }
}
