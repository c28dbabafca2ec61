use std::path::PathBuf;
use thiserror::Error;

use crate::media::MediaError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory scan error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("Media library error: {0}")]
    Media(#[from] MediaError),

    #[error("Could not move {} to the trash: {message}", path.display())]
    Trash { path: PathBuf, message: String },

    #[error("Failed to prune {}: {source}", path.display())]
    Prune {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("{count} rule violation(s) found, nothing was changed")]
    RulesBroken { count: usize },

    #[error("Generated playlists still present after {passes} deletion passes ({remaining} remaining)")]
    PlaylistsDidNotConverge { passes: usize, remaining: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
