//! Capability interface onto the media application.
//!
//! Everything the pipeline needs from the application goes through
//! [`MediaLibrary`]: enumerate tracks, playlists and devices; add and delete
//! tracks; create, fill and delete playlists; trigger device sync. How a given
//! application is reached is up to the implementation.
//!
//! Two implementations ship with the crate:
//! - [`MemoryLibrary`] keeps everything in memory and can simulate an
//!   application that is slow to reflect playlist deletions.
//! - [`TomlLibrary`] persists the same state to a TOML document.

mod memory;
mod state;
mod toml_store;

pub use memory::MemoryLibrary;
pub use state::{LibraryState, StoredDevice, StoredPlaylist};
pub use toml_store::TomlLibrary;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    #[error("Device not found: {0}")]
    DeviceNotFound(DeviceId),

    #[error("Library already has a track at {}", .0.display())]
    DuplicateTrack(PathBuf),

    #[error("Library store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MediaResult<T> = std::result::Result<T, MediaError>;

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

opaque_id!(TrackId);
opaque_id!(PlaylistId);
opaque_id!(DeviceId);

/// A file track as the application reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    /// Recorded file location. The application may have lost it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: String,
    /// 0–100, 20 per star.
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub track_number: u32,
}

impl Track {
    /// The track's location if it is an absolute path to a named file.
    pub fn resolved_path(&self) -> Option<&Path> {
        self.location
            .as_deref()
            .filter(|p| p.is_absolute() && p.file_name().is_some() && p.parent().is_some())
    }

    /// Folder containing the track, when its location resolves.
    pub fn folder(&self) -> Option<&Path> {
        self.resolved_path().and_then(Path::parent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
}

/// An attached portable device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
}

pub trait MediaLibrary {
    /// Every file track in the library.
    fn tracks(&self) -> MediaResult<Vec<Track>>;

    fn playlists(&self) -> MediaResult<Vec<Playlist>>;

    /// Attached device sources only.
    fn devices(&self) -> MediaResult<Vec<Device>>;

    /// Remove the track record. The backing file is left alone.
    fn delete_track(&mut self, id: &TrackId) -> MediaResult<()>;

    /// Register the file at `path` as a new track.
    fn add_track(&mut self, path: &Path) -> MediaResult<TrackId>;

    fn create_playlist(&mut self, name: &str) -> MediaResult<PlaylistId>;

    fn delete_playlist(&mut self, id: &PlaylistId) -> MediaResult<()>;

    /// Append a track to a playlist. The track stays in the library.
    fn add_to_playlist(&mut self, playlist: &PlaylistId, track: &TrackId) -> MediaResult<()>;

    fn sync_device(&mut self, id: &DeviceId) -> MediaResult<()>;

    /// Persist changes made since the last flush. Called after every
    /// mutating stage.
    fn flush(&mut self) -> MediaResult<()> {
        Ok(())
    }
}
