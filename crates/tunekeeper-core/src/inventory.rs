use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::media::{MediaLibrary, Track, TrackId};

/// Snapshot of the library's tracks, indexed by file path and by folder.
///
/// Rebuilt from the media library whenever a stage needs a fresh view; never
/// persisted.
#[derive(Debug, Default)]
pub struct Inventory {
    tracks: Vec<Track>,
    by_path: HashMap<PathBuf, TrackId>,
    by_folder: HashMap<PathBuf, Vec<Track>>,
    duplicates: Vec<Track>,
}

impl Inventory {
    /// Enumerate the library and index every track.
    pub fn load<L: MediaLibrary + ?Sized>(library: &L) -> Result<Self> {
        let inventory = Self::from_tracks(library.tracks()?);
        debug!(
            "Inventory: {} tracks in {} folders",
            inventory.len(),
            inventory.by_folder.len()
        );
        Ok(inventory)
    }

    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut by_path: HashMap<PathBuf, TrackId> = HashMap::new();
        let mut by_folder: HashMap<PathBuf, Vec<Track>> = HashMap::new();
        let mut duplicates = Vec::new();

        for track in &tracks {
            let Some(path) = track.resolved_path() else {
                continue;
            };
            if by_path.contains_key(path) {
                duplicates.push(track.clone());
                continue;
            }
            by_path.insert(path.to_path_buf(), track.id.clone());
            if let Some(folder) = path.parent() {
                by_folder
                    .entry(folder.to_path_buf())
                    .or_default()
                    .push(track.clone());
            }
        }

        Self {
            tracks,
            by_path,
            by_folder,
            duplicates,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.by_path.contains_key(path)
    }

    pub fn track_at(&self, path: &Path) -> Option<&Track> {
        let id = self.by_path.get(path)?;
        self.tracks.iter().find(|t| &t.id == id)
    }

    /// Tracks whose file sits directly in `folder`, in library order.
    pub fn tracks_in(&self, folder: &Path) -> &[Track] {
        self.by_folder
            .get(folder)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Tracks whose location cannot be resolved to a file path.
    pub fn unresolved(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(|t| t.resolved_path().is_none())
    }

    /// Tracks sharing a location with an earlier track.
    pub fn duplicates(&self) -> &[Track] {
        &self.duplicates
    }

    /// Drop a track from every index.
    pub fn remove(&mut self, id: &TrackId) -> Option<Track> {
        let index = self.tracks.iter().position(|t| &t.id == id)?;
        let track = self.tracks.remove(index);

        if let Some(path) = track.resolved_path() {
            if self.by_path.get(path) == Some(id) {
                self.by_path.remove(path);
            }
            if let Some(folder) = path.parent() {
                if let Some(in_folder) = self.by_folder.get_mut(folder) {
                    in_folder.retain(|t| &t.id != id);
                    if in_folder.is_empty() {
                        self.by_folder.remove(folder);
                    }
                }
            }
        }
        self.duplicates.retain(|t| &t.id != id);

        Some(track)
    }
}
