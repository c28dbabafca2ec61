use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{
    Device, DeviceId, MediaError, MediaResult, Playlist, PlaylistId, Track, TrackId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPlaylist {
    pub id: PlaylistId,
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<TrackId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDevice {
    pub id: DeviceId,
    pub name: String,
    /// RFC 3339 timestamp of the last sync, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<String>,
}

/// On-disk shape of [`LibraryState`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct LibraryDocument {
    next_id: u64,
    tracks: Vec<Track>,
    playlists: Vec<StoredPlaylist>,
    devices: Vec<StoredDevice>,
}

/// Tracks, playlists and devices of a library, shared by the in-memory and
/// TOML-backed implementations.
///
/// Tracks are indexed by id and by location. When a loaded document holds
/// two tracks at one location, the index points at the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LibraryDocument", into = "LibraryDocument")]
pub struct LibraryState {
    next_id: u64,
    tracks: Vec<Track>,
    playlists: Vec<StoredPlaylist>,
    devices: Vec<StoredDevice>,
    by_id: HashMap<TrackId, usize>,
    by_location: HashMap<PathBuf, usize>,
}

impl From<LibraryDocument> for LibraryState {
    fn from(doc: LibraryDocument) -> Self {
        let mut state = Self {
            next_id: doc.next_id,
            tracks: doc.tracks,
            playlists: doc.playlists,
            devices: doc.devices,
            by_id: HashMap::new(),
            by_location: HashMap::new(),
        };
        state.reindex();
        state
    }
}

impl From<LibraryState> for LibraryDocument {
    fn from(state: LibraryState) -> Self {
        Self {
            next_id: state.next_id,
            tracks: state.tracks,
            playlists: state.playlists,
            devices: state.devices,
        }
    }
}

impl LibraryState {
    fn issue_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        self.by_location.clear();
        for (i, track) in self.tracks.iter().enumerate() {
            self.by_id.entry(track.id.clone()).or_insert(i);
            if let Some(path) = &track.location {
                self.by_location.entry(path.clone()).or_insert(i);
            }
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.by_id.get(id).map(|&i| &self.tracks[i])
    }

    pub fn track_at(&self, path: &Path) -> Option<&Track> {
        self.by_location.get(path).map(|&i| &self.tracks[i])
    }

    /// Insert a track record as-is, issuing it an id.
    pub fn insert_track(
        &mut self,
        location: Option<PathBuf>,
        name: &str,
        artist: &str,
        rating: u8,
        track_number: u32,
    ) -> MediaResult<TrackId> {
        if let Some(path) = location.as_deref() {
            if self.track_at(path).is_some() {
                return Err(MediaError::DuplicateTrack(path.to_path_buf()));
            }
        }
        let id = TrackId(self.issue_id("T"));
        let index = self.tracks.len();
        self.by_id.insert(id.clone(), index);
        if let Some(path) = &location {
            self.by_location.insert(path.clone(), index);
        }
        self.tracks.push(Track {
            id: id.clone(),
            location,
            name: name.to_string(),
            artist: artist.to_string(),
            rating,
            track_number,
        });
        Ok(id)
    }

    /// Remove a track from the library and from every playlist holding it.
    pub fn remove_track(&mut self, id: &TrackId) -> MediaResult<()> {
        let before = self.tracks.len();
        self.tracks.retain(|t| &t.id != id);
        if self.tracks.len() == before {
            return Err(MediaError::TrackNotFound(id.clone()));
        }
        self.reindex();
        for playlist in &mut self.playlists {
            playlist.tracks.retain(|t| t != id);
        }
        Ok(())
    }

    pub fn playlists(&self) -> Vec<Playlist> {
        self.playlists
            .iter()
            .map(|p| Playlist {
                id: p.id.clone(),
                name: p.name.clone(),
            })
            .collect()
    }

    pub fn create_playlist(&mut self, name: &str) -> PlaylistId {
        let id = PlaylistId(self.issue_id("P"));
        self.playlists.push(StoredPlaylist {
            id: id.clone(),
            name: name.to_string(),
            tracks: Vec::new(),
        });
        id
    }

    pub fn has_playlist(&self, id: &PlaylistId) -> bool {
        self.playlists.iter().any(|p| &p.id == id)
    }

    pub fn remove_playlist(&mut self, id: &PlaylistId) -> MediaResult<()> {
        let before = self.playlists.len();
        self.playlists.retain(|p| &p.id != id);
        if self.playlists.len() == before {
            return Err(MediaError::PlaylistNotFound(id.clone()));
        }
        Ok(())
    }

    pub fn append_to_playlist(&mut self, playlist: &PlaylistId, track: &TrackId) -> MediaResult<()> {
        if self.track(track).is_none() {
            return Err(MediaError::TrackNotFound(track.clone()));
        }
        let target = self
            .playlists
            .iter_mut()
            .find(|p| &p.id == playlist)
            .ok_or_else(|| MediaError::PlaylistNotFound(playlist.clone()))?;
        target.tracks.push(track.clone());
        Ok(())
    }

    /// Tracks of the first playlist called `name`, in playlist order.
    pub fn playlist_tracks(&self, name: &str) -> Option<Vec<Track>> {
        let playlist = self.playlists.iter().find(|p| p.name == name)?;
        Some(
            playlist
                .tracks
                .iter()
                .filter_map(|id| self.track(id).cloned())
                .collect(),
        )
    }

    pub fn add_device(&mut self, name: &str) -> DeviceId {
        let id = DeviceId(self.issue_id("D"));
        self.devices.push(StoredDevice {
            id: id.clone(),
            name: name.to_string(),
            last_synced: None,
        });
        id
    }

    pub fn devices(&self) -> Vec<Device> {
        self.devices
            .iter()
            .map(|d| Device {
                id: d.id.clone(),
                name: d.name.clone(),
            })
            .collect()
    }

    pub fn device(&self, id: &DeviceId) -> Option<&StoredDevice> {
        self.devices.iter().find(|d| &d.id == id)
    }

    pub fn mark_synced(&mut self, id: &DeviceId, at: String) -> MediaResult<()> {
        let device = self
            .devices
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or_else(|| MediaError::DeviceNotFound(id.clone()))?;
        device.last_synced = Some(at);
        Ok(())
    }
}
