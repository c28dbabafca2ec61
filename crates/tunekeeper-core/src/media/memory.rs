use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{
    Device, DeviceId, LibraryState, MediaLibrary, MediaResult, Playlist, PlaylistId, Track,
    TrackId,
};

/// A deleted playlist the library keeps reporting for a few more listings.
struct Ghost {
    playlist: Playlist,
    listings_left: usize,
}

/// In-memory media library.
///
/// `with_deletion_lag` makes it behave like an application whose playlist
/// collection lags behind deletions: a deleted playlist still shows up in
/// the next `n` calls to [`MediaLibrary::playlists`].
#[derive(Default)]
pub struct MemoryLibrary {
    state: LibraryState,
    deletion_lag: usize,
    ghosts: RefCell<Vec<Ghost>>,
    syncs: HashMap<DeviceId, usize>,
    flushes: usize,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: LibraryState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    /// A second track at an already used path is skipped.
    pub fn with_track(mut self, path: impl Into<PathBuf>, rating: u8, track_number: u32) -> Self {
        self.insert_track(path, rating, track_number);
        self
    }

    /// A track whose location the application has lost.
    pub fn with_lost_track(mut self, name: &str, artist: &str) -> Self {
        // without a location there is nothing to clash with
        self.state.insert_track(None, name, artist, 0, 0).ok();
        self
    }

    pub fn with_playlist(mut self, name: &str) -> Self {
        self.state.create_playlist(name);
        self
    }

    pub fn with_device(mut self, name: &str) -> Self {
        self.state.add_device(name);
        self
    }

    pub fn with_deletion_lag(mut self, listings: usize) -> Self {
        self.deletion_lag = listings;
        self
    }

    /// Insert a track record directly, bypassing `add_track`. `None` when the
    /// location is already taken.
    pub fn insert_track(
        &mut self,
        path: impl Into<PathBuf>,
        rating: u8,
        track_number: u32,
    ) -> Option<TrackId> {
        let path = path.into();
        let name = file_stem(&path);
        self.state
            .insert_track(Some(path), &name, "", rating, track_number)
            .ok()
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    pub fn playlist_names(&self) -> Vec<String> {
        self.state.playlists().into_iter().map(|p| p.name).collect()
    }

    pub fn playlist_tracks(&self, name: &str) -> Option<Vec<Track>> {
        self.state.playlist_tracks(name)
    }

    /// How many times [`MediaLibrary::flush`] was called.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// How many times the named device was synced.
    pub fn sync_count(&self, device_name: &str) -> usize {
        self.state
            .devices()
            .iter()
            .find(|d| d.name == device_name)
            .and_then(|d| self.syncs.get(&d.id))
            .copied()
            .unwrap_or(0)
    }
}

impl MediaLibrary for MemoryLibrary {
    fn tracks(&self) -> MediaResult<Vec<Track>> {
        Ok(self.state.tracks().to_vec())
    }

    fn playlists(&self) -> MediaResult<Vec<Playlist>> {
        let mut listing = self.state.playlists();
        let mut ghosts = self.ghosts.borrow_mut();
        ghosts.retain(|g| g.listings_left > 0);
        for ghost in ghosts.iter_mut() {
            listing.push(ghost.playlist.clone());
            ghost.listings_left -= 1;
        }
        Ok(listing)
    }

    fn devices(&self) -> MediaResult<Vec<Device>> {
        Ok(self.state.devices())
    }

    fn delete_track(&mut self, id: &TrackId) -> MediaResult<()> {
        self.state.remove_track(id)
    }

    fn add_track(&mut self, path: &Path) -> MediaResult<TrackId> {
        let name = file_stem(path);
        self.state
            .insert_track(Some(path.to_path_buf()), &name, "", 0, 0)
    }

    fn create_playlist(&mut self, name: &str) -> MediaResult<PlaylistId> {
        Ok(self.state.create_playlist(name))
    }

    fn delete_playlist(&mut self, id: &PlaylistId) -> MediaResult<()> {
        // a lagging application accepts deletes of playlists it still lists
        if self.ghosts.borrow().iter().any(|g| &g.playlist.id == id) {
            return Ok(());
        }

        let playlist = self
            .state
            .playlists()
            .into_iter()
            .find(|p| &p.id == id);
        self.state.remove_playlist(id)?;

        if let Some(playlist) = playlist {
            if self.deletion_lag > 0 {
                self.ghosts.borrow_mut().push(Ghost {
                    playlist,
                    listings_left: self.deletion_lag,
                });
            }
        }
        Ok(())
    }

    fn add_to_playlist(&mut self, playlist: &PlaylistId, track: &TrackId) -> MediaResult<()> {
        self.state.append_to_playlist(playlist, track)
    }

    fn sync_device(&mut self, id: &DeviceId) -> MediaResult<()> {
        self.state.mark_synced(id, chrono::Utc::now().to_rfc3339())?;
        *self.syncs.entry(id.clone()).or_default() += 1;
        Ok(())
    }

    fn flush(&mut self) -> MediaResult<()> {
        self.flushes += 1;
        Ok(())
    }
}

pub(super) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
