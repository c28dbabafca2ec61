use lofty::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::memory::file_stem;
use super::{
    Device, DeviceId, LibraryState, MediaError, MediaLibrary, MediaResult, Playlist, PlaylistId,
    Track, TrackId,
};

/// Media library persisted as a TOML document.
///
/// Mutations only touch memory and mark the library dirty; [`MediaLibrary::flush`]
/// writes the whole document once.
pub struct TomlLibrary {
    path: PathBuf,
    state: LibraryState,
    dirty: bool,
}

impl TomlLibrary {
    /// Open the library at `path`. A missing file is an empty library.
    pub fn open(path: impl Into<PathBuf>) -> MediaResult<Self> {
        let path = path.into();
        let state = if path.exists() {
            let text = fs::read_to_string(&path)?;
            toml::from_str(&text).map_err(|e| {
                MediaError::Store(format!("Error parsing {}: {}", path.display(), e))
            })?
        } else {
            info!("No library at {}, starting an empty one", path.display());
            LibraryState::default()
        };
        debug!(
            "Opened library {} with {} tracks",
            path.display(),
            state.tracks().len()
        );
        Ok(Self {
            path,
            state,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Register an attached device. Devices are otherwise never created by the pipeline.
    pub fn add_device(&mut self, name: &str) -> MediaResult<DeviceId> {
        let id = self.state.add_device(name);
        self.dirty = true;
        Ok(id)
    }

    fn save(&self) -> MediaResult<()> {
        let text = toml::to_string_pretty(&self.state)
            .map_err(|e| MediaError::Store(format!("Error serializing library: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

struct FileTags {
    name: String,
    artist: String,
    track_number: u32,
}

/// Title, artist and track number from the file's tags, falling back to the
/// file name when the file has none.
fn read_tags(path: &Path) -> FileTags {
    let mut tags = FileTags {
        name: file_stem(path),
        artist: String::new(),
        track_number: 0,
    };

    if let Ok(tagged) = lofty::read_from_path(path) {
        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.title() {
                if !v.trim().is_empty() {
                    tags.name = v.trim().to_string();
                }
            }
            if let Some(v) = tag.artist() {
                tags.artist = v.trim().to_string();
            }
            if let Some(n) = tag.track() {
                tags.track_number = n;
            }
        }
    }

    tags
}

impl MediaLibrary for TomlLibrary {
    fn tracks(&self) -> MediaResult<Vec<Track>> {
        Ok(self.state.tracks().to_vec())
    }

    fn playlists(&self) -> MediaResult<Vec<Playlist>> {
        Ok(self.state.playlists())
    }

    fn devices(&self) -> MediaResult<Vec<Device>> {
        Ok(self.state.devices())
    }

    fn delete_track(&mut self, id: &TrackId) -> MediaResult<()> {
        self.state.remove_track(id)?;
        self.dirty = true;
        Ok(())
    }

    fn add_track(&mut self, path: &Path) -> MediaResult<TrackId> {
        if !path.is_file() {
            return Err(MediaError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a file", path.display()),
            )));
        }
        let tags = read_tags(path);
        let id = self.state.insert_track(
            Some(path.to_path_buf()),
            &tags.name,
            &tags.artist,
            0,
            tags.track_number,
        )?;
        self.dirty = true;
        Ok(id)
    }

    fn create_playlist(&mut self, name: &str) -> MediaResult<PlaylistId> {
        let id = self.state.create_playlist(name);
        self.dirty = true;
        Ok(id)
    }

    fn delete_playlist(&mut self, id: &PlaylistId) -> MediaResult<()> {
        self.state.remove_playlist(id)?;
        self.dirty = true;
        Ok(())
    }

    fn add_to_playlist(&mut self, playlist: &PlaylistId, track: &TrackId) -> MediaResult<()> {
        self.state.append_to_playlist(playlist, track)?;
        self.dirty = true;
        Ok(())
    }

    fn sync_device(&mut self, id: &DeviceId) -> MediaResult<()> {
        self.state.mark_synced(id, chrono::Utc::now().to_rfc3339())?;
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> MediaResult<()> {
        if self.dirty {
            self.save()?;
            self.dirty = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let library = TomlLibrary::open(dir.path().join("library.toml")).unwrap();
        assert!(library.tracks().unwrap().is_empty());
        assert!(library.playlists().unwrap().is_empty());
    }

    #[test]
    fn test_mutations_survive_reopen() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("nested").join("library.toml");
        let song = dir.path().join("Untagged Song.mp3");
        fs::write(&song, b"not a real mp3").unwrap();

        let mut library = TomlLibrary::open(&store).unwrap();
        let track = library.add_track(&song).unwrap();
        let playlist = library.create_playlist("[Artist - Album]").unwrap();
        library.add_to_playlist(&playlist, &track).unwrap();
        let device = library.add_device("iPod").unwrap();
        library.sync_device(&device).unwrap();
        library.flush().unwrap();
        drop(library);

        let library = TomlLibrary::open(&store).unwrap();
        let tracks = library.tracks().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "Untagged Song");
        assert_eq!(tracks[0].location.as_deref(), Some(song.as_path()));
        let members = library.state().playlist_tracks("[Artist - Album]").unwrap();
        assert_eq!(members[0].id, track);
        assert!(library.state().device(&device).unwrap().last_synced.is_some());
    }

    #[test]
    fn test_nothing_is_written_until_flush() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("library.toml");

        let mut library = TomlLibrary::open(&store).unwrap();
        library.create_playlist("[A - B]").unwrap();
        assert!(library.is_dirty());
        assert!(!store.exists());

        library.flush().unwrap();
        assert!(!library.is_dirty());
        assert_eq!(
            TomlLibrary::open(&store).unwrap().playlists().unwrap().len(),
            1
        );
    }

    #[test]
    fn test_duplicate_locations_in_store_are_loaded() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("library.toml");
        fs::write(
            &store,
            r#"
next_id = 2

[[tracks]]
id = "T1"
location = "/music/Singles/a.mp3"
name = "a"

[[tracks]]
id = "T2"
location = "/music/Singles/a.mp3"
name = "a again"
"#,
        )
        .unwrap();

        let library = TomlLibrary::open(&store).unwrap();
        assert_eq!(library.tracks().unwrap().len(), 2);
        let first = library
            .state()
            .track_at(Path::new("/music/Singles/a.mp3"))
            .unwrap();
        assert_eq!(first.id, TrackId::from("T1"));
    }

    #[test]
    fn test_add_track_requires_existing_file() {
        let dir = tempdir().unwrap();
        let mut library = TomlLibrary::open(dir.path().join("library.toml")).unwrap();
        let err = library.add_track(&dir.path().join("gone.mp3")).unwrap_err();
        assert!(matches!(err, MediaError::Io(_)));
    }

    #[test]
    fn test_corrupt_store_is_reported() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("library.toml");
        fs::write(&store, "tracks = 12").unwrap();
        assert!(matches!(
            TomlLibrary::open(&store),
            Err(MediaError::Store(_))
        ));
    }
}
