use ::config::{Config, Environment, File as ConfigFile, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Error, Result};
use crate::platform;

/// Base name of the optional config file looked up in the working directory.
pub const DEFAULT_CONFIG_NAME: &str = "Config";

/// Rating 0 means unrated, which is what every imported track starts with.
const MIN_CRAP_RATING: u8 = 1;
const MAX_RATING: u8 = 100;

/// Prefix for environment overrides, e.g. `TUNEKEEPER__LIBRARY__CRAP_RATING=20`.
pub const ENV_PREFIX: &str = "TUNEKEEPER";

/// Top-level settings.
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TUNEKEEPER__`, `__` as nested separator)
/// 2) Config file (`Config.toml` in the working directory, or an explicit path)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub folders: FolderSettings,
    pub rules: RuleSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FolderSettings {
    /// Folder holding tracks that don't belong to an album.
    pub singles_root: PathBuf,
    /// Folder whose immediate subfolders are albums.
    pub albums_root: PathBuf,
    /// Storage managed by the media application itself. Trusted, never scanned.
    pub managed_root: PathBuf,
}

impl Default for FolderSettings {
    fn default() -> Self {
        let music = platform::music_dir();
        Self {
            singles_root: music.join("Singles"),
            albums_root: music.join("Albums"),
            managed_root: music.join("iTunes"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleSettings {
    /// Library entries with these extensions are never policed (case-insensitive, without dot).
    pub ignored_library_extensions: Vec<String>,
    /// Extensions allowed on disk inside Singles and album folders.
    pub allowed_file_extensions: Vec<String>,
    /// Extensions imported as tracks.
    pub music_file_extensions: Vec<String>,
    /// File names (case-insensitive) that may appear anywhere.
    pub ignored_filenames: Vec<String>,
    /// Every album folder, and its playlist, starts with this.
    pub album_marker: String,
    /// Name of the playlist built from the Singles folder.
    pub singles_playlist_name: String,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            ignored_library_extensions: strings(&["epub", "pdf"]),
            allowed_file_extensions: strings(&[
                "mp3", "m4a", "jpg", "jpeg", "gif", "bmp", "png", "txt", "pdf",
            ]),
            music_file_extensions: strings(&["mp3", "m4a", "aac"]),
            ignored_filenames: strings(&["thumbs.db", "desktop.ini", ".ds_store"]),
            album_marker: "[".to_string(),
            singles_playlist_name: "Singles".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// TOML document backing the media library.
    pub path: PathBuf,
    /// Tracks rated exactly this are pruned. 20 per star, so 20 is one star.
    pub crap_rating: u8,
    /// Upper bound on delete-and-rescan passes over generated playlists.
    pub max_playlist_delete_passes: usize,
    /// Move pruned files here instead of the system trash.
    pub trash_dir: Option<PathBuf>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            path: platform::music_dir().join("tunekeeper-library.toml"),
            crap_rating: 20,
            max_playlist_delete_passes: 5,
            trash_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from an optional config file and the environment.
    ///
    /// An explicit `path` must exist; the default `Config.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    fn load_with_env_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();

        builder = match path {
            Some(p) => builder.add_source(ConfigFile::from(p).required(true)),
            None => builder.add_source(ConfigFile::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        builder = builder.add_source(environment(prefix));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.finish()
    }

    /// Parse settings from TOML text, without environment overrides.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(ConfigFile::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.finish()
    }

    fn finish(mut self) -> Result<Self> {
        self.expand_paths();
        self.validate()?;
        Ok(self)
    }

    fn expand_paths(&mut self) {
        self.folders.singles_root = platform::expand_home(&self.folders.singles_root);
        self.folders.albums_root = platform::expand_home(&self.folders.albums_root);
        self.folders.managed_root = platform::expand_home(&self.folders.managed_root);
        self.library.path = platform::expand_home(&self.library.path);
        if let Some(dir) = self.library.trash_dir.take() {
            self.library.trash_dir = Some(platform::expand_home(&dir));
        }
    }

    /// Reject settings the pipeline can't run with.
    pub fn validate(&self) -> Result<()> {
        let folders = &self.folders;
        for (key, root) in [
            ("folders.singles_root", &folders.singles_root),
            ("folders.albums_root", &folders.albums_root),
            ("folders.managed_root", &folders.managed_root),
        ] {
            if !root.is_absolute() {
                return Err(Error::Settings(format!(
                    "{} must be an absolute path, got {}",
                    key,
                    root.display()
                )));
            }
        }

        if folders.singles_root.starts_with(&folders.albums_root)
            || folders.albums_root.starts_with(&folders.singles_root)
        {
            return Err(Error::Settings(
                "folders.singles_root and folders.albums_root must not contain each other"
                    .to_string(),
            ));
        }

        if self.rules.album_marker.is_empty() {
            return Err(Error::Settings("rules.album_marker must not be empty".to_string()));
        }
        if self.rules.music_file_extensions.is_empty() {
            return Err(Error::Settings(
                "rules.music_file_extensions must not be empty".to_string(),
            ));
        }
        if !(MIN_CRAP_RATING..=MAX_RATING).contains(&self.library.crap_rating) {
            return Err(Error::Settings(format!(
                "library.crap_rating must be between {} and {}, got {}",
                MIN_CRAP_RATING, MAX_RATING, self.library.crap_rating
            )));
        }
        if self.library.max_playlist_delete_passes == 0 {
            return Err(Error::Settings(
                "library.max_playlist_delete_passes must be >= 1".to_string(),
            ));
        }

        for ext in &self.rules.music_file_extensions {
            let ext = normalize_extension(ext);
            if !self
                .rules
                .allowed_file_extensions
                .iter()
                .any(|a| normalize_extension(a) == ext)
            {
                warn!(
                    "Music extension '{}' is not allowed on disk; such files will fail the filesystem rules",
                    ext
                );
            }
        }

        Ok(())
    }
}

/// List settings that can be overridden from the environment as comma-separated values.
const ENV_LIST_KEYS: [&str; 4] = [
    "rules.ignored_library_extensions",
    "rules.allowed_file_extensions",
    "rules.music_file_extensions",
    "rules.ignored_filenames",
];

/// Environment source: `PREFIX__SECTION__KEY`, lists as `a,b,c`.
fn environment(prefix: &str) -> Environment {
    ENV_LIST_KEYS.iter().fold(
        Environment::with_prefix(prefix)
            .separator("__")
            .list_separator(",")
            .try_parsing(true),
        |env, key| env.with_list_parse_key(key),
    )
}

/// Lowercase an extension and drop any leading dot.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
