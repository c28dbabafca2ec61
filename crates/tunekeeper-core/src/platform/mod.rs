pub mod trash;

use std::path::{Path, PathBuf};

/// The user's `Music` folder under their home directory.
pub fn music_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Music")
}

/// Expand a leading `~` component against the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_leaves_absolute_paths_alone() {
        let p = Path::new("/srv/music/Singles");
        assert_eq!(expand_home(p), PathBuf::from("/srv/music/Singles"));
    }

    #[test]
    fn test_expand_home_replaces_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/Music")), home.join("Music"));
        }
    }

    #[test]
    fn test_music_dir_is_under_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(music_dir(), home.join("Music"));
        }
    }

    #[test]
    fn test_expand_home_ignores_tilde_inside_name() {
        let p = Path::new("~music/x");
        assert_eq!(expand_home(p), PathBuf::from("~music/x"));
    }
}
