use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Somewhere a pruned file can be sent without destroying it.
pub trait Disposal {
    fn dispose(&self, path: &Path) -> Result<()>;
}

/// The platform Recycle Bin / Trash.
pub struct SystemTrash;

impl Disposal for SystemTrash {
    fn dispose(&self, path: &Path) -> Result<()> {
        ::trash::delete(path).map_err(|e| Error::Trash {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!("trashed: {}", path.display());
        Ok(())
    }
}

/// Moves files into a plain directory. Existing names are never overwritten.
pub struct DirectoryTrash {
    dir: PathBuf,
}

impl DirectoryTrash {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Disposal for DirectoryTrash {
    fn dispose(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let target = unique_destination(&self.dir, path)?;

        // rename fails across filesystems, copy then remove instead
        if fs::rename(path, &target).is_err() {
            fs::copy(path, &target)?;
            fs::remove_file(path)?;
        }

        debug!("moved {} to {}", path.display(), target.display());
        Ok(())
    }
}

fn unique_destination(dir: &Path, path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", path.display()),
        )
    })?;

    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return Ok(candidate);
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());

    let mut n = 1;
    loop {
        let name = match &extension {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return Ok(candidate);
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_directory_trash_moves_file() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("song.mp3");
        fs::write(&source, b"not a real mp3").unwrap();

        let trash = DirectoryTrash::new(tmp.path().join("trash"));
        trash.dispose(&source).unwrap();

        assert!(!source.exists());
        let moved = tmp.path().join("trash").join("song.mp3");
        assert_eq!(fs::read(moved).unwrap(), b"not a real mp3");
    }

    #[test]
    fn test_directory_trash_keeps_earlier_copies() {
        let tmp = tempdir().unwrap();
        let trash = DirectoryTrash::new(tmp.path().join("trash"));

        for content in ["first", "second", "third"] {
            let source = tmp.path().join("song.mp3");
            fs::write(&source, content).unwrap();
            trash.dispose(&source).unwrap();
        }

        let dir = trash.dir();
        assert_eq!(fs::read_to_string(dir.join("song.mp3")).unwrap(), "first");
        assert_eq!(fs::read_to_string(dir.join("song (1).mp3")).unwrap(), "second");
        assert_eq!(fs::read_to_string(dir.join("song (2).mp3")).unwrap(), "third");
    }

    #[test]
    fn test_directory_trash_missing_source_is_an_error() {
        let tmp = tempdir().unwrap();
        let trash = DirectoryTrash::new(tmp.path().join("trash"));
        assert!(trash.dispose(&tmp.path().join("gone.mp3")).is_err());
    }
}
