use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::normalize_extension;
use crate::error::Result;

/// One direct child of a scanned folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub path: PathBuf,
    pub name: String,
    /// Directory, or a link to one.
    pub is_dir: bool,
    /// Symlink whose target is gone.
    pub is_broken_link: bool,
}

/// List the direct children of `dir`, sorted by file name.
///
/// Symlinks are resolved one entry at a time, so a dangling link shows up as
/// an entry instead of failing the listing. Fails if `dir` or any other entry
/// can't be read; the rules never run against a partial listing.
pub fn list_entries(dir: &Path) -> Result<Vec<FolderEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        let (is_dir, is_broken_link) = if entry.path_is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(target) => (target.is_dir(), false),
                Err(e) if e.kind() == io::ErrorKind::NotFound => (false, true),
                Err(e) => return Err(e.into()),
            }
        } else {
            (entry.file_type().is_dir(), false)
        };

        entries.push(FolderEntry {
            path: entry.path().to_path_buf(),
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_broken_link,
        });
    }

    Ok(entries)
}

/// Directories directly under the albums root, marker-named or not.
pub fn album_folders(albums_root: &Path) -> Result<Vec<FolderEntry>> {
    Ok(list_entries(albums_root)?
        .into_iter()
        .filter(|e| e.is_dir)
        .collect())
}

/// Case-insensitive extension match. Paths without an extension never match.
pub fn has_extension_in(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|e| normalize_extension(e) == ext)
        })
        .unwrap_or(false)
}

pub fn is_ignored_filename(name: &str, ignored: &[String]) -> bool {
    let name = name.to_lowercase();
    ignored.iter().any(|i| i.to_lowercase() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn exts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_has_extension_in_is_case_insensitive() {
        let allowed = exts(&["mp3", ".M4A"]);
        assert!(has_extension_in(Path::new("/tmp/a.mp3"), &allowed));
        assert!(has_extension_in(Path::new("/tmp/a.MP3"), &allowed));
        assert!(has_extension_in(Path::new("/tmp/a.m4a"), &allowed));
        assert!(!has_extension_in(Path::new("/tmp/a.txt"), &allowed));
        assert!(!has_extension_in(Path::new("/tmp/mp3"), &allowed));
    }

    #[test]
    fn test_is_ignored_filename() {
        let ignored = exts(&["thumbs.db", ".DS_Store"]);
        assert!(is_ignored_filename("Thumbs.db", &ignored));
        assert!(is_ignored_filename(".ds_store", &ignored));
        assert!(!is_ignored_filename("cover.jpg", &ignored));
    }

    #[test]
    fn test_list_entries_is_shallow_and_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.mp3"), b"x").unwrap();
        fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        let sub = dir.path().join("c");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("deep.mp3"), b"x").unwrap();

        let entries = list_entries(dir.path()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.mp3", "b.mp3", "c"]);
        assert!(entries[2].is_dir);
        assert!(!entries[0].is_dir);

        let albums = album_folders(dir.path()).unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].path, sub);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_resolved_per_entry() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let album = dir.path().join("real");
        fs::create_dir(&album).unwrap();
        symlink(&album, dir.path().join("linked")).unwrap();
        symlink(dir.path().join("gone.mp3"), dir.path().join("link.mp3")).unwrap();

        let entries = list_entries(dir.path()).unwrap();
        let link = entries.iter().find(|e| e.name == "link.mp3").unwrap();
        assert!(link.is_broken_link);
        assert!(!link.is_dir);
        let linked = entries.iter().find(|e| e.name == "linked").unwrap();
        assert!(linked.is_dir);
        assert!(!linked.is_broken_link);
    }

    #[test]
    fn test_list_entries_missing_dir_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(list_entries(&dir.path().join("missing")).is_err());
    }
}
