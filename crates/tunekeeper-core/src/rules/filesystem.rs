use std::path::Path;
use tracing::debug;

use crate::config::{RuleSettings, Settings};
use crate::error::Result;
use crate::scanner::{has_extension_in, is_ignored_filename, list_entries, FolderEntry};

use super::Violation;

/// Check the Singles folder and the albums tree on disk.
///
/// - Singles and every album folder: only allowed extensions, no subfolders.
/// - Albums root: no files other than ignored ones; every folder name starts
///   with the album marker. Misnamed folders are not looked into.
/// - Anywhere scanned: no dangling symlinks.
pub fn check_filesystem(settings: &Settings) -> Result<Vec<Violation>> {
    let rules = &settings.rules;
    let mut violations = Vec::new();

    check_folder(&settings.folders.singles_root, rules, &mut violations)?;

    let albums = list_entries(&settings.folders.albums_root)?;
    debug!("Checking {} entries in the albums folder", albums.len());

    for entry in albums {
        if entry.is_broken_link {
            violations.push(Violation::BrokenLink { path: entry.path });
        } else if !entry.is_dir {
            if !is_ignored_filename(&entry.name, &rules.ignored_filenames) {
                violations.push(Violation::StrayFileInAlbumsRoot { path: entry.path });
            }
        } else if !entry.name.starts_with(rules.album_marker.as_str()) {
            violations.push(Violation::MisnamedAlbumFolder {
                path: entry.path,
                marker: rules.album_marker.clone(),
            });
        } else {
            check_folder(&entry.path, rules, &mut violations)?;
        }
    }

    Ok(violations)
}

/// Files in `dir` whose extension isn't allowed.
pub fn check_no_banned_extensions(dir: &Path, rules: &RuleSettings) -> Result<Vec<Violation>> {
    Ok(banned_extensions(&list_entries(dir)?, rules))
}

/// Any directory inside `dir`.
pub fn check_no_subfolders(dir: &Path) -> Result<Vec<Violation>> {
    Ok(subfolders(&list_entries(dir)?))
}

fn check_folder(dir: &Path, rules: &RuleSettings, violations: &mut Vec<Violation>) -> Result<()> {
    let entries = list_entries(dir)?;
    violations.extend(broken_links(&entries));
    violations.extend(banned_extensions(&entries, rules));
    violations.extend(subfolders(&entries));
    Ok(())
}

fn broken_links(entries: &[FolderEntry]) -> Vec<Violation> {
    entries
        .iter()
        .filter(|e| e.is_broken_link)
        .map(|e| Violation::BrokenLink {
            path: e.path.clone(),
        })
        .collect()
}

fn banned_extensions(entries: &[FolderEntry], rules: &RuleSettings) -> Vec<Violation> {
    entries
        .iter()
        .filter(|e| !e.is_dir && !e.is_broken_link)
        .filter(|e| !is_ignored_filename(&e.name, &rules.ignored_filenames))
        .filter(|e| !has_extension_in(&e.path, &rules.allowed_file_extensions))
        .map(|e| Violation::BannedExtension {
            path: e.path.clone(),
        })
        .collect()
}

fn subfolders(entries: &[FolderEntry]) -> Vec<Violation> {
    entries
        .iter()
        .filter(|e| e.is_dir)
        .map(|e| Violation::UnexpectedSubfolder {
            path: e.path.clone(),
        })
        .collect()
}
