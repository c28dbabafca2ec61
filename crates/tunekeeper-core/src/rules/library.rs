use std::path::Path;

use crate::config::Settings;
use crate::inventory::Inventory;
use crate::scanner::has_extension_in;

use super::Violation;

/// Check every library track's recorded location against the folder policy.
///
/// Valid locations are the Singles folder itself, an immediate subfolder of
/// the albums root, or anywhere under managed storage. Tracks sitting directly
/// in the albums root are misplaced.
pub fn check_library(inventory: &Inventory, settings: &Settings) -> Vec<Violation> {
    let mut violations = Vec::new();

    for track in inventory.tracks() {
        match track.resolved_path() {
            None => violations.push(Violation::UnresolvableLocation {
                name: track.name.clone(),
                artist: track.artist.clone(),
            }),
            Some(path) => {
                if let Some(v) = check_track_location(path, settings) {
                    violations.push(v);
                }
            }
        }
    }

    for track in inventory.duplicates() {
        if let Some(path) = track.resolved_path() {
            violations.push(Violation::DuplicateLocation {
                path: path.to_path_buf(),
            });
        }
    }

    violations
}

/// At most one violation for a single resolved track path.
pub fn check_track_location(path: &Path, settings: &Settings) -> Option<Violation> {
    if has_extension_in(path, &settings.rules.ignored_library_extensions) {
        return None;
    }

    let folders = &settings.folders;
    if path.starts_with(&folders.managed_root) {
        return None;
    }

    let parent = path.parent()?;
    if parent == folders.singles_root {
        return None;
    }

    match parent.strip_prefix(&folders.albums_root) {
        Ok(rest) => match rest.components().count() {
            0 => Some(Violation::WrongLocation {
                path: path.to_path_buf(),
            }),
            1 => None,
            _ => Some(Violation::NestedAlbumSubfolder {
                path: path.to_path_buf(),
            }),
        },
        Err(_) => Some(Violation::WrongLocation {
            path: path.to_path_buf(),
        }),
    }
}
