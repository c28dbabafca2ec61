use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::inventory::Inventory;
use crate::media::{MediaLibrary, Track};
use crate::platform::trash::Disposal;

#[derive(Debug, Default)]
pub struct PruneSummary {
    /// Locations of the pruned tracks.
    pub pruned: Vec<PathBuf>,
    /// Pruned tracks whose file was already gone.
    pub missing_files: usize,
}

/// Tracks rated exactly `library.crap_rating`, by path.
pub fn crap_tracks(inventory: &Inventory, settings: &Settings) -> Vec<Track> {
    let mut tracks: Vec<Track> = inventory
        .tracks()
        .iter()
        .filter(|t| t.rating == settings.library.crap_rating && t.resolved_path().is_some())
        .cloned()
        .collect();
    tracks.sort_by(|a, b| a.location.cmp(&b.location));
    tracks
}

/// Delete every crap track from the library and send its file to `disposal`.
///
/// The library record goes first so no track is left pointing at a file that
/// is already in the trash.
pub fn prune_crap_tracks<L: MediaLibrary + ?Sized>(
    library: &mut L,
    inventory: &mut Inventory,
    disposal: &dyn Disposal,
    settings: &Settings,
) -> Result<PruneSummary> {
    let mut summary = PruneSummary::default();

    for track in crap_tracks(inventory, settings) {
        let Some(path) = track.resolved_path().map(Path::to_path_buf) else {
            continue;
        };
        info!("Deleting crap track: {}", path.display());

        inventory.remove(&track.id);
        library
            .delete_track(&track.id)
            .map_err(|e| prune_error(&path, e.into()))?;

        if path.exists() {
            disposal
                .dispose(&path)
                .map_err(|e| prune_error(&path, e))?;
        } else {
            warn!("File '{}' no longer exists, nothing to trash", path.display());
            summary.missing_files += 1;
        }

        summary.pruned.push(path);
    }

    info!("Pruned {} crap tracks", summary.pruned.len());
    Ok(summary)
}

fn prune_error(path: &Path, source: Error) -> Error {
    Error::Prune {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}
