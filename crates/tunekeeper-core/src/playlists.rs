use std::path::Path;
use tracing::{debug, info};

use crate::config::{RuleSettings, Settings};
use crate::error::{Error, Result};
use crate::inventory::Inventory;
use crate::media::{MediaLibrary, Playlist, Track};
use crate::scanner::album_folders;

#[derive(Debug, Default)]
pub struct PlaylistSummary {
    /// Delete calls issued, including repeats for lagging listings.
    pub deleted: usize,
    pub delete_passes: usize,
    /// Name and track count of every playlist created, in creation order.
    pub created: Vec<(String, usize)>,
}

/// Folder playlists are the ones named like an album folder, plus Singles.
pub fn is_folder_playlist(name: &str, rules: &RuleSettings) -> bool {
    name.starts_with(rules.album_marker.as_str()) || name == rules.singles_playlist_name
}

/// Playlist order for a folder: track number, then path.
pub fn folder_playlist_order(tracks: &[Track]) -> Vec<Track> {
    let mut ordered = tracks.to_vec();
    ordered.sort_by(|a, b| {
        a.track_number
            .cmp(&b.track_number)
            .then_with(|| a.location.cmp(&b.location))
    });
    ordered
}

/// Delete folder playlists until the library stops listing any.
///
/// Some applications keep listing a playlist for a while after it was
/// deleted, so this rescans and deletes again, giving up after
/// `library.max_playlist_delete_passes` passes. Returns `(deleted, passes)`.
pub fn delete_folder_playlists<L: MediaLibrary + ?Sized>(
    library: &mut L,
    settings: &Settings,
) -> Result<(usize, usize)> {
    let max_passes = settings.library.max_playlist_delete_passes;
    let mut deleted = 0;
    let mut passes = 0;

    loop {
        let doomed: Vec<Playlist> = library
            .playlists()?
            .into_iter()
            .filter(|p| is_folder_playlist(&p.name, &settings.rules))
            .collect();

        if doomed.is_empty() {
            return Ok((deleted, passes));
        }
        if passes == max_passes {
            return Err(Error::PlaylistsDidNotConverge {
                passes,
                remaining: doomed.len(),
            });
        }

        passes += 1;
        for playlist in &doomed {
            debug!("Deleting playlist: {}", playlist.name);
            library.delete_playlist(&playlist.id)?;
            deleted += 1;
        }
    }
}

/// Replace every folder playlist with a fresh one built from `inventory`.
///
/// One playlist per directory under the albums root, named after it, then one
/// for the Singles folder. `inventory` must reflect tracks added earlier in
/// the run.
pub fn rebuild_folder_playlists<L: MediaLibrary + ?Sized>(
    library: &mut L,
    inventory: &Inventory,
    settings: &Settings,
) -> Result<PlaylistSummary> {
    let (deleted, delete_passes) = delete_folder_playlists(library, settings)?;
    debug!(
        "Deleted {} folder playlists in {} passes",
        deleted, delete_passes
    );

    let mut summary = PlaylistSummary {
        deleted,
        delete_passes,
        created: Vec::new(),
    };

    for album in album_folders(&settings.folders.albums_root)? {
        let count = make_folder_playlist(library, &album.name, &album.path, inventory)?;
        summary.created.push((album.name, count));
    }

    let singles = &settings.rules.singles_playlist_name;
    let count = make_folder_playlist(library, singles, &settings.folders.singles_root, inventory)?;
    summary.created.push((singles.clone(), count));

    info!("Made {} folder playlists", summary.created.len());
    Ok(summary)
}

fn make_folder_playlist<L: MediaLibrary + ?Sized>(
    library: &mut L,
    name: &str,
    folder: &Path,
    inventory: &Inventory,
) -> Result<usize> {
    info!("Making playlist: {} for path: {}", name, folder.display());
    let playlist = library.create_playlist(name)?;

    let tracks = folder_playlist_order(inventory.tracks_in(folder));
    for track in &tracks {
        library.add_to_playlist(&playlist, &track.id)?;
    }
    Ok(tracks.len())
}
