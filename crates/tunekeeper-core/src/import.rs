use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{RuleSettings, Settings};
use crate::error::Result;
use crate::inventory::Inventory;
use crate::media::MediaLibrary;
use crate::scanner::{album_folders, has_extension_in, list_entries};

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub added: Vec<PathBuf>,
}

/// Music files directly in `dir` that the inventory doesn't know about.
pub fn missing_tracks(dir: &Path, inventory: &Inventory, rules: &RuleSettings) -> Result<Vec<PathBuf>> {
    Ok(list_entries(dir)?
        .into_iter()
        .filter(|e| !e.is_dir && !e.is_broken_link)
        .filter(|e| has_extension_in(&e.path, &rules.music_file_extensions))
        .filter(|e| !inventory.contains_path(&e.path))
        .map(|e| e.path)
        .collect())
}

/// Register every unknown music file in the Singles folder and the album
/// folders with the library.
pub fn import_missing_tracks<L: MediaLibrary + ?Sized>(
    library: &mut L,
    inventory: &Inventory,
    settings: &Settings,
) -> Result<ImportSummary> {
    let mut folders = vec![settings.folders.singles_root.clone()];
    folders.extend(
        album_folders(&settings.folders.albums_root)?
            .into_iter()
            .map(|e| e.path),
    );

    let mut summary = ImportSummary::default();
    for folder in folders {
        for path in missing_tracks(&folder, inventory, &settings.rules)? {
            info!("Adding track: {}", path.display());
            library.add_track(&path)?;
            summary.added.push(path);
        }
    }

    info!("Added {} tracks", summary.added.len());
    Ok(summary)
}
