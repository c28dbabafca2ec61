use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::devices;
use crate::error::{Error, Result};
use crate::import;
use crate::inventory::Inventory;
use crate::media::MediaLibrary;
use crate::platform::trash::Disposal;
use crate::playlists;
use crate::progress::{ProgressReporter, Stage};
use crate::prune;
use crate::rules::{self, Violation};

pub struct MaintenanceEngine {
    settings: Settings,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub tracks_scanned: usize,
    pub pruned: usize,
    pub imported: usize,
    pub playlists_created: usize,
    pub playlist_delete_passes: usize,
    pub devices_synced: usize,
    pub validation_duration: Duration,
    pub maintenance_duration: Duration,
}

impl MaintenanceEngine {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the library and filesystem rules without changing anything.
    pub fn check<L: MediaLibrary + ?Sized>(
        &self,
        library: &L,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<Violation>> {
        let (_, violations) = self.validate(library, reporter)?;
        Ok(violations)
    }

    /// Run the full maintenance pipeline:
    /// 1. Inventory the library
    /// 2. Library and filesystem rules (abort on any violation)
    /// 3. Prune crap tracks
    /// 4. Import new files
    /// 5. Rebuild folder playlists from a fresh inventory
    /// 6. Sync attached devices
    pub fn run<L: MediaLibrary + ?Sized>(
        &self,
        library: &mut L,
        disposal: &dyn Disposal,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunSummary> {
        let validation_start = Instant::now();
        let (inventory, violations) = self.validate(library, reporter)?;
        if !violations.is_empty() {
            return Err(Error::RulesBroken {
                count: violations.len(),
            });
        }

        let mut summary = RunSummary {
            tracks_scanned: inventory.len(),
            validation_duration: validation_start.elapsed(),
            ..RunSummary::default()
        };
        let maintenance_start = Instant::now();

        if let Err(err) = self.maintain(library, inventory, disposal, reporter, &mut summary) {
            // keep what the finished steps already changed
            if let Err(flush_err) = library.flush() {
                warn!("Could not save library after failed run: {}", flush_err);
            }
            return Err(err);
        }
        summary.maintenance_duration = maintenance_start.elapsed();

        info!(
            "Maintenance complete: {} pruned, {} imported, {} playlists, {} devices synced",
            summary.pruned, summary.imported, summary.playlists_created, summary.devices_synced
        );
        Ok(summary)
    }

    /// Trigger sync on every attached device.
    pub fn sync_devices<L: MediaLibrary + ?Sized>(
        &self,
        library: &mut L,
        reporter: &dyn ProgressReporter,
    ) -> Result<usize> {
        let synced = stage(reporter, Stage::DeviceSync, || {
            devices::sync_devices(library).map(|n| (n, n))
        });
        library.flush()?;
        synced
    }

    fn maintain<L: MediaLibrary + ?Sized>(
        &self,
        library: &mut L,
        mut inventory: Inventory,
        disposal: &dyn Disposal,
        reporter: &dyn ProgressReporter,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let pruned = stage(reporter, Stage::Prune, || {
            prune::prune_crap_tracks(library, &mut inventory, disposal, &self.settings)
                .map(|s| (s.pruned.len(), s))
        })?;
        library.flush()?;
        summary.pruned = pruned.pruned.len();

        let imported = stage(reporter, Stage::Import, || {
            import::import_missing_tracks(library, &inventory, &self.settings)
                .map(|s| (s.added.len(), s))
        })?;
        library.flush()?;
        summary.imported = imported.added.len();

        // pick up the tracks just added
        let inventory = Inventory::load(library)?;

        let rebuilt = stage(reporter, Stage::Playlists, || {
            playlists::rebuild_folder_playlists(library, &inventory, &self.settings)
                .map(|s| (s.created.len(), s))
        })?;
        library.flush()?;
        summary.playlists_created = rebuilt.created.len();
        summary.playlist_delete_passes = rebuilt.delete_passes;

        summary.devices_synced = self.sync_devices(library, reporter)?;
        Ok(())
    }

    fn validate<L: MediaLibrary + ?Sized>(
        &self,
        library: &L,
        reporter: &dyn ProgressReporter,
    ) -> Result<(Inventory, Vec<Violation>)> {
        let inventory = stage(reporter, Stage::Inventory, || {
            Inventory::load(library).map(|i| (i.len(), i))
        })?;

        let mut violations = stage(reporter, Stage::LibraryRules, || {
            let v = rules::check_library(&inventory, &self.settings);
            Ok((v.len(), v))
        })?;

        let on_disk = stage(reporter, Stage::FilesystemRules, || {
            rules::check_filesystem(&self.settings).map(|v| (v.len(), v))
        });
        match on_disk {
            Ok(found) => violations.extend(found),
            Err(err) => {
                report_violations(&violations, reporter);
                return Err(err);
            }
        }

        report_violations(&violations, reporter);
        if !violations.is_empty() {
            error!("{} rule violation(s), stopping before any change", violations.len());
        }

        Ok((inventory, violations))
    }
}

fn report_violations(violations: &[Violation], reporter: &dyn ProgressReporter) {
    for violation in violations {
        error!("{}", violation);
        reporter.on_violation(violation);
    }
}

/// Run one stage, reporting its start, item count and duration.
fn stage<T>(
    reporter: &dyn ProgressReporter,
    stage: Stage,
    f: impl FnOnce() -> Result<(usize, T)>,
) -> Result<T> {
    reporter.on_stage_start(stage);
    let start = Instant::now();
    let (items, value) = f()?;
    reporter.on_stage_complete(stage, items, start.elapsed().as_secs_f64());
    Ok(value)
}
