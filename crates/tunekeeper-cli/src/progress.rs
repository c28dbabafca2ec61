use colored::*;
use tunekeeper_core::{ProgressReporter, Stage};

/// Prints one line per finished stage. Violations go through tracing.
pub struct CliReporter;

impl ProgressReporter for CliReporter {
    fn on_stage_complete(&self, stage: Stage, items: usize, duration_secs: f64) {
        let noun = match stage {
            Stage::Inventory => "tracks",
            Stage::LibraryRules | Stage::FilesystemRules => "violations",
            Stage::Prune => "tracks pruned",
            Stage::Import => "tracks added",
            Stage::Playlists => "playlists",
            Stage::DeviceSync => "devices",
        };
        eprintln!(
            "  {} {} complete: {} {} in {:.2}s",
            "✓".green(),
            stage,
            items,
            noun,
            duration_secs
        );
    }
}
