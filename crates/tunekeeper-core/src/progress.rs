use std::fmt;

use crate::rules::Violation;

/// Pipeline stages, in the order the engine runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Inventory,
    LibraryRules,
    FilesystemRules,
    Prune,
    Import,
    Playlists,
    DeviceSync,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Inventory => "Inventory",
            Stage::LibraryRules => "Library rules",
            Stage::FilesystemRules => "Filesystem rules",
            Stage::Prune => "Prune",
            Stage::Import => "Import",
            Stage::Playlists => "Playlists",
            Stage::DeviceSync => "Device sync",
        };
        f.write_str(label)
    }
}

/// Trait for reporting pipeline progress.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_stage_start(&self, _stage: Stage) {}
    /// `items` counts what the stage produced: tracks, violations, files, playlists or devices.
    fn on_stage_complete(&self, _stage: Stage, _items: usize, _duration_secs: f64) {}
    fn on_violation(&self, _violation: &Violation) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
