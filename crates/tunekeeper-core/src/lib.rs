pub mod config;
pub mod devices;
pub mod engine;
pub mod error;
pub mod import;
pub mod inventory;
pub mod media;
pub mod platform;
pub mod playlists;
pub mod progress;
pub mod prune;
pub mod rules;
pub mod scanner;

pub use crate::config::Settings;
pub use engine::{MaintenanceEngine, RunSummary};
pub use error::{Error, Result};
pub use inventory::Inventory;
pub use media::{MediaLibrary, MemoryLibrary, TomlLibrary, Track};
pub use platform::trash::{DirectoryTrash, Disposal, SystemTrash};
pub use progress::{ProgressReporter, SilentReporter, Stage};
pub use rules::Violation;
