//! Policy gates that run before anything is changed.
//!
//! Both checkers only collect [`Violation`]s; deciding to abort is the
//! engine's job.

pub mod filesystem;
pub mod library;

pub use filesystem::{check_filesystem, check_no_banned_extensions, check_no_subfolders};
pub use library::{check_library, check_track_location};

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The library lost track of the file.
    UnresolvableLocation { name: String, artist: String },
    /// Track outside the Singles folder, album folders and managed storage.
    WrongLocation { path: PathBuf },
    /// Track inside a folder nested in an album folder.
    NestedAlbumSubfolder { path: PathBuf },
    /// Two library tracks point at the same file.
    DuplicateLocation { path: PathBuf },
    BannedExtension { path: PathBuf },
    /// Symlink pointing at nothing.
    BrokenLink { path: PathBuf },
    UnexpectedSubfolder { path: PathBuf },
    StrayFileInAlbumsRoot { path: PathBuf },
    MisnamedAlbumFolder { path: PathBuf, marker: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnresolvableLocation { name, artist } => {
                write!(f, "Track whose location cannot be found: {} by {}", name, artist)
            }
            Violation::WrongLocation { path } => {
                write!(f, "Track in wrong path: {}", path.display())
            }
            Violation::NestedAlbumSubfolder { path } => {
                write!(f, "Track in a subfolder of an album folder: {}", path.display())
            }
            Violation::DuplicateLocation { path } => {
                write!(f, "More than one track at: {}", path.display())
            }
            Violation::BannedExtension { path } => {
                write!(f, "File with banned extension: {}", path.display())
            }
            Violation::BrokenLink { path } => {
                write!(f, "Broken link found: {}", path.display())
            }
            Violation::UnexpectedSubfolder { path } => {
                write!(f, "Banned directory found: {}", path.display())
            }
            Violation::StrayFileInAlbumsRoot { path } => {
                write!(f, "Banned file in the albums folder: {}", path.display())
            }
            Violation::MisnamedAlbumFolder { path, marker } => {
                write!(f, "Album does not start with {}: {}", marker, path.display())
            }
        }
    }
}
