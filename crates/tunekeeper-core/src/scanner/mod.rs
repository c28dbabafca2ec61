mod folders;

pub use folders::{album_folders, has_extension_in, is_ignored_filename, list_entries, FolderEntry};
