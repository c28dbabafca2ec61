use std::fs;
use std::path::Path;

use tempfile::{tempdir, TempDir};
use tunekeeper_core::config::{FolderSettings, RuleSettings};
use tunekeeper_core::media::MediaLibrary;
use tunekeeper_core::{
    DirectoryTrash, Error, Inventory, MaintenanceEngine, MemoryLibrary, Settings, SilentReporter,
    TomlLibrary, Violation,
};

struct Fixture {
    dir: TempDir,
    settings: Settings,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let folders = FolderSettings {
            singles_root: dir.path().join("Singles"),
            albums_root: dir.path().join("Albums"),
            managed_root: dir.path().join("iTunes"),
        };
        fs::create_dir_all(&folders.singles_root).unwrap();
        fs::create_dir_all(&folders.albums_root).unwrap();
        let settings = Settings {
            folders,
            ..Settings::default()
        };
        Self { dir, settings }
    }

    fn album(&self, name: &str) -> std::path::PathBuf {
        let path = self.settings.folders.albums_root.join(name);
        fs::create_dir_all(&path).unwrap();
        path
    }

    fn singles(&self) -> &Path {
        &self.settings.folders.singles_root
    }

    fn trash(&self) -> DirectoryTrash {
        DirectoryTrash::new(self.dir.path().join("trash"))
    }
}

fn touch(path: &Path) {
    fs::write(path, b"audio").unwrap();
}

#[test]
fn test_clean_run_imports_and_builds_playlists() {
    let fx = Fixture::new();
    let album = fx.album("[Artist - Album]");
    touch(&album.join("02 Second.mp3"));
    touch(&album.join("01 First.mp3"));
    touch(&album.join("cover.jpg"));
    touch(&fx.singles().join("Hit.m4a"));

    let mut library = MemoryLibrary::new().with_device("iPod");
    let engine = MaintenanceEngine::new(fx.settings.clone());
    let summary = engine
        .run(&mut library, &fx.trash(), &SilentReporter)
        .unwrap();

    assert_eq!(summary.imported, 3);
    assert_eq!(summary.pruned, 0);
    assert_eq!(summary.playlists_created, 2);
    assert_eq!(summary.devices_synced, 1);
    assert_eq!(library.playlist_names(), vec!["[Artist - Album]", "Singles"]);

    let names: Vec<String> = library
        .playlist_tracks("[Artist - Album]")
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["01 First", "02 Second"]);
    assert_eq!(library.playlist_tracks("Singles").unwrap().len(), 1);
    assert_eq!(library.sync_count("iPod"), 1);
}

#[test]
fn test_second_run_imports_nothing_and_rebuilds_same_playlists() {
    let fx = Fixture::new();
    let album = fx.album("[Artist - Album]");
    touch(&album.join("a.mp3"));
    touch(&album.join("b.mp3"));
    touch(&fx.singles().join("s.mp3"));

    let mut library = MemoryLibrary::new();
    let engine = MaintenanceEngine::new(fx.settings.clone());

    let first = engine.run(&mut library, &fx.trash(), &SilentReporter).unwrap();
    let before: Vec<(String, Vec<String>)> = library
        .playlist_names()
        .into_iter()
        .map(|n| {
            let ids = library
                .playlist_tracks(&n)
                .unwrap()
                .into_iter()
                .map(|t| t.id.0)
                .collect();
            (n, ids)
        })
        .collect();

    let second = engine.run(&mut library, &fx.trash(), &SilentReporter).unwrap();
    let after: Vec<(String, Vec<String>)> = library
        .playlist_names()
        .into_iter()
        .map(|n| {
            let ids = library
                .playlist_tracks(&n)
                .unwrap()
                .into_iter()
                .map(|t| t.id.0)
                .collect();
            (n, ids)
        })
        .collect();

    assert_eq!(first.imported, 3);
    assert_eq!(second.imported, 0);
    assert_eq!(before, after);
}

#[test]
fn test_other_playlists_survive_rebuild() {
    let fx = Fixture::new();
    fx.album("[Empty - Album]");

    let mut library = MemoryLibrary::new()
        .with_playlist("Workout")
        .with_playlist("[Stale - Album]")
        .with_playlist("Singles");
    let engine = MaintenanceEngine::new(fx.settings.clone());
    engine.run(&mut library, &fx.trash(), &SilentReporter).unwrap();

    assert_eq!(
        library.playlist_names(),
        vec!["Workout", "[Empty - Album]", "Singles"]
    );
    assert!(library.playlist_tracks("[Empty - Album]").unwrap().is_empty());
}

#[test]
fn test_crap_track_is_pruned_into_trash() {
    let fx = Fixture::new();
    let album = fx.album("[Artist - Album]");
    let crap = album.join("bad.mp3");
    let keep = album.join("good.mp3");
    touch(&crap);
    touch(&keep);

    let mut library = MemoryLibrary::new()
        .with_track(&crap, fx.settings.library.crap_rating, 1)
        .with_track(&keep, 100, 2);
    let trash = fx.trash();
    let engine = MaintenanceEngine::new(fx.settings.clone());
    let summary = engine.run(&mut library, &trash, &SilentReporter).unwrap();

    assert_eq!(summary.pruned, 1);
    // the pruned file is gone from disk, so it is not imported again
    assert_eq!(summary.imported, 0);
    assert!(!crap.exists());
    assert!(trash.dir().join("bad.mp3").exists());

    let inventory = Inventory::load(&library).unwrap();
    assert!(!inventory.contains_path(&crap));
    assert!(inventory.contains_path(&keep));
    let members = library.playlist_tracks("[Artist - Album]").unwrap();
    assert_eq!(members.len(), 1);
}

#[test]
fn test_banned_file_aborts_before_any_change() {
    let fx = Fixture::new();
    let album = fx.album("[Artist - Album]");
    touch(&album.join("01.mp3"));
    touch(&album.join("02.mp3"));
    touch(&album.join("cover.txt"));

    let mut settings = fx.settings.clone();
    settings.rules = RuleSettings {
        allowed_file_extensions: vec!["mp3".into(), "m4a".into(), "jpg".into()],
        ..RuleSettings::default()
    };

    let mut library = MemoryLibrary::new()
        .with_playlist("[Artist - Album]")
        .with_device("iPod");
    let engine = MaintenanceEngine::new(settings);

    let violations = engine.check(&library, &SilentReporter).unwrap();
    assert_eq!(
        violations,
        vec![Violation::BannedExtension {
            path: album.join("cover.txt")
        }]
    );

    let err = engine
        .run(&mut library, &fx.trash(), &SilentReporter)
        .unwrap_err();
    assert!(matches!(err, Error::RulesBroken { count: 1 }));
    assert!(library.tracks().unwrap().is_empty());
    assert_eq!(library.playlist_names(), vec!["[Artist - Album]"]);
    assert_eq!(library.sync_count("iPod"), 0);
}

#[test]
fn test_misplaced_track_aborts_run() {
    let fx = Fixture::new();
    let elsewhere = fx.dir.path().join("Downloads").join("x.mp3");

    let mut library = MemoryLibrary::new().with_track(&elsewhere, 0, 0);
    let engine = MaintenanceEngine::new(fx.settings.clone());

    let violations = engine.check(&library, &SilentReporter).unwrap();
    assert_eq!(violations, vec![Violation::WrongLocation { path: elsewhere }]);
    assert!(matches!(
        engine.run(&mut library, &fx.trash(), &SilentReporter),
        Err(Error::RulesBroken { count: 1 })
    ));
}

#[test]
fn test_lagging_playlist_deletes_converge() {
    let fx = Fixture::new();
    fx.album("[A - B]");

    let mut library = MemoryLibrary::new()
        .with_playlist("[A - B]")
        .with_playlist("Singles")
        .with_deletion_lag(2);
    let engine = MaintenanceEngine::new(fx.settings.clone());
    let summary = engine.run(&mut library, &fx.trash(), &SilentReporter).unwrap();

    assert_eq!(summary.playlist_delete_passes, 3);
    assert_eq!(library.playlist_names(), vec!["[A - B]", "Singles"]);
}

#[test]
fn test_playlist_deletes_give_up_after_max_passes() {
    let fx = Fixture::new();
    let mut settings = fx.settings.clone();
    settings.library.max_playlist_delete_passes = 2;

    let mut library = MemoryLibrary::new()
        .with_playlist("[A - B]")
        .with_deletion_lag(10)
        .with_device("iPod");
    let engine = MaintenanceEngine::new(settings);
    let err = engine
        .run(&mut library, &fx.trash(), &SilentReporter)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::PlaylistsDidNotConverge {
            passes: 2,
            remaining: 1
        }
    ));
    assert_eq!(library.sync_count("iPod"), 0);
}

#[test]
fn test_toml_library_end_to_end() {
    let fx = Fixture::new();
    let album = fx.album("[Artist - Album]");
    touch(&album.join("01.mp3"));
    touch(&fx.singles().join("single.mp3"));
    let store = fx.dir.path().join("library.toml");

    let mut library = TomlLibrary::open(&store).unwrap();
    library.add_device("iPhone").unwrap();
    let engine = MaintenanceEngine::new(fx.settings.clone());
    let summary = engine.run(&mut library, &fx.trash(), &SilentReporter).unwrap();
    assert_eq!(summary.imported, 2);
    drop(library);

    let library = TomlLibrary::open(&store).unwrap();
    assert_eq!(library.tracks().unwrap().len(), 2);
    let names: Vec<String> = library.playlists().unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["[Artist - Album]", "Singles"]);
    let device = &library.devices().unwrap()[0];
    assert!(library.state().device(&device.id).unwrap().last_synced.is_some());
}
