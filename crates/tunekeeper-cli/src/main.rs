mod commands;
mod logging;
mod progress;

use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info};
use tunekeeper_core::{
    DirectoryTrash, Disposal, MaintenanceEngine, Settings, SilentReporter, SystemTrash,
    TomlLibrary,
};

fn main() {
    // exit only after the logger guard has flushed
    let code = run();
    process::exit(code);
}

fn run() -> i32 {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            return 1;
        }
    };

    let result: Result<(), Box<dyn std::error::Error>> = match args.command {
        Some(Commands::Run) => run_maintenance(settings),
        Some(Commands::Check) => run_check(settings),
        Some(Commands::Sync) => run_sync(settings),
        Some(Commands::PrintConfig) => print_config(&settings),
        None => Cli::command().print_long_help().map_err(Into::into),
    };

    match result {
        Ok(()) => 0,
        Err(err) => {
            error!("Error: {}", err);
            1
        }
    }
}

fn run_maintenance(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut library = TomlLibrary::open(&settings.library.path)?;
    let disposal: Box<dyn Disposal> = match &settings.library.trash_dir {
        Some(dir) => Box::new(DirectoryTrash::new(dir)),
        None => Box::new(SystemTrash),
    };

    let engine = MaintenanceEngine::new(settings);
    let result = engine.run(&mut library, disposal.as_ref(), &CliReporter)?;

    println!();
    info!(
        "Checks: {}, Maintenance: {}",
        format!("{:.2}s", result.validation_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.maintenance_duration.as_secs_f64()).green(),
    );
    info!(
        "{} tracks checked, {} pruned, {} added",
        format!("{}", result.tracks_scanned).cyan(),
        format!("{}", result.pruned).red(),
        format!("{}", result.imported).green(),
    );
    info!(
        "{} folder playlists rebuilt, {} devices synced",
        format!("{}", result.playlists_created).cyan(),
        format!("{}", result.devices_synced).cyan(),
    );

    Ok(())
}

fn run_check(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let library = TomlLibrary::open(&settings.library.path)?;
    let engine = MaintenanceEngine::new(settings);
    let violations = engine.check(&library, &SilentReporter)?;

    if violations.is_empty() {
        info!("{}", "No rule violations".green());
        Ok(())
    } else {
        Err(tunekeeper_core::Error::RulesBroken {
            count: violations.len(),
        }
        .into())
    }
}

fn run_sync(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut library = TomlLibrary::open(&settings.library.path)?;
    let engine = MaintenanceEngine::new(settings);
    let synced = engine.sync_devices(&mut library, &CliReporter)?;
    info!("{} devices synced", format!("{}", synced).cyan());
    Ok(())
}

fn print_config(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", toml::to_string_pretty(settings)?);
    Ok(())
}
