use tracing::info;

use crate::error::Result;
use crate::media::MediaLibrary;

/// Ask every attached device to sync. Returns how many were synced.
pub fn sync_devices<L: MediaLibrary + ?Sized>(library: &mut L) -> Result<usize> {
    let devices = library.devices()?;
    for device in &devices {
        info!("Updating {}", device.name);
        library.sync_device(&device.id)?;
    }
    Ok(devices.len())
}
