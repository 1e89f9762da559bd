//! OpenCL device roster.
//!
//! A request either searches on every GPU visible through OpenCL or on
//! an explicit roster picked interactively on the host terminal. Worker
//! `i` always binds to roster entry `i`.

use dialoguer::MultiSelect;
use ocl::flags::DeviceType;
use ocl::{Device, Platform};
use tracing::{debug, warn};

use crate::error::{KeygrindError, Result};

/// One accelerator resolved to a concrete OpenCL platform/device pair.
#[derive(Debug, Clone)]
pub struct ResolvedDevice {
    pub platform: Platform,
    pub device: Device,
    pub name: String,
}

/// Enumerate every GPU device across all OpenCL platforms, in platform
/// order. Fails with [`KeygrindError::NoDevices`] when nothing is found.
pub fn enumerate_all() -> Result<Vec<ResolvedDevice>> {
    let mut roster = Vec::new();

    for platform in Platform::list() {
        let devices = match Device::list(platform, Some(DeviceType::GPU)) {
            Ok(devices) => devices,
            Err(e) => {
                // A broken ICD should not hide the other platforms.
                let platform_name = platform
                    .name()
                    .unwrap_or_else(|_| "unknown platform".to_string());
                warn!("Skipping OpenCL platform {platform_name}: {e}");
                continue;
            }
        };

        for device in devices {
            let name = device
                .name()
                .unwrap_or_else(|_| "unknown device".to_string());
            debug!("Found OpenCL device: {name}");
            roster.push(ResolvedDevice {
                platform,
                device,
                name,
            });
        }
    }

    if roster.is_empty() {
        return Err(KeygrindError::NoDevices);
    }
    Ok(roster)
}

/// Let the operator pick a device subset on the host terminal.
///
/// Selection happens on the server console, not over the API; this
/// mirrors running the host interactively next to the hardware.
pub fn choose_interactively() -> Result<Vec<ResolvedDevice>> {
    let all = enumerate_all()?;
    let names: Vec<&str> = all.iter().map(|d| d.name.as_str()).collect();

    let chosen = MultiSelect::new()
        .with_prompt("Select OpenCL devices to search on")
        .items(&names)
        .defaults(&vec![true; names.len()])
        .interact()
        .map_err(|e| KeygrindError::DeviceSelection(e.to_string()))?;

    if chosen.is_empty() {
        return Err(KeygrindError::NoDevices);
    }

    let mut roster = Vec::with_capacity(chosen.len());
    for index in chosen {
        roster.push(all[index].clone());
    }
    Ok(roster)
}
