//! Discovery of `event*` nodes in an input directory.

use std::fs::{self, File};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use crate::device::ioctl;
use crate::error::KbstatsError;
use crate::KbstatsResult;

pub const INPUT_DIR: &str = "/dev/input";

const EVENT_DEV_NAME: &str = "event";
const UNKNOWN_NAME: &str = "???";

/// An event device found by [`scan_devices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub path: PathBuf,
    /// The numeric suffix of the node name (`3` for `event3`).
    pub number: u32,
    /// The name the device declares, or `???` if it can't be read.
    pub name: String,
}

/// List the `event<N>` nodes in `dir`, ordered by `N`.
///
/// Nodes that can't be opened are skipped.
pub fn scan_devices(dir: impl AsRef<Path>) -> KbstatsResult<Vec<DeviceEntry>> {
    let mut entries = fs::read_dir(dir.as_ref())?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let number = event_number(entry.file_name().to_str()?)?;
            let path = entry.path();

            let file = match File::open(&path) {
                Ok(file) => file,
                Err(e) => {
                    log::debug!("skipping {}: {e}", path.display());
                    return None;
                }
            };

            let name = ioctl::read_name(file.as_raw_fd()).unwrap_or_else(|_| UNKNOWN_NAME.into());

            Some(DeviceEntry { path, number, name })
        })
        .collect::<Vec<_>>();

    entries.sort_by_key(|entry| entry.number);

    Ok(entries)
}

/// Pick the entry whose number is `selection`.
pub fn select_device(entries: &[DeviceEntry], selection: i64) -> KbstatsResult<&DeviceEntry> {
    let invalid = || KbstatsError::InvalidSelection(selection.to_string());
    let number = u32::try_from(selection).map_err(|_| invalid())?;

    entries
        .iter()
        .find(|entry| entry.number == number)
        .ok_or_else(invalid)
}

/// The highest device number in `entries`.
pub fn max_device_number(entries: &[DeviceEntry]) -> Option<u32> {
    entries.iter().map(|entry| entry.number).max()
}

fn event_number(file_name: &str) -> Option<u32> {
    let suffix = file_name.strip_prefix(EVENT_DEV_NAME)?;

    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    suffix.parse().ok()
}
