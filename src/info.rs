//! Static device metadata: driver version, identity and supported event types.

use std::collections::BTreeSet;
use std::fmt;

use crate::bits::BitBuf;
use crate::device::{EventSource, InputId};
use crate::error::KbstatsError;
use crate::event_codes::EV_CNT;
use crate::names;
use crate::KbstatsResult;

/// A decoded evdev driver version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DriverVersion {
    pub major: u16,
    pub minor: u8,
    pub patch: u8,
}

impl From<i32> for DriverVersion {
    fn from(packed: i32) -> Self {
        let packed = packed as u32;

        Self {
            major: (packed >> 16) as u16,
            minor: (packed >> 8) as u8,
            patch: packed as u8,
        }
    }
}

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Everything [`describe`] learns about a device.
///
/// Only the driver version is mandatory; the other fields are `None` when the device refused to
/// report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub driver_version: DriverVersion,
    pub id: Option<InputId>,
    pub name: Option<String>,
    pub supported_event_types: Option<BTreeSet<u16>>,
}

/// Read the static metadata of `source`.
///
/// Fails only if the driver version can't be read.
pub fn describe<S: EventSource + ?Sized>(source: &S) -> KbstatsResult<DeviceInfo> {
    let driver_version = source
        .driver_version()
        .map(DriverVersion::from)
        .map_err(KbstatsError::Query)?;

    let id = source
        .input_id()
        .map_err(|e| log::warn!("can't read device id: {e}"))
        .ok();

    let name = source
        .device_name()
        .map_err(|e| log::warn!("can't read device name: {e}"))
        .ok();

    let mut bits = BitBuf::with_bits(EV_CNT);
    let supported_event_types = source
        .event_bits(0, &mut bits)
        .map_err(|e| log::warn!("can't read supported event types: {e}"))
        .ok()
        .map(|()| bits.ones().filter_map(|ty| u16::try_from(ty).ok()).collect());

    Ok(DeviceInfo {
        driver_version,
        id,
        name,
        supported_event_types,
    })
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input driver version is {}", self.driver_version)?;

        match &self.id {
            Some(id) => writeln!(
                f,
                "Input device ID: bus {:#x} vendor {:#x} product {:#x} version {:#x}",
                id.bus, id.vendor, id.product, id.version
            )?,
            None => writeln!(f, "Input device ID: unavailable")?,
        }

        writeln!(
            f,
            "Input device name: \"{}\"",
            self.name.as_deref().unwrap_or("Unknown")
        )?;

        write!(f, "Supported events:")?;
        match &self.supported_event_types {
            Some(types) => {
                for &ty in types {
                    write!(
                        f,
                        "\n  Event type {ty} ({})",
                        names::type_name(u32::from(ty))
                    )?;
                }
                Ok(())
            }
            None => write!(f, " unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::fake::FakeSource;
    use crate::event_codes::{EV_KEY, EV_MSC, EV_REP, EV_SYN};

    fn keyboard() -> FakeSource {
        FakeSource {
            version: Some(0x01_00_01),
            id: Some(InputId {
                bus: 0x11,
                vendor: 0x1,
                product: 0x1,
                version: 0xab41,
            }),
            name: Some("AT Translated Set 2 keyboard".into()),
            types: Some(vec![EV_SYN, EV_KEY, EV_MSC, EV_REP]),
            ..Default::default()
        }
    }

    #[test]
    fn driver_version_unpacks_three_fields() {
        assert_eq!(
            DriverVersion::from(0x0001_0001),
            DriverVersion {
                major: 1,
                minor: 0,
                patch: 1
            }
        );
        assert_eq!(
            DriverVersion::from(0x1234_5678),
            DriverVersion {
                major: 0x1234,
                minor: 0x56,
                patch: 0x78
            }
        );
        assert_eq!(DriverVersion::from(0x0001_0001).to_string(), "1.0.1");
    }

    #[test]
    fn describe_keyboard() {
        let info = describe(&keyboard()).unwrap();

        assert_eq!(info.driver_version.to_string(), "1.0.1");
        assert_eq!(info.id.unwrap().version, 0xab41);
        assert_eq!(info.name.as_deref(), Some("AT Translated Set 2 keyboard"));
        assert_eq!(
            info.supported_event_types.unwrap().into_iter().collect::<Vec<_>>(),
            vec![EV_SYN, EV_KEY, EV_MSC, EV_REP]
        );
    }

    #[test]
    fn report_format() {
        let report = describe(&keyboard()).unwrap().to_string();

        assert_eq!(
            report,
            "Input driver version is 1.0.1\n\
             Input device ID: bus 0x11 vendor 0x1 product 0x1 version 0xab41\n\
             Input device name: \"AT Translated Set 2 keyboard\"\n\
             Supported events:\n  \
             Event type 0 (EV_SYN)\n  \
             Event type 1 (EV_KEY)\n  \
             Event type 4 (EV_MSC)\n  \
             Event type 20 (EV_REP)"
        );
    }

    #[test]
    fn version_failure_is_fatal() {
        let source = FakeSource {
            version: None,
            ..keyboard()
        };

        assert!(matches!(describe(&source), Err(KbstatsError::Query(_))));
    }

    #[test]
    fn secondary_metadata_failures_are_absorbed() {
        let source = FakeSource {
            version: Some(0x01_00_01),
            ..Default::default()
        };

        let info = describe(&source).unwrap();
        assert_eq!(info.id, None);
        assert_eq!(info.name, None);
        assert_eq!(info.supported_event_types, None);

        let report = info.to_string();
        assert!(report.contains("Input device ID: unavailable"));
        assert!(report.contains("Input device name: \"Unknown\""));
        assert!(report.ends_with("Supported events: unavailable"));
    }
}
