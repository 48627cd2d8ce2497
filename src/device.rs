pub(crate) mod ioctl;
pub mod scan;

use std::cell::OnceCell;
use std::fs::File;
use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use crate::bits::BitBuf;
use crate::error::KbstatsError;
use crate::info::{self, DeviceInfo};
use crate::query::QueryMode;
use crate::KbstatsResult;

/// The identity reported by `EVIOCGID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputId {
    pub bus: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

impl From<libc::input_id> for InputId {
    fn from(id: libc::input_id) -> Self {
        Self {
            bus: id.bustype,
            vendor: id.vendor,
            product: id.product,
            version: id.version,
        }
    }
}

/// The device-control operations the queries and the capture loop are built on.
///
/// [`DeviceHandle`] implements this on top of the evdev ioctls.
pub trait EventSource {
    /// The packed evdev driver version.
    fn driver_version(&self) -> io::Result<i32>;

    fn input_id(&self) -> io::Result<InputId>;

    /// The name the device declares for itself.
    fn device_name(&self) -> io::Result<String>;

    /// Fill `bits` with the codes of type `ty` the device supports (`ty == 0`: the event types).
    fn event_bits(&self, ty: u16, bits: &mut BitBuf) -> io::Result<()>;

    /// Fill `bits` with the current state for `mode`.
    fn state_bits(&self, mode: &QueryMode, bits: &mut BitBuf) -> io::Result<()>;

    /// Request (`true`) or give up (`false`) exclusive access.
    fn set_grab(&self, grab: bool) -> io::Result<()>;

    /// Block until events are available to read.
    fn wait_readable(&self) -> io::Result<()>;

    /// Read a batch of raw records into `buf`, returning the number of bytes read.
    fn read_records(&self, buf: &mut [u8]) -> io::Result<usize>;
}

/// An open event device.
///
/// The descriptor is closed when the handle is dropped.
#[derive(Debug)]
pub struct DeviceHandle {
    /// The path of the input device (e.g. `/dev/input/event0`).
    path: PathBuf,
    /// The open input device file.
    file: File,
    info: OnceCell<DeviceInfo>,
}

/// Open the event device at `path` for reading.
pub fn open_device(path: impl AsRef<Path>) -> KbstatsResult<DeviceHandle> {
    DeviceHandle::open(path)
}

impl DeviceHandle {
    pub fn open(path: impl AsRef<Path>) -> KbstatsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| KbstatsError::from_open(e, path.clone()))?;

        log::debug!("opened {} (fd {})", path.display(), file.as_raw_fd());

        Ok(Self {
            path,
            file,
            info: OnceCell::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The static device metadata, read on first use and cached afterwards.
    pub fn info(&self) -> KbstatsResult<&DeviceInfo> {
        if let Some(info) = self.info.get() {
            return Ok(info);
        }

        let info = info::describe(self)?;
        Ok(self.info.get_or_init(|| info))
    }
}

impl EventSource for DeviceHandle {
    fn driver_version(&self) -> io::Result<i32> {
        ioctl::read_version(self.file.as_raw_fd())
    }

    fn input_id(&self) -> io::Result<InputId> {
        ioctl::read_id(self.file.as_raw_fd()).map(InputId::from)
    }

    fn device_name(&self) -> io::Result<String> {
        ioctl::read_name(self.file.as_raw_fd())
    }

    fn event_bits(&self, ty: u16, bits: &mut BitBuf) -> io::Result<()> {
        let ty = u8::try_from(ty).map_err(|_| io::Error::from_raw_os_error(libc::EINVAL))?;
        ioctl::read_bits(self.file.as_raw_fd(), ty, bits)
    }

    fn state_bits(&self, mode: &QueryMode, bits: &mut BitBuf) -> io::Result<()> {
        ioctl::read_state(self.file.as_raw_fd(), mode.request, bits)
    }

    fn set_grab(&self, grab: bool) -> io::Result<()> {
        ioctl::grab(self.file.as_raw_fd(), grab)
    }

    fn wait_readable(&self) -> io::Result<()> {
        ioctl::poll_readable(self.file.as_raw_fd())
    }

    fn read_records(&self, buf: &mut [u8]) -> io::Result<usize> {
        ioctl::read(self.file.as_raw_fd(), buf)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeSet, VecDeque};

    use super::*;

    /// An in-memory [`EventSource`] that records how it was used.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub(crate) version: Option<i32>,
        pub(crate) id: Option<InputId>,
        pub(crate) name: Option<String>,
        pub(crate) types: Option<Vec<u16>>,
        pub(crate) held: RefCell<BTreeSet<usize>>,
        pub(crate) disconnected: Cell<bool>,
        pub(crate) grab_refused: bool,
        pub(crate) grabbed: Cell<bool>,
        pub(crate) grab_calls: RefCell<Vec<bool>>,
        pub(crate) state_queries: Cell<usize>,
        pub(crate) batches: RefCell<VecDeque<io::Result<Vec<u8>>>>,
        pub(crate) waits: Cell<usize>,
        pub(crate) reads: Cell<usize>,
        /// Called on every wait, with the number of waits so far.
        pub(crate) on_wait: Option<Box<dyn Fn(usize) -> io::Result<()>>>,
    }

    fn enodev() -> io::Error {
        io::Error::from_raw_os_error(libc::ENODEV)
    }

    impl EventSource for FakeSource {
        fn driver_version(&self) -> io::Result<i32> {
            self.version.ok_or_else(enodev)
        }

        fn input_id(&self) -> io::Result<InputId> {
            self.id.ok_or_else(enodev)
        }

        fn device_name(&self) -> io::Result<String> {
            self.name.clone().ok_or_else(enodev)
        }

        fn event_bits(&self, ty: u16, bits: &mut BitBuf) -> io::Result<()> {
            assert_eq!(ty, 0);
            for &t in self.types.as_ref().ok_or_else(enodev)? {
                bits.set(usize::from(t));
            }
            Ok(())
        }

        fn state_bits(&self, _mode: &QueryMode, bits: &mut BitBuf) -> io::Result<()> {
            self.state_queries.set(self.state_queries.get() + 1);
            if self.disconnected.get() {
                return Err(enodev());
            }
            for &code in self.held.borrow().iter() {
                bits.set(code);
            }
            Ok(())
        }

        fn set_grab(&self, grab: bool) -> io::Result<()> {
            self.grab_calls.borrow_mut().push(grab);
            if grab {
                if self.grab_refused {
                    return Err(io::Error::from_raw_os_error(libc::EBUSY));
                }
                self.grabbed.set(true);
                Ok(())
            } else if self.grabbed.replace(false) {
                Ok(())
            } else {
                Err(io::Error::from_raw_os_error(libc::EINVAL))
            }
        }

        fn wait_readable(&self) -> io::Result<()> {
            let n = self.waits.get() + 1;
            self.waits.set(n);
            match &self.on_wait {
                Some(f) => f(n),
                None => Ok(()),
            }
        }

        fn read_records(&self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads.set(self.reads.get() + 1);
            let batch = self
                .batches
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(enodev()))?;
            let n = batch.len().min(buf.len());
            buf[..n].copy_from_slice(&batch[..n]);
            Ok(n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_device() {
        let err = open_device("/dev/input/does-not-exist").unwrap_err();
        assert!(matches!(err, KbstatsError::NotFound(_)));
    }

    #[test]
    fn non_evdev_files_fail_the_version_query() {
        let handle = open_device("/proc/self/status").unwrap();
        assert_eq!(handle.path(), Path::new("/proc/self/status"));
        assert!(handle.driver_version().is_err());
        assert!(matches!(handle.info(), Err(KbstatsError::Query(_))));
    }
}
