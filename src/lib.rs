//! This crate inspects Linux input event devices (`/dev/input/event*`).
//!
//! A [`DeviceHandle`] is opened with [`open_device`], or picked from the nodes listed by
//! [`scan_devices`]. From there it can be [described](describe), queried for the current state of a
//! single key, switch, LED or sound with [`query_state`], or streamed with [`capture`], which prints
//! one line per event until its [`CancelToken`] is set.
//!
//! # Example
//!
//! Print the events of a keyboard until interrupted. Most event devices are only readable by
//! root.
//!
//! ```no_run
//! use kbstats::{capture, open_device, CancelToken, KbstatsError};
//!
//! fn main() -> Result<(), KbstatsError> {
//!     let device = open_device("/dev/input/event0")?;
//!     println!("{}", device.info()?);
//!
//!     let cancel = CancelToken::new();
//!     cancel.install_signal_handlers()?;
//!
//!     capture(&device, &cancel, &mut std::io::stdout())
//! }
//! ```

#[cfg(not(target_os = "linux"))]
compile_error!("This crate only works on Linux");

pub mod bits;
pub mod capture;
pub mod device;
mod error;
pub mod event;
pub mod event_codes;
pub mod grab;
pub mod info;
pub mod names;
pub mod query;

pub use capture::{capture, CancelToken, CaptureState};
pub use device::scan::{scan_devices, select_device, DeviceEntry};
pub use device::{open_device, DeviceHandle, EventSource, InputId};
pub use error::{is_root, KbstatsError};
pub use event::RawEvent;
pub use grab::{release, try_grab, GrabMode};
pub use info::{describe, DeviceInfo, DriverVersion};
pub use names::{code_name, resolve_code, type_name, UNKNOWN};
pub use query::{find_query_mode, query_state, QueryMode, StateResult, QUERY_MODES};

pub type KbstatsResult<T> = Result<T, KbstatsError>;
