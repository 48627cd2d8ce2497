//! One-shot state queries ("is this key held right now?").

use std::io;

use crate::bits::BitBuf;
use crate::device::ioctl::{EVIOCGKEY, EVIOCGLED, EVIOCGSND, EVIOCGSW};
use crate::device::EventSource;
use crate::error::KbstatsError;
use crate::event_codes::{EV_KEY, EV_LED, EV_SND, EV_SW, KEY_MAX, LED_MAX, SND_MAX, SW_MAX};
use crate::names;
use crate::KbstatsResult;

/// A queryable capability domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryMode {
    pub name: &'static str,
    pub event_type: u16,
    /// The highest code that can be queried; the state buffer holds `max_code + 1` bits.
    pub max_code: u16,
    /// The `EVIOCG*` request number that reads the state.
    pub request: u8,
}

pub const QUERY_MODES: &[QueryMode] = &[
    QueryMode {
        name: "EV_KEY",
        event_type: EV_KEY,
        max_code: KEY_MAX,
        request: EVIOCGKEY,
    },
    QueryMode {
        name: "EV_SW",
        event_type: EV_SW,
        max_code: SW_MAX,
        request: EVIOCGSW,
    },
    QueryMode {
        name: "EV_LED",
        event_type: EV_LED,
        max_code: LED_MAX,
        request: EVIOCGLED,
    },
    QueryMode {
        name: "EV_SND",
        event_type: EV_SND,
        max_code: SND_MAX,
        request: EVIOCGSND,
    },
];

/// Look up a query mode by name (`EV_KEY`) or by its numeric event type (`1`).
pub fn find_query_mode(text: &str) -> KbstatsResult<&'static QueryMode> {
    let by_number = text.parse::<u16>().ok();

    QUERY_MODES
        .iter()
        .find(|mode| mode.name == text || Some(mode.event_type) == by_number)
        .ok_or_else(|| KbstatsError::UnknownQueryMode(text.to_string()))
}

impl QueryMode {
    /// Resolve `text` (a name like `KEY_A` or a numeral) to a code of this mode.
    pub fn resolve_code(&self, text: &str) -> KbstatsResult<u32> {
        names::resolve_code(self.event_type, text)
    }

    /// Reject `code` if it lies above [`max_code`](Self::max_code).
    pub fn check(&self, code: u32) -> KbstatsResult<()> {
        if code > u32::from(self.max_code) {
            return Err(KbstatsError::OutOfRange {
                code,
                max: self.max_code,
            });
        }

        Ok(())
    }
}

/// The outcome of a state query.
#[derive(Debug)]
pub enum StateResult {
    /// The code's state bit is clear.
    BitClear,
    /// The code's state bit is set.
    BitSet,
    /// The device refused the query.
    QueryFailed(io::Error),
}

/// Read the current state of `code` in `mode`.
///
/// Codes above `mode.max_code` are rejected without touching the device.
pub fn query_state<S: EventSource + ?Sized>(
    source: &S,
    mode: &QueryMode,
    code: u32,
) -> KbstatsResult<StateResult> {
    mode.check(code)?;

    let mut state = BitBuf::with_bits(usize::from(mode.max_code) + 1);

    if let Err(e) = source.state_bits(mode, &mut state) {
        log::debug!("{} state query failed: {e}", mode.name);
        return Ok(StateResult::QueryFailed(e));
    }

    // `code <= max_code`, which always fits in usize
    let bit = code as usize;
    if state.test(bit) {
        Ok(StateResult::BitSet)
    } else {
        Ok(StateResult::BitClear)
    }
}
