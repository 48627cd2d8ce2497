use std::mem;
use std::ptr;

use chrono::{DateTime, NaiveDateTime};

use crate::error::KbstatsError;
use crate::KbstatsResult;

/// The size of one `struct input_event` record on the wire.
pub const RECORD_SIZE: usize = mem::size_of::<libc::input_event>();

/// The maximum number of records drained per read.
pub const MAX_BATCH: usize = 64;

/// A single event as delivered by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    /// The timestamp of the event.
    pub ts: NaiveDateTime,
    /// The event type (`EV_*`).
    pub ty: u16,
    /// The event code within `ty`.
    pub code: u16,
    pub value: i32,
}

impl TryFrom<&libc::input_event> for RawEvent {
    type Error = KbstatsError;

    fn try_from(ev: &libc::input_event) -> Result<Self, Self::Error> {
        let sec = i64::from(ev.time.tv_sec);
        let usec = i64::from(ev.time.tv_usec);

        let ts = u32::try_from(usec * 1000)
            .ok()
            .and_then(|nsec| DateTime::from_timestamp(sec, nsec))
            .ok_or(KbstatsError::InvalidTimestamp(sec, usec))?
            .naive_utc();

        Ok(Self {
            ts,
            ty: ev.type_,
            code: ev.code,
            value: ev.value,
        })
    }
}

/// Decode a batch of records read from an event device.
///
/// The batch must hold at least one record and its length must be a whole number of records.
/// Records whose timestamp can't be represented are logged and skipped.
pub fn decode_batch(bytes: &[u8]) -> KbstatsResult<Vec<RawEvent>> {
    if bytes.len() < RECORD_SIZE || bytes.len() % RECORD_SIZE != 0 {
        return Err(KbstatsError::ProtocolViolation {
            expected: RECORD_SIZE,
            got: bytes.len(),
        });
    }

    let events = bytes
        .chunks_exact(RECORD_SIZE)
        .map(|chunk| {
            // `chunk` is exactly RECORD_SIZE bytes; the buffer carries no alignment guarantee.
            let ev = unsafe { ptr::read_unaligned(chunk.as_ptr() as *const libc::input_event) };
            RawEvent::try_from(&ev)
        })
        .filter_map(|ev| match ev {
            Ok(ev) => Some(ev),
            Err(e) => {
                log::warn!("dropping event: {e}");
                None
            }
        })
        .collect::<Vec<_>>();

    Ok(events)
}

/// Encode one record the way the kernel lays it out on the wire.
#[cfg(test)]
pub(crate) fn encode(ty: u16, code: u16, value: i32) -> Vec<u8> {
    let ev = libc::input_event {
        time: libc::timeval {
            tv_sec: 1_700_000_000,
            tv_usec: 250_000,
        },
        type_: ty,
        code,
        value,
    };

    let bytes =
        unsafe { std::slice::from_raw_parts(&ev as *const libc::input_event as *const u8, RECORD_SIZE) };
    bytes.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_codes::{EV_KEY, EV_SYN};

    #[test]
    fn decodes_a_batch() {
        let mut bytes = encode(EV_KEY, 30, 1);
        bytes.extend(encode(EV_SYN, 0, 0));

        let events = decode_batch(&bytes).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].ty, events[0].code, events[0].value), (EV_KEY, 30, 1));
        assert_eq!(events[1].ty, EV_SYN);
        assert_eq!(events[0].ts.and_utc().timestamp(), 1_700_000_000);
        assert_eq!(events[0].ts.and_utc().timestamp_subsec_micros(), 250_000);
    }

    #[test]
    fn short_read_is_a_protocol_violation() {
        let err = decode_batch(&[0u8; 3]).unwrap_err();
        assert!(matches!(
            err,
            KbstatsError::ProtocolViolation { expected: RECORD_SIZE, got: 3 }
        ));
        assert!(matches!(
            decode_batch(&[]),
            Err(KbstatsError::ProtocolViolation { got: 0, .. })
        ));
    }

    #[test]
    fn trailing_partial_record_is_rejected() {
        let mut bytes = encode(EV_KEY, 30, 1);
        bytes.extend_from_slice(&[0u8; 5]);

        assert!(matches!(
            decode_batch(&bytes),
            Err(KbstatsError::ProtocolViolation { .. })
        ));
    }

    fn bad_timestamp_record() -> libc::input_event {
        libc::input_event {
            time: libc::timeval {
                tv_sec: 0,
                tv_usec: -1,
            },
            type_: EV_KEY,
            code: 30,
            value: 1,
        }
    }

    #[test]
    fn invalid_timestamp() {
        let ev = bad_timestamp_record();

        assert!(matches!(
            RawEvent::try_from(&ev),
            Err(KbstatsError::InvalidTimestamp(0, -1))
        ));
    }

    #[test]
    fn bad_timestamp_drops_only_that_record() {
        let ev = bad_timestamp_record();
        let mut bytes = unsafe {
            std::slice::from_raw_parts(&ev as *const libc::input_event as *const u8, RECORD_SIZE)
        }
        .to_vec();
        bytes.extend(encode(EV_KEY, 48, 1));

        let events = decode_batch(&bytes).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!((events[0].code, events[0].value), (48, 1));
    }
}
