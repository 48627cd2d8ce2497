//! The live capture loop.
//!
//! Events are read in batches once the device becomes readable, resolved to names and printed one
//! per line. Consecutive repeats of the same event collapse into a single line, and synchronization
//! markers and unnamed codes are never printed.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::{SIGINT, SIGTERM};

use crate::device::EventSource;
use crate::event::{self, RawEvent, MAX_BATCH, RECORD_SIZE};
use crate::event_codes::EV_SYN;
use crate::grab;
use crate::names::{self, UNKNOWN};
use crate::KbstatsResult;

/// A cancellation flag that can be set from a signal handler.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel on `SIGINT` and `SIGTERM`.
    pub fn install_signal_handlers(&self) -> io::Result<()> {
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&self.0))?;
        }

        Ok(())
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The loop-local deduplication state.
#[derive(Debug, Default)]
pub struct CaptureState {
    /// The last printed name and whether it was down (pressed or repeating) at the time.
    last_emitted: Option<(&'static str, bool)>,
}

impl CaptureState {
    /// Feed one event, returning the name to print, if any.
    ///
    /// An event is printed unless it repeats the last printed name in the same direction. Any
    /// non-zero value counts as down, so a press followed by its auto-repeats prints once while
    /// the release prints again. Sync markers and unnamed codes are dropped without touching the
    /// state.
    pub fn observe(&mut self, ev: &RawEvent) -> Option<&'static str> {
        if ev.ty == EV_SYN {
            return None;
        }

        let name = names::code_name(u32::from(ev.ty), u32::from(ev.code));
        if name == UNKNOWN {
            return None;
        }

        let current = Some((name, ev.value != 0));
        let emit = self.last_emitted != current;
        self.last_emitted = current;

        emit.then_some(name)
    }

    /// The most recently printed name.
    pub fn last_emitted_name(&self) -> Option<&'static str> {
        self.last_emitted.map(|(name, _)| name)
    }
}

/// Print the events of `source` to `out` until `cancel` is set.
///
/// Any grab held on `source` is released before returning, whether the loop was cancelled or
/// failed. Read failures and malformed batches end the loop with an error.
pub fn capture<S, W>(source: &S, cancel: &CancelToken, out: &mut W) -> KbstatsResult<()>
where
    S: EventSource + ?Sized,
    W: Write,
{
    log::info!("capturing events");

    let result = run(source, cancel, out);

    grab::release(source);

    match &result {
        Ok(()) => log::info!("capture cancelled"),
        Err(e) => log::error!("capture failed: {e}"),
    }

    result
}

fn run<S, W>(source: &S, cancel: &CancelToken, out: &mut W) -> KbstatsResult<()>
where
    S: EventSource + ?Sized,
    W: Write,
{
    let mut state = CaptureState::default();
    let mut buf = vec![0u8; RECORD_SIZE * MAX_BATCH];

    loop {
        let ready = match source.wait_readable() {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => false,
            Err(e) => return Err(e.into()),
        };

        // Checked before reading: a signal that ends the wait must not lead to a read.
        if cancel.is_cancelled() {
            return Ok(());
        }

        if !ready {
            continue;
        }

        let n = match source.read_records(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        for ev in event::decode_batch(&buf[..n])? {
            if let Some(name) = state.observe(&ev) {
                writeln!(out, "{name}")?;
            }
        }

        out.flush()?;
    }
}
