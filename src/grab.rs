use crate::device::EventSource;

/// What to do after a successful grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabMode {
    /// Release immediately: only test whether the device could be grabbed.
    Probe,
    /// Keep exclusive access until [`release`].
    Retain,
}

/// Request exclusive access to `source`, returning whether the grab succeeded.
///
/// A failed grab usually means another process holds the device. With [`GrabMode::Probe`] a
/// successful grab is released again before returning.
pub fn try_grab<S: EventSource + ?Sized>(source: &S, mode: GrabMode) -> bool {
    if let Err(e) = source.set_grab(true) {
        log::warn!("can't grab device: {e}");
        return false;
    }

    if mode == GrabMode::Probe {
        release(source);
    }

    true
}

/// Give up exclusive access. Releasing a device that isn't grabbed is a no-op.
pub fn release<S: EventSource + ?Sized>(source: &S) {
    if let Err(e) = source.set_grab(false) {
        log::debug!("ungrab: {e}");
    }
}
