// Event types and per-type code limits (see [input-event-codes.h] and the [kernel docs]).
//
// [input-event-codes.h]: https://elixir.bootlin.com/linux/v6.6/source/include/uapi/linux/input-event-codes.h
// [kernel docs]: https://www.kernel.org/doc/html/latest/input/event-codes.html
pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const EV_MSC: u16 = 0x04;
pub const EV_SW: u16 = 0x05;
pub const EV_LED: u16 = 0x11;
pub const EV_SND: u16 = 0x12;
pub const EV_REP: u16 = 0x14;
pub const EV_FF: u16 = 0x15;
pub const EV_PWR: u16 = 0x16;
pub const EV_FF_STATUS: u16 = 0x17;
pub const EV_MAX: u16 = 0x1f;
pub const EV_CNT: usize = EV_MAX as usize + 1;

pub const SYN_REPORT: u16 = 0x00;
pub const SYN_MAX: u16 = 0x0f;
pub const KEY_MAX: u16 = 0x2ff;
pub const REL_MAX: u16 = 0x0f;
pub const ABS_MAX: u16 = 0x3f;
pub const MSC_MAX: u16 = 0x07;
pub const SW_MAX: u16 = 0x10;
pub const LED_MAX: u16 = 0x0f;
pub const SND_MAX: u16 = 0x07;
pub const REP_MAX: u16 = 0x01;
pub const FF_MAX: u16 = 0x7f;
pub const FF_STATUS_MAX: u16 = 0x01;

/// The highest valid code for the event type `ty`, or `None` if the type carries no codes.
pub fn max_code(ty: u32) -> Option<u16> {
    let ty = u16::try_from(ty).ok()?;

    match ty {
        EV_SYN => Some(SYN_MAX),
        EV_KEY => Some(KEY_MAX),
        EV_REL => Some(REL_MAX),
        EV_ABS => Some(ABS_MAX),
        EV_MSC => Some(MSC_MAX),
        EV_SW => Some(SW_MAX),
        EV_LED => Some(LED_MAX),
        EV_SND => Some(SND_MAX),
        EV_REP => Some(REP_MAX),
        EV_FF => Some(FF_MAX),
        EV_FF_STATUS => Some(FF_STATUS_MAX),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codeless_types_have_no_max() {
        assert_eq!(max_code(EV_PWR as u32), None);
        assert_eq!(max_code(EV_MAX as u32), None);
        assert_eq!(max_code(0x1_0001), None);
        assert_eq!(max_code(EV_KEY as u32), Some(KEY_MAX));
    }
}
