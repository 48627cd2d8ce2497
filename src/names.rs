//! Human readable names for event types and codes.
//!
//! The tables are built once, on first use, and never change afterwards. Every lookup is bounds
//! checked against the per-type maximum from [`event_codes::max_code`], so any `(type, code)` pair
//! resolves either to a registered name or to [`UNKNOWN`].

use std::sync::LazyLock;

use crate::error::KbstatsError;
use crate::event_codes::{self, *};
use crate::KbstatsResult;

/// The name reported for unregistered types and codes.
pub const UNKNOWN: &str = "?";

static REGISTRY: LazyLock<NameRegistry> = LazyLock::new(NameRegistry::new);

const TYPE_NAMES: &[(u16, &str)] = &[
    (EV_SYN, "EV_SYN"),
    (EV_KEY, "EV_KEY"),
    (EV_REL, "EV_REL"),
    (EV_ABS, "EV_ABS"),
    (EV_MSC, "EV_MSC"),
    (EV_SW, "EV_SW"),
    (EV_LED, "EV_LED"),
    (EV_SND, "EV_SND"),
    (EV_REP, "EV_REP"),
    (EV_FF, "EV_FF"),
    (EV_PWR, "EV_PWR"),
    (EV_FF_STATUS, "EV_FF_STATUS"),
];

const SYN_NAMES: &[(u16, &str)] = &[
    (0x00, "SYN_REPORT"),
    (0x01, "SYN_CONFIG"),
    (0x02, "SYN_MT_REPORT"),
    (0x03, "SYN_DROPPED"),
];

const KEY_NAMES: &[(u16, &str)] = &[
    (0, "KEY_RESERVED"),
    (1, "KEY_ESC"),
    (2, "KEY_1"),
    (3, "KEY_2"),
    (4, "KEY_3"),
    (5, "KEY_4"),
    (6, "KEY_5"),
    (7, "KEY_6"),
    (8, "KEY_7"),
    (9, "KEY_8"),
    (10, "KEY_9"),
    (11, "KEY_0"),
    (12, "KEY_MINUS"),
    (13, "KEY_EQUAL"),
    (14, "KEY_BACKSPACE"),
    (15, "KEY_TAB"),
    (16, "KEY_Q"),
    (17, "KEY_W"),
    (18, "KEY_E"),
    (19, "KEY_R"),
    (20, "KEY_T"),
    (21, "KEY_Y"),
    (22, "KEY_U"),
    (23, "KEY_I"),
    (24, "KEY_O"),
    (25, "KEY_P"),
    (26, "KEY_LEFTBRACE"),
    (27, "KEY_RIGHTBRACE"),
    (28, "KEY_ENTER"),
    (29, "KEY_LEFTCTRL"),
    (30, "KEY_A"),
    (31, "KEY_S"),
    (32, "KEY_D"),
    (33, "KEY_F"),
    (34, "KEY_G"),
    (35, "KEY_H"),
    (36, "KEY_J"),
    (37, "KEY_K"),
    (38, "KEY_L"),
    (39, "KEY_SEMICOLON"),
    (40, "KEY_APOSTROPHE"),
    (41, "KEY_GRAVE"),
    (42, "KEY_LEFTSHIFT"),
    (43, "KEY_BACKSLASH"),
    (44, "KEY_Z"),
    (45, "KEY_X"),
    (46, "KEY_C"),
    (47, "KEY_V"),
    (48, "KEY_B"),
    (49, "KEY_N"),
    (50, "KEY_M"),
    (51, "KEY_COMMA"),
    (52, "KEY_DOT"),
    (53, "KEY_SLASH"),
    (54, "KEY_RIGHTSHIFT"),
    (55, "KEY_KPASTERISK"),
    (56, "KEY_LEFTALT"),
    (57, "KEY_SPACE"),
    (58, "KEY_CAPSLOCK"),
    (59, "KEY_F1"),
    (60, "KEY_F2"),
    (61, "KEY_F3"),
    (62, "KEY_F4"),
    (63, "KEY_F5"),
    (64, "KEY_F6"),
    (65, "KEY_F7"),
    (66, "KEY_F8"),
    (67, "KEY_F9"),
    (68, "KEY_F10"),
    (69, "KEY_NUMLOCK"),
    (70, "KEY_SCROLLLOCK"),
    (71, "KEY_KP7"),
    (72, "KEY_KP8"),
    (73, "KEY_KP9"),
    (74, "KEY_KPMINUS"),
    (75, "KEY_KP4"),
    (76, "KEY_KP5"),
    (77, "KEY_KP6"),
    (78, "KEY_KPPLUS"),
    (79, "KEY_KP1"),
    (80, "KEY_KP2"),
    (81, "KEY_KP3"),
    (82, "KEY_KP0"),
    (83, "KEY_KPDOT"),
    (85, "KEY_ZENKAKUHANKAKU"),
    (86, "KEY_102ND"),
    (87, "KEY_F11"),
    (88, "KEY_F12"),
    (89, "KEY_RO"),
    (90, "KEY_KATAKANA"),
    (91, "KEY_HIRAGANA"),
    (92, "KEY_HENKAN"),
    (93, "KEY_KATAKANAHIRAGANA"),
    (94, "KEY_MUHENKAN"),
    (95, "KEY_KPJPCOMMA"),
    (96, "KEY_KPENTER"),
    (97, "KEY_RIGHTCTRL"),
    (98, "KEY_KPSLASH"),
    (99, "KEY_SYSRQ"),
    (100, "KEY_RIGHTALT"),
    (101, "KEY_LINEFEED"),
    (102, "KEY_HOME"),
    (103, "KEY_UP"),
    (104, "KEY_PAGEUP"),
    (105, "KEY_LEFT"),
    (106, "KEY_RIGHT"),
    (107, "KEY_END"),
    (108, "KEY_DOWN"),
    (109, "KEY_PAGEDOWN"),
    (110, "KEY_INSERT"),
    (111, "KEY_DELETE"),
    (112, "KEY_MACRO"),
    (113, "KEY_MUTE"),
    (114, "KEY_VOLUMEDOWN"),
    (115, "KEY_VOLUMEUP"),
    (116, "KEY_POWER"),
    (117, "KEY_KPEQUAL"),
    (118, "KEY_KPPLUSMINUS"),
    (119, "KEY_PAUSE"),
    (120, "KEY_SCALE"),
    (121, "KEY_KPCOMMA"),
    (122, "KEY_HANGEUL"),
    (123, "KEY_HANJA"),
    (124, "KEY_YEN"),
    (125, "KEY_LEFTMETA"),
    (126, "KEY_RIGHTMETA"),
    (127, "KEY_COMPOSE"),
    (128, "KEY_STOP"),
    (129, "KEY_AGAIN"),
    (130, "KEY_PROPS"),
    (131, "KEY_UNDO"),
    (132, "KEY_FRONT"),
    (133, "KEY_COPY"),
    (134, "KEY_OPEN"),
    (135, "KEY_PASTE"),
    (136, "KEY_FIND"),
    (137, "KEY_CUT"),
    (138, "KEY_HELP"),
    (139, "KEY_MENU"),
    (140, "KEY_CALC"),
    (141, "KEY_SETUP"),
    (142, "KEY_SLEEP"),
    (143, "KEY_WAKEUP"),
    (144, "KEY_FILE"),
    (145, "KEY_SENDFILE"),
    (146, "KEY_DELETEFILE"),
    (147, "KEY_XFER"),
    (148, "KEY_PROG1"),
    (149, "KEY_PROG2"),
    (150, "KEY_WWW"),
    (151, "KEY_MSDOS"),
    (152, "KEY_COFFEE"),
    (153, "KEY_ROTATE_DISPLAY"),
    (154, "KEY_CYCLEWINDOWS"),
    (155, "KEY_MAIL"),
    (156, "KEY_BOOKMARKS"),
    (157, "KEY_COMPUTER"),
    (158, "KEY_BACK"),
    (159, "KEY_FORWARD"),
    (160, "KEY_CLOSECD"),
    (161, "KEY_EJECTCD"),
    (162, "KEY_EJECTCLOSECD"),
    (163, "KEY_NEXTSONG"),
    (164, "KEY_PLAYPAUSE"),
    (165, "KEY_PREVIOUSSONG"),
    (166, "KEY_STOPCD"),
    (167, "KEY_RECORD"),
    (168, "KEY_REWIND"),
    (169, "KEY_PHONE"),
    (170, "KEY_ISO"),
    (171, "KEY_CONFIG"),
    (172, "KEY_HOMEPAGE"),
    (173, "KEY_REFRESH"),
    (174, "KEY_EXIT"),
    (175, "KEY_MOVE"),
    (176, "KEY_EDIT"),
    (177, "KEY_SCROLLUP"),
    (178, "KEY_SCROLLDOWN"),
    (179, "KEY_KPLEFTPAREN"),
    (180, "KEY_KPRIGHTPAREN"),
    (181, "KEY_NEW"),
    (182, "KEY_REDO"),
    (183, "KEY_F13"),
    (184, "KEY_F14"),
    (185, "KEY_F15"),
    (186, "KEY_F16"),
    (187, "KEY_F17"),
    (188, "KEY_F18"),
    (189, "KEY_F19"),
    (190, "KEY_F20"),
    (191, "KEY_F21"),
    (192, "KEY_F22"),
    (193, "KEY_F23"),
    (194, "KEY_F24"),
    (200, "KEY_PLAYCD"),
    (201, "KEY_PAUSECD"),
    (202, "KEY_PROG3"),
    (203, "KEY_PROG4"),
    (204, "KEY_ALL_APPLICATIONS"),
    (205, "KEY_SUSPEND"),
    (206, "KEY_CLOSE"),
    (207, "KEY_PLAY"),
    (208, "KEY_FASTFORWARD"),
    (209, "KEY_BASSBOOST"),
    (210, "KEY_PRINT"),
    (211, "KEY_HP"),
    (212, "KEY_CAMERA"),
    (213, "KEY_SOUND"),
    (214, "KEY_QUESTION"),
    (215, "KEY_EMAIL"),
    (216, "KEY_CHAT"),
    (217, "KEY_SEARCH"),
    (218, "KEY_CONNECT"),
    (219, "KEY_FINANCE"),
    (220, "KEY_SPORT"),
    (221, "KEY_SHOP"),
    (222, "KEY_ALTERASE"),
    (223, "KEY_CANCEL"),
    (224, "KEY_BRIGHTNESSDOWN"),
    (225, "KEY_BRIGHTNESSUP"),
    (226, "KEY_MEDIA"),
    (227, "KEY_SWITCHVIDEOMODE"),
    (228, "KEY_KBDILLUMTOGGLE"),
    (229, "KEY_KBDILLUMDOWN"),
    (230, "KEY_KBDILLUMUP"),
    (231, "KEY_SEND"),
    (232, "KEY_REPLY"),
    (233, "KEY_FORWARDMAIL"),
    (234, "KEY_SAVE"),
    (235, "KEY_DOCUMENTS"),
    (236, "KEY_BATTERY"),
    (237, "KEY_BLUETOOTH"),
    (238, "KEY_WLAN"),
    (239, "KEY_UWB"),
    (240, "KEY_UNKNOWN"),
    (241, "KEY_VIDEO_NEXT"),
    (242, "KEY_VIDEO_PREV"),
    (243, "KEY_BRIGHTNESS_CYCLE"),
    (244, "KEY_BRIGHTNESS_AUTO"),
    (245, "KEY_DISPLAY_OFF"),
    (246, "KEY_WWAN"),
    (247, "KEY_RFKILL"),
    (248, "KEY_MICMUTE"),
    (0x200, "KEY_NUMERIC_0"),
    (0x201, "KEY_NUMERIC_1"),
    (0x202, "KEY_NUMERIC_2"),
    (0x203, "KEY_NUMERIC_3"),
    (0x204, "KEY_NUMERIC_4"),
    (0x205, "KEY_NUMERIC_5"),
    (0x206, "KEY_NUMERIC_6"),
    (0x207, "KEY_NUMERIC_7"),
    (0x208, "KEY_NUMERIC_8"),
    (0x209, "KEY_NUMERIC_9"),
    (0x20a, "KEY_NUMERIC_STAR"),
    (0x20b, "KEY_NUMERIC_POUND"),
    (0x250, "KEY_BRIGHTNESS_MIN"),
    (0x251, "KEY_BRIGHTNESS_MAX"),
];

const SW_NAMES: &[(u16, &str)] = &[
    (0x00, "SW_LID"),
    (0x01, "SW_TABLET_MODE"),
    (0x02, "SW_HEADPHONE_INSERT"),
    (0x03, "SW_RFKILL_ALL"),
    (0x04, "SW_MICROPHONE_INSERT"),
    (0x05, "SW_DOCK"),
    (0x06, "SW_LINEOUT_INSERT"),
    (0x07, "SW_JACK_PHYSICAL_INSERT"),
    (0x08, "SW_VIDEOOUT_INSERT"),
    (0x09, "SW_CAMERA_LENS_COVER"),
    (0x0a, "SW_KEYPAD_SLIDE"),
    (0x0b, "SW_FRONT_PROXIMITY"),
    (0x0c, "SW_ROTATE_LOCK"),
    (0x0d, "SW_LINEIN_INSERT"),
    (0x0e, "SW_MUTE_DEVICE"),
    (0x0f, "SW_PEN_INSERTED"),
    (0x10, "SW_MACHINE_COVER"),
];

const LED_NAMES: &[(u16, &str)] = &[
    (0x00, "LED_NUML"),
    (0x01, "LED_CAPSL"),
    (0x02, "LED_SCROLLL"),
    (0x03, "LED_COMPOSE"),
    (0x04, "LED_KANA"),
    (0x05, "LED_SLEEP"),
    (0x06, "LED_SUSPEND"),
    (0x07, "LED_MUTE"),
    (0x08, "LED_MISC"),
    (0x09, "LED_MAIL"),
    (0x0a, "LED_CHARGING"),
];

const SND_NAMES: &[(u16, &str)] = &[(0x00, "SND_CLICK"), (0x01, "SND_BELL"), (0x02, "SND_TONE")];

const REP_NAMES: &[(u16, &str)] = &[(0x00, "REP_DELAY"), (0x01, "REP_PERIOD")];

const FF_STATUS_NAMES: &[(u16, &str)] = &[(0x00, "FF_STATUS_STOPPED"), (0x01, "FF_STATUS_PLAYING")];

// EV_REL, EV_ABS and EV_MSC stay unnamed: capture only reports keys, switches and the like.
const CODE_NAMES: &[(u16, &[(u16, &str)])] = &[
    (EV_SYN, SYN_NAMES),
    (EV_KEY, KEY_NAMES),
    (EV_SW, SW_NAMES),
    (EV_LED, LED_NAMES),
    (EV_SND, SND_NAMES),
    (EV_REP, REP_NAMES),
    (EV_FF_STATUS, FF_STATUS_NAMES),
];

/// Immutable name tables, indexed by event type and then by event code.
pub struct NameRegistry {
    types: [Option<&'static str>; EV_CNT],
    codes: [Option<Box<[Option<&'static str>]>>; EV_CNT],
}

impl NameRegistry {
    fn new() -> Self {
        let mut types = [None; EV_CNT];
        for &(ty, name) in TYPE_NAMES {
            types[usize::from(ty)] = Some(name);
        }

        let mut codes: [Option<Box<[Option<&'static str>]>>; EV_CNT] =
            std::array::from_fn(|_| None);
        for &(ty, names) in CODE_NAMES {
            let Some(max) = event_codes::max_code(u32::from(ty)) else {
                continue;
            };

            let mut table = vec![None; usize::from(max) + 1];
            for &(code, name) in names {
                if let Some(slot) = table.get_mut(usize::from(code)) {
                    *slot = Some(name);
                }
            }

            codes[usize::from(ty)] = Some(table.into_boxed_slice());
        }

        Self { types, codes }
    }

    /// The name of event type `ty`, or [`UNKNOWN`].
    pub fn type_name(&self, ty: u32) -> &'static str {
        usize::try_from(ty)
            .ok()
            .and_then(|ty| self.types.get(ty).copied().flatten())
            .unwrap_or(UNKNOWN)
    }

    /// The name of `code` within event type `ty`, or [`UNKNOWN`].
    pub fn code_name(&self, ty: u32, code: u32) -> &'static str {
        self.lookup(ty, code).unwrap_or(UNKNOWN)
    }

    fn lookup(&self, ty: u32, code: u32) -> Option<&'static str> {
        let max = event_codes::max_code(ty)?;
        if code > u32::from(max) {
            return None;
        }

        let table = self.codes.get(usize::try_from(ty).ok()?)?.as_ref()?;
        table.get(usize::try_from(code).ok()?).copied().flatten()
    }

    /// Resolve `text` to a code of event type `ty`.
    ///
    /// `text` is either a numeral (decimal, `0x` hex or `0` octal) or a registered name such as
    /// `KEY_A`. Numerals are not range checked here.
    pub fn resolve_code(&self, ty: u16, text: &str) -> KbstatsResult<u32> {
        if text.starts_with(|c: char| c.is_ascii_digit()) {
            return parse_numeral(text).ok_or_else(|| KbstatsError::UnknownCode(text.to_string()));
        }

        self.codes
            .get(usize::from(ty))
            .and_then(Option::as_ref)
            .and_then(|table| table.iter().position(|name| *name == Some(text)))
            .and_then(|code| u32::try_from(code).ok())
            .ok_or_else(|| KbstatsError::UnknownCode(text.to_string()))
    }
}

/// The process-wide registry.
pub fn registry() -> &'static NameRegistry {
    &REGISTRY
}

pub fn type_name(ty: u32) -> &'static str {
    registry().type_name(ty)
}

pub fn code_name(ty: u32, code: u32) -> &'static str {
    registry().code_name(ty, code)
}

pub fn resolve_code(ty: u16, text: &str) -> KbstatsResult<u32> {
    registry().resolve_code(ty, text)
}

/// Parse an unsigned numeral the way `strtoul(s, NULL, 0)` picks its base.
fn parse_numeral(text: &str) -> Option<u32> {
    let hex = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"));

    let (digits, radix) = if let Some(hex) = hex {
        (hex, 16)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };

    // `from_str_radix` would accept a leading sign
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    u32::from_str_radix(digits, radix).ok()
}
