//! Static table of configuration items.
//!
//! The order of [`ITEMS`] is the canonical order: documents are encoded and decoded in it,
//! and records are compared in it.

use super::fields::Field;
use crate::config::{
    Hostname, Password, SleepText, Ssid, UbxFileName, STAT_SCREENS_TIME_MAX,
    STAT_SCREENS_TIME_MIN,
};

/// Generation of the attached u-blox receiver, as detected by the GPS driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GpsHardware {
    #[default]
    Unknown,
    M8,
    M9,
    M10,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Gps,
    Screen,
    FwUpdate,
    Network,
    TopLevel,
}

/// Primitive type of an item, and the constraint its values are validated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kind {
    Bool,
    /// `min..=max`. Most items are bounded only by the width of their record field.
    UInt { min: u32, max: u32 },
    Float { min: f32, max: f32 },
    /// `capacity` usable bytes; longer text is truncated.
    Str { capacity: usize },
    /// One of the item's declared [`Choice`]s.
    Enum,
    /// Any combination of the item's declared [`Toggle`] bits.
    Bitmask,
}

impl Kind {
    /// Type tag used by the introspection protocol.
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::UInt { .. } | Self::Enum | Self::Bitmask => "int",
            Self::Float { .. } => "float",
            Self::Str { .. } => "str",
        }
    }
}

/// How the "next value" UI control moves through an item's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// Not exposed as a cycling control.
    Fixed,
    /// Through the declared choices, in declaration order.
    Choices,
    /// `min..=max`, wrapping to `min`. Values outside the range move to `min`.
    Step { min: u32, max: u32 },
    /// Boolean flip.
    Flip,
    /// Flip one declared bit.
    Bits,
}

/// A legal value of an enumerated item, with its UI title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: i32,
    pub title: &'static str,
    /// Oldest receiver generation that supports this value.
    pub min_hw: GpsHardware,
}

impl Choice {
    const fn new(value: i32, title: &'static str) -> Self {
        Self {
            value,
            title,
            min_hw: GpsHardware::Unknown,
        }
    }

    const fn from_hw(self, hw: GpsHardware) -> Self {
        Self { min_hw: hw, ..self }
    }

    pub fn available(&self, hw: GpsHardware) -> bool {
        self.min_hw <= hw
    }
}

/// One independently switchable bit of a bitmask item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub pos: u8,
    pub title: &'static str,
}

impl Toggle {
    const fn new(pos: u8, title: &'static str) -> Self {
        Self { pos, title }
    }

    pub const fn mask(&self) -> u32 {
        1 << self.pos
    }
}

/// One configuration item.
#[derive(Debug, Clone, Copy)]
pub struct ItemDef {
    /// Canonical name, the key written to documents.
    pub name: &'static str,
    /// Older names still accepted on input, tried in this order.
    pub aliases: &'static [&'static str],
    pub group: Group,
    pub field: Field,
    pub kind: Kind,
    pub info: &'static str,
    /// Display unit suffix.
    pub ext: Option<&'static str>,
    pub choices: &'static [Choice],
    pub toggles: &'static [Toggle],
    pub cycle: Cycle,
    /// Only shown to the UI when exactly this receiver is attached.
    pub only_on: Option<GpsHardware>,
}

impl ItemDef {
    const fn new(name: &'static str, group: Group, field: Field, kind: Kind, info: &'static str) -> Self {
        Self {
            name,
            aliases: &[],
            group,
            field,
            kind,
            info,
            ext: None,
            choices: &[],
            toggles: &[],
            cycle: match kind {
                Kind::Bool => Cycle::Flip,
                Kind::Bitmask => Cycle::Bits,
                _ => Cycle::Fixed,
            },
            only_on: None,
        }
    }

    const fn aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    const fn ext(self, ext: &'static str) -> Self {
        Self {
            ext: Some(ext),
            ..self
        }
    }

    const fn choices(self, choices: &'static [Choice]) -> Self {
        Self {
            choices,
            cycle: Cycle::Choices,
            ..self
        }
    }

    /// Choices shown in the UI picker that do not restrict the value.
    const fn suggestions(self, choices: &'static [Choice]) -> Self {
        Self { choices, ..self }
    }

    const fn toggles(self, toggles: &'static [Toggle]) -> Self {
        Self { toggles, ..self }
    }

    const fn cycle(self, cycle: Cycle) -> Self {
        Self { cycle, ..self }
    }

    const fn only_on(self, hw: GpsHardware) -> Self {
        Self {
            only_on: Some(hw),
            ..self
        }
    }

    /// Canonical name followed by the aliases.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }

    pub fn visible(&self, hw: GpsHardware) -> bool {
        self.only_on.is_none_or(|only| only == hw)
    }

    pub fn choice(&self, value: i64) -> Option<&'static Choice> {
        self.choices
            .iter()
            .find(|choice| i64::from(choice.value) == value)
    }

    /// Union of all declared toggle bits.
    pub fn toggle_mask(&self) -> u32 {
        self.toggles.iter().fold(0, |mask, toggle| mask | toggle.mask())
    }
}

/// GNSS constellation sets, as UBX gnssId bitmasks, in cycling order.
///
/// GPS, SBAS and QZSS are always on; Galileo, BeiDou and GLONASS are combined.
pub const GNSS_CHOICES: &[Choice] = &[
    Choice::new(111, "G + E + B + R"),
    Choice::new(107, "G + B + R"),
    Choice::new(103, "G + E + R"),
    Choice::new(47, "G + E + B"),
    Choice::new(99, "G + R"),
    Choice::new(43, "G + B"),
    Choice::new(39, "G + E"),
];

/// UBX gnssId bits and their one-letter names, as shown in [`GNSS_CHOICES`].
pub const GNSS_LETTERS: &[(u8, &str)] = &[(0, "G"), (2, "E"), (3, "B"), (6, "R")];

const SAMPLE_RATES: &[Choice] = &[
    Choice::new(1, "1Hz"),
    Choice::new(5, "5Hz"),
    Choice::new(10, "10Hz"),
    Choice::new(20, "20Hz").from_hw(GpsHardware::M9),
];

const SPEED_UNITS: &[Choice] = &[
    Choice::new(0, "m/s"),
    Choice::new(1, "km/h"),
    Choice::new(2, "knots"),
];

const DYNAMIC_MODELS: &[Choice] = &[
    Choice::new(0, "Portable"),
    Choice::new(1, "Sea"),
    Choice::new(2, "Automotive"),
];

const SPEED_FIELDS: &[Choice] = &[
    Choice::new(1, "Auto display"),
    Choice::new(2, "Run"),
    Choice::new(3, "Alfa"),
    Choice::new(4, "NM"),
    Choice::new(5, "Total distance"),
    Choice::new(6, "2s / 10s"),
    Choice::new(7, "Alfa 500m"),
    Choice::new(8, "1h"),
    Choice::new(9, "Auto switch alfa / 500m"),
];

const LARGE_FONT: &[Choice] = &[
    Choice::new(0, "Large_Font OFF"),
    Choice::new(1, "Large_Font ON"),
];

const SLEEP_OFF_SCREEN: &[Choice] = &[
    Choice::new(0, "Off screen 0, sleep screen 0"),
    Choice::new(1, "Off screen 0, sleep screen 1"),
    Choice::new(10, "Off screen 1, sleep screen 0"),
    Choice::new(11, "Off screen 1, sleep screen 1"),
];

const ROTATIONS: &[Choice] = &[
    Choice::new(0, "0°"),
    Choice::new(1, "90°"),
    Choice::new(2, "180°"),
    Choice::new(3, "270°"),
];

const FILE_NAMING: &[Choice] = &[
    Choice::new(1, "name_date_time"),
    Choice::new(0, "name_MAC_index"),
    Choice::new(2, "date_time_name"),
];

const UPDATE_CHANNELS: &[Choice] = &[Choice::new(0, "stable"), Choice::new(1, "unstable")];

const UBLOX_TYPES: &[Choice] = &[
    Choice::new(1, "M8 9600Bd"),
    Choice::new(3, "M8 38400Bd"),
    Choice::new(5, "M9 9600Bd"),
    Choice::new(6, "M9 38400Bd"),
    Choice::new(2, "M10 9600Bd"),
    Choice::new(4, "M10 38400Bd"),
    Choice::new(0, "Autoselect"),
];

const TIMEZONES: &[Choice] = &[
    Choice::new(-12, "GMT-12"),
    Choice::new(-11, "GMT-11"),
    Choice::new(-10, "GMT-10"),
    Choice::new(-9, "GMT-9"),
    Choice::new(-8, "GMT-8"),
    Choice::new(-7, "GMT-7"),
    Choice::new(-6, "GMT-6"),
    Choice::new(-5, "GMT-5"),
    Choice::new(-4, "GMT-4"),
    Choice::new(-3, "GMT-3"),
    Choice::new(-2, "GMT-2"),
    Choice::new(-1, "GMT-1"),
    Choice::new(0, "GMT"),
    Choice::new(1, "GMT+1"),
    Choice::new(2, "GMT+2"),
    Choice::new(3, "GMT+3"),
    Choice::new(4, "GMT+4"),
    Choice::new(5, "GMT+5"),
    Choice::new(6, "GMT+6"),
    Choice::new(7, "GMT+7"),
    Choice::new(8, "GMT+8"),
    Choice::new(9, "GMT+9"),
    Choice::new(10, "GMT+10"),
    Choice::new(11, "GMT+11"),
    Choice::new(12, "GMT+12"),
    Choice::new(13, "GMT+13"),
];

const STAT_SCREENS: &[Toggle] = &[
    Toggle::new(0, "Speed 2s / 10s"),
    Toggle::new(1, "Alfa 500m"),
    Toggle::new(2, "NM / 1h"),
    Toggle::new(3, "Distance / runs"),
    Toggle::new(4, "Alfa 250m"),
    Toggle::new(5, "Average 5x10s"),
    Toggle::new(6, "Time / battery"),
    Toggle::new(7, "Speed graph"),
];

const GPIO12_SCREENS: &[Toggle] = &[
    Toggle::new(0, "Speed 2s / 10s"),
    Toggle::new(1, "Alfa 500m"),
    Toggle::new(2, "NM / 1h"),
    Toggle::new(3, "s10 runs"),
    Toggle::new(4, "Alfa's"),
];

const LOGO_MAX: u32 = 20;

const BYTE: Kind = Kind::UInt { min: 0, max: u8::MAX as u32 };
const WORD: Kind = Kind::UInt { min: 0, max: u16::MAX as u32 };

const LOGO_STEP: Cycle = Cycle::Step { min: 1, max: LOGO_MAX };

const fn str_kind(capacity: usize) -> Kind {
    Kind::Str { capacity }
}

const fn ssid(slot: usize, name: &'static str) -> ItemDef {
    ItemDef::new(
        name,
        Group::Network,
        Field::Ssid(slot),
        str_kind(Ssid::CAPACITY),
        "ssid: the name of the wlan where the esp-logger should connect to",
    )
}

const fn password(slot: usize, name: &'static str) -> ItemDef {
    ItemDef::new(
        name,
        Group::Network,
        Field::Password(slot),
        str_kind(Password::CAPACITY),
        "password: the password of the wlan where the esp-logger should connect to",
    )
}

/// All configuration items, in canonical order.
pub static ITEMS: &[ItemDef] = &[
    ItemDef::new("speed_unit", Group::Gps, Field::SpeedUnit, Kind::Enum, "m/s, km/h or knots")
        .choices(SPEED_UNITS),
    ItemDef::new("sample_rate", Group::Gps, Field::SampleRate, Kind::Enum, "gps_rate in Hz")
        .choices(SAMPLE_RATES)
        .ext("Hz"),
    ItemDef::new(
        "gnss",
        Group::Gps,
        Field::Gnss,
        Kind::Enum,
        "gnss choice: G = GPS, E = GALILEO, B = BEIDOU, R = GLONASS. M8 modules with ROM 2.01 can't activate Galileo, M9 and M10 can do 4 GNSS simultaneously",
    )
    .choices(GNSS_CHOICES),
    ItemDef::new(
        "speed_field",
        Group::Screen,
        Field::SpeedField,
        Kind::Enum,
        "choice for first field in speed screen",
    )
    .choices(SPEED_FIELDS),
    ItemDef::new(
        "speed_large_font",
        Group::Screen,
        Field::SpeedLargeFont,
        Kind::Enum,
        "fonts on the first line are bigger, actual speed font is smaller",
    )
    .choices(LARGE_FONT),
    ItemDef::new(
        "bar_length",
        Group::Screen,
        Field::BarLength,
        WORD,
        "bar_length: Default length = 1852 m for 100% bar (=Nautical mile)",
    )
    .ext("m"),
    ItemDef::new(
        "stat_screens",
        Group::Screen,
        Field::StatScreens,
        Kind::Bitmask,
        "stat_screens choice: every enabled stat screen is shown after each other",
    )
    .aliases(&["Stat_screens"])
    .toggles(STAT_SCREENS),
    ItemDef::new(
        "stat_screens_time",
        Group::Screen,
        Field::StatScreensTime,
        BYTE,
        "The time between toggle the different stat screens",
    )
    .aliases(&["Stat_screens_time"])
    .ext("s")
    .cycle(Cycle::Step {
        min: STAT_SCREENS_TIME_MIN as u32,
        max: STAT_SCREENS_TIME_MAX as u32,
    }),
    ItemDef::new(
        "stat_speed",
        Group::Screen,
        Field::StatSpeed,
        BYTE,
        "max speed in m/s for showing Stat screens",
    )
    .ext("m/s"),
    ItemDef::new(
        "archive_days",
        Group::TopLevel,
        Field::ArchiveDays,
        WORD,
        "how many days files will be moved to the 'Archive' dir",
    )
    .ext("d"),
    ItemDef::new(
        "gpio12_screens",
        Group::Screen,
        Field::Gpio12Screens,
        Kind::Bitmask,
        "gpio12_screens choice: every enabled screen is shown after each push",
    )
    .aliases(&["GPIO12_screens"])
    .toggles(GPIO12_SCREENS),
    ItemDef::new(
        "board_logo",
        Group::Screen,
        Field::BoardLogo,
        BYTE,
        "board_logo: from 1 - 20, bigger than 10 are single logos",
    )
    .aliases(&["board_Logo", "Board_Logo"])
    .cycle(LOGO_STEP),
    ItemDef::new(
        "sail_logo",
        Group::Screen,
        Field::SailLogo,
        BYTE,
        "sail_logo: from 1 - 20, bigger than 10 are single logos",
    )
    .aliases(&["sail_Logo", "Sail_Logo"])
    .cycle(LOGO_STEP),
    ItemDef::new(
        "sleep_off_screen",
        Group::Screen,
        Field::SleepOffScreen,
        Kind::Enum,
        "Choice for switch_off (first digit 0 or 1) and sleep_screen (second digit 0 or 1)",
    )
    .choices(SLEEP_OFF_SCREEN),
    ItemDef::new(
        "screen_rotation",
        Group::Screen,
        Field::ScreenRotation,
        Kind::Enum,
        "screen rotation in quarter turns",
    )
    .choices(ROTATIONS),
    #[cfg(not(feature = "screen-brightness"))]
    ItemDef::new(
        "screen_move_offset",
        Group::Screen,
        Field::ScreenMoveOffset,
        Kind::Bool,
        "shift the screen content on every refresh to prevent burn-in",
    ),
    #[cfg(feature = "screen-brightness")]
    ItemDef::new(
        "screen_brightness",
        Group::Screen,
        Field::ScreenBrightness,
        Kind::UInt { min: 0, max: 100 },
        "backlight brightness",
    )
    .ext("%"),
    ItemDef::new(
        "no_auto_refresh",
        Group::Screen,
        Field::NoAutoRefresh,
        Kind::Bool,
        "suppress the periodic full screen refresh",
    ),
    ItemDef::new("log_txt", Group::Gps, Field::LogTxt, Kind::Bool, "log to .txt").aliases(&["logTXT"]),
    ItemDef::new("log_ubx", Group::Gps, Field::LogUbx, Kind::Bool, "log to .ubx").aliases(&["logUBX"]),
    ItemDef::new(
        "log_ubx_nav_sat",
        Group::Gps,
        Field::LogUbxNavSat,
        Kind::Bool,
        "log nav sat msg to .ubx",
    )
    .aliases(&["logUBX_nav_sat"]),
    ItemDef::new("log_sbp", Group::Gps, Field::LogSbp, Kind::Bool, "log to .sbp").aliases(&["logSBP"]),
    ItemDef::new("log_gpy", Group::Gps, Field::LogGpy, Kind::Bool, "log to .gpy").aliases(&["logGPY"]),
    ItemDef::new("log_gpx", Group::Gps, Field::LogGpx, Kind::Bool, "log to .gpx").aliases(&["logGPX"]),
    ItemDef::new(
        "file_date_time",
        Group::TopLevel,
        Field::FileDateTime,
        Kind::Enum,
        "type of filenaming, with MAC adress or datetime",
    )
    .choices(FILE_NAMING),
    ItemDef::new(
        "dynamic_model",
        Group::Gps,
        Field::DynamicModel,
        Kind::Enum,
        "choice for dynamic model 'Sea', if 0 model 'Portable' is used",
    )
    .choices(DYNAMIC_MODELS)
    .only_on(GpsHardware::M8),
    ItemDef::new(
        "timezone",
        Group::TopLevel,
        Field::Timezone,
        Kind::Float {
            min: -12.0,
            max: 14.0,
        },
        "timezone: The local time difference in hours with UTC (can be fractional/negative!)",
    )
    .suggestions(TIMEZONES)
    .ext("h"),
    ItemDef::new(
        "ubx_file",
        Group::TopLevel,
        Field::UbxFile,
        str_kind(UbxFileName::CAPACITY),
        "your preferred filename",
    )
    .aliases(&["UBXfile"]),
    ItemDef::new(
        "sleep_info",
        Group::TopLevel,
        Field::SleepInfo,
        str_kind(SleepText::CAPACITY),
        "your preferred sleep text",
    )
    .aliases(&["Sleep_info"]),
    ItemDef::new(
        "update_enabled",
        Group::FwUpdate,
        Field::UpdateEnabled,
        Kind::Bool,
        "check for firmware updates when connected",
    ),
    ItemDef::new(
        "update_channel",
        Group::FwUpdate,
        Field::UpdateChannel,
        Kind::Enum,
        "firmware update channel",
    )
    .choices(UPDATE_CHANNELS),
    ssid(0, "ssid"),
    password(0, "password"),
    ssid(1, "ssid1"),
    password(1, "password1"),
    ssid(2, "ssid2"),
    password(2, "password2"),
    ssid(3, "ssid3"),
    password(3, "password3"),
    ItemDef::new(
        "hostname",
        Group::Network,
        Field::Hostname,
        str_kind(Hostname::CAPACITY),
        "hostname of the logger on the wlan",
    ),
    ItemDef::new("ublox_type", Group::Gps, Field::UbloxType, Kind::Enum, "ublox_type")
        .choices(UBLOX_TYPES)
        .cycle(Cycle::Fixed),
];
