//! Typed access to the record slot behind each item.

use super::schema::{ItemDef, Kind, GNSS_LETTERS};
use crate::config::{truncate_to_capacity, ConfigRecord, FixedStr};
use serde_json::{Number, Value};
use thiserror::Error;

/// Storage location of an item inside a [`ConfigRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    SpeedUnit,
    SampleRate,
    Gnss,
    SpeedField,
    SpeedLargeFont,
    BarLength,
    StatScreens,
    StatScreensTime,
    StatSpeed,
    ArchiveDays,
    Gpio12Screens,
    BoardLogo,
    SailLogo,
    SleepOffScreen,
    ScreenRotation,
    #[cfg(not(feature = "screen-brightness"))]
    ScreenMoveOffset,
    #[cfg(feature = "screen-brightness")]
    ScreenBrightness,
    NoAutoRefresh,
    LogTxt,
    LogUbx,
    LogUbxNavSat,
    LogSbp,
    LogGpy,
    LogGpx,
    FileDateTime,
    DynamicModel,
    Timezone,
    UbxFile,
    SleepInfo,
    UpdateEnabled,
    UpdateChannel,
    /// Wi-Fi station slot.
    Ssid(usize),
    Password(usize),
    Hostname,
    UbloxType,
}

/// A field value, independent of its storage width.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f32),
    Str(String),
}

impl Scalar {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(value) => Value::Bool(*value),
            Self::Int(value) => Value::from(*value),
            Self::Float(value) => float_to_json(*value),
            Self::Str(value) => Value::String(value.clone()),
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }
}

/// Emit the shortest decimal text that reads back as the same `f32`.
///
/// Widening with `f64::from` would write `0.1f32` as `0.10000000149011612`.
fn float_to_json(value: f32) -> Value {
    value
        .to_string()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

/// Why a document value was refused for an item.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("expected {0}")]
    WrongType(&'static str),
    #[error("{0} is out of range")]
    OutOfRange(String),
    #[error("{0} is not an allowed value")]
    NotAChoice(i64),
    #[error("bits {0:#x} are not defined")]
    UndefinedBits(u32),
    #[error("not a finite number")]
    NotFinite,
}

/// Read the current value of `field`.
pub fn read(record: &ConfigRecord, field: Field) -> Scalar {
    let gps = &record.gps;
    let screen = &record.screen;

    match field {
        Field::SpeedUnit => Scalar::Int(gps.speed_unit.into()),
        Field::SampleRate => Scalar::Int(gps.sample_rate.into()),
        Field::Gnss => Scalar::Int(gps.gnss.into()),
        Field::SpeedField => Scalar::Int(screen.speed_field.into()),
        Field::SpeedLargeFont => Scalar::Int(screen.speed_large_font.into()),
        Field::BarLength => Scalar::Int(screen.bar_length.into()),
        Field::StatScreens => Scalar::Int(screen.stat_screens.into()),
        Field::StatScreensTime => Scalar::Int(screen.stat_screens_time.into()),
        Field::StatSpeed => Scalar::Int(screen.stat_speed.into()),
        Field::ArchiveDays => Scalar::Int(record.archive_days.into()),
        Field::Gpio12Screens => Scalar::Int(screen.gpio12_screens.into()),
        Field::BoardLogo => Scalar::Int(screen.board_logo.into()),
        Field::SailLogo => Scalar::Int(screen.sail_logo.into()),
        Field::SleepOffScreen => Scalar::Int(screen.sleep_off_screen.into()),
        Field::ScreenRotation => Scalar::Int(screen.rotation.into()),
        #[cfg(not(feature = "screen-brightness"))]
        Field::ScreenMoveOffset => Scalar::Bool(screen.move_offset),
        #[cfg(feature = "screen-brightness")]
        Field::ScreenBrightness => Scalar::Int(screen.brightness.into()),
        Field::NoAutoRefresh => Scalar::Bool(screen.no_auto_refresh),
        Field::LogTxt => Scalar::Bool(gps.log_txt),
        Field::LogUbx => Scalar::Bool(gps.log_ubx),
        Field::LogUbxNavSat => Scalar::Bool(gps.log_ubx_nav_sat),
        Field::LogSbp => Scalar::Bool(gps.log_sbp),
        Field::LogGpy => Scalar::Bool(gps.log_gpy),
        Field::LogGpx => Scalar::Bool(gps.log_gpx),
        Field::FileDateTime => Scalar::Int(record.file_date_time.into()),
        Field::DynamicModel => Scalar::Int(gps.dynamic_model.into()),
        Field::Timezone => Scalar::Float(record.timezone),
        Field::UbxFile => Scalar::Str(record.ubx_file.to_string()),
        Field::SleepInfo => Scalar::Str(record.sleep_info.to_string()),
        Field::UpdateEnabled => Scalar::Bool(record.fw_update.enabled),
        Field::UpdateChannel => Scalar::Int(record.fw_update.channel.into()),
        Field::Ssid(slot) => Scalar::Str(
            record
                .network
                .stations
                .get(slot)
                .map(|station| station.ssid.to_string())
                .unwrap_or_default(),
        ),
        Field::Password(slot) => Scalar::Str(
            record
                .network
                .stations
                .get(slot)
                .map(|station| station.password.to_string())
                .unwrap_or_default(),
        ),
        Field::Hostname => Scalar::Str(record.network.hostname.to_string()),
        Field::UbloxType => Scalar::Int(gps.ublox_type.into()),
    }
}

/// Validate `value` against `item` and convert it to the item's scalar type.
///
/// Text longer than the item capacity is truncated, never refused.
pub fn coerce(item: &ItemDef, value: &Value) -> Result<Scalar, FieldError> {
    match item.kind {
        Kind::Bool => match value {
            Value::Bool(flag) => Ok(Scalar::Bool(*flag)),
            // older firmware wrote flags as 0 / 1
            Value::Number(_) => match integer(value)? {
                0 => Ok(Scalar::Bool(false)),
                1 => Ok(Scalar::Bool(true)),
                other => Err(FieldError::OutOfRange(other.to_string())),
            },
            _ => Err(FieldError::WrongType("a boolean")),
        },
        Kind::UInt { min, max } => {
            let number = integer(value)?;

            if number < i64::from(min) || number > i64::from(max) {
                return Err(FieldError::OutOfRange(number.to_string()));
            }

            Ok(Scalar::Int(number))
        }
        Kind::Enum => {
            let mut number = integer(value)?;

            if item.field == Field::UbloxType {
                number = number.max(0);
            }

            if item.choice(number).is_none() {
                return Err(FieldError::NotAChoice(number));
            }

            Ok(Scalar::Int(number))
        }
        Kind::Bitmask => {
            let number = integer(value)?;
            let bits =
                u32::try_from(number).map_err(|_| FieldError::OutOfRange(number.to_string()))?;
            let undefined = bits & !item.toggle_mask();

            if undefined != 0 {
                return Err(FieldError::UndefinedBits(undefined));
            }

            Ok(Scalar::Int(number))
        }
        Kind::Float { min, max } => {
            let number = value.as_f64().ok_or(FieldError::WrongType("a number"))?;
            #[allow(clippy::cast_possible_truncation)]
            let number = number as f32;

            if !number.is_finite() {
                return Err(FieldError::NotFinite);
            }

            if number < min || number > max {
                return Err(FieldError::OutOfRange(number.to_string()));
            }

            Ok(Scalar::Float(number))
        }
        Kind::Str { capacity } => match value {
            Value::String(text) => Ok(Scalar::Str(truncate_to_capacity(text, capacity).to_owned())),
            _ => Err(FieldError::WrongType("a string")),
        },
    }
}

fn integer(value: &Value) -> Result<i64, FieldError> {
    let Value::Number(number) = value else {
        return Err(FieldError::WrongType("an integer"));
    };

    if let Some(int) = number.as_i64() {
        return Ok(int);
    }

    // whole floats such as `5.0`, but nothing fractional
    match number.as_f64() {
        #[allow(clippy::cast_possible_truncation)]
        Some(float) if float.fract() == 0.0 && float.abs() < 9.0e15 => Ok(float as i64),
        Some(float) => Err(FieldError::OutOfRange(float.to_string())),
        None => Err(FieldError::WrongType("an integer")),
    }
}

/// Store an already validated value in the slot of `field`.
///
/// Returns whether the stored value changed. With `force` the value is written and
/// reported as changed even when it is equal to the stored one.
pub fn apply(
    record: &mut ConfigRecord,
    field: Field,
    value: &Scalar,
    force: bool,
) -> Result<bool, FieldError> {
    let gps = &mut record.gps;
    let screen = &mut record.screen;

    match (field, value) {
        (Field::SpeedUnit, Scalar::Int(v)) => narrow(&mut gps.speed_unit, *v, force),
        (Field::SampleRate, Scalar::Int(v)) => narrow(&mut gps.sample_rate, *v, force),
        (Field::Gnss, Scalar::Int(v)) => narrow(&mut gps.gnss, *v, force),
        (Field::SpeedField, Scalar::Int(v)) => narrow(&mut screen.speed_field, *v, force),
        (Field::SpeedLargeFont, Scalar::Int(v)) => narrow(&mut screen.speed_large_font, *v, force),
        (Field::BarLength, Scalar::Int(v)) => narrow(&mut screen.bar_length, *v, force),
        (Field::StatScreens, Scalar::Int(v)) => narrow(&mut screen.stat_screens, *v, force),
        (Field::StatScreensTime, Scalar::Int(v)) => {
            narrow(&mut screen.stat_screens_time, *v, force)
        }
        (Field::StatSpeed, Scalar::Int(v)) => narrow(&mut screen.stat_speed, *v, force),
        (Field::ArchiveDays, Scalar::Int(v)) => narrow(&mut record.archive_days, *v, force),
        (Field::Gpio12Screens, Scalar::Int(v)) => narrow(&mut screen.gpio12_screens, *v, force),
        (Field::BoardLogo, Scalar::Int(v)) => narrow(&mut screen.board_logo, *v, force),
        (Field::SailLogo, Scalar::Int(v)) => narrow(&mut screen.sail_logo, *v, force),
        (Field::SleepOffScreen, Scalar::Int(v)) => narrow(&mut screen.sleep_off_screen, *v, force),
        (Field::ScreenRotation, Scalar::Int(v)) => narrow(&mut screen.rotation, *v, force),
        #[cfg(not(feature = "screen-brightness"))]
        (Field::ScreenMoveOffset, Scalar::Bool(v)) => Ok(replace(&mut screen.move_offset, *v, force)),
        #[cfg(feature = "screen-brightness")]
        (Field::ScreenBrightness, Scalar::Int(v)) => narrow(&mut screen.brightness, *v, force),
        (Field::NoAutoRefresh, Scalar::Bool(v)) => {
            Ok(replace(&mut screen.no_auto_refresh, *v, force))
        }
        (Field::LogTxt, Scalar::Bool(v)) => Ok(replace(&mut gps.log_txt, *v, force)),
        (Field::LogUbx, Scalar::Bool(v)) => Ok(replace(&mut gps.log_ubx, *v, force)),
        (Field::LogUbxNavSat, Scalar::Bool(v)) => Ok(replace(&mut gps.log_ubx_nav_sat, *v, force)),
        (Field::LogSbp, Scalar::Bool(v)) => Ok(replace(&mut gps.log_sbp, *v, force)),
        (Field::LogGpy, Scalar::Bool(v)) => Ok(replace(&mut gps.log_gpy, *v, force)),
        (Field::LogGpx, Scalar::Bool(v)) => Ok(replace(&mut gps.log_gpx, *v, force)),
        (Field::FileDateTime, Scalar::Int(v)) => narrow(&mut record.file_date_time, *v, force),
        (Field::DynamicModel, Scalar::Int(v)) => narrow(&mut gps.dynamic_model, *v, force),
        (Field::Timezone, Scalar::Float(v)) => Ok(replace(&mut record.timezone, *v, force)),
        (Field::UbxFile, Scalar::Str(v)) => Ok(assign(&mut record.ubx_file, v, force)),
        (Field::SleepInfo, Scalar::Str(v)) => Ok(assign(&mut record.sleep_info, v, force)),
        (Field::UpdateEnabled, Scalar::Bool(v)) => {
            Ok(replace(&mut record.fw_update.enabled, *v, force))
        }
        (Field::UpdateChannel, Scalar::Int(v)) => {
            narrow(&mut record.fw_update.channel, *v, force)
        }
        (Field::Ssid(slot), Scalar::Str(v)) => {
            let station = record
                .network
                .stations
                .get_mut(slot)
                .ok_or_else(|| FieldError::OutOfRange(format!("station {slot}")))?;
            Ok(assign(&mut station.ssid, v, force))
        }
        (Field::Password(slot), Scalar::Str(v)) => {
            let station = record
                .network
                .stations
                .get_mut(slot)
                .ok_or_else(|| FieldError::OutOfRange(format!("station {slot}")))?;
            Ok(assign(&mut station.password, v, force))
        }
        (Field::Hostname, Scalar::Str(v)) => Ok(assign(&mut record.network.hostname, v, force)),
        (Field::UbloxType, Scalar::Int(v)) => narrow(&mut gps.ublox_type, *v, force),
        (_, Scalar::Bool(_)) => Err(FieldError::WrongType("a boolean field")),
        (_, Scalar::Int(_)) => Err(FieldError::WrongType("an integer field")),
        (_, Scalar::Float(_)) => Err(FieldError::WrongType("a float field")),
        (_, Scalar::Str(_)) => Err(FieldError::WrongType("a string field")),
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T, force: bool) -> bool {
    if !force && *slot == value {
        return false;
    }

    *slot = value;
    true
}

fn narrow<T: TryFrom<i64> + PartialEq>(slot: &mut T, value: i64, force: bool) -> Result<bool, FieldError> {
    let value = T::try_from(value).map_err(|_| FieldError::OutOfRange(value.to_string()))?;
    Ok(replace(slot, value, force))
}

fn assign<const N: usize>(slot: &mut FixedStr<N>, value: &str, force: bool) -> bool {
    slot.assign(value) || force
}

/// Current value of `item` together with a human readable rendering of it.
pub fn describe(record: &ConfigRecord, item: &ItemDef) -> (Scalar, String) {
    let value = read(record, item.field);
    let unit = item.ext.map(|ext| format!(" {ext}")).unwrap_or_default();

    let label = match (&value, item.kind) {
        (Scalar::Int(bits), _) if item.field == Field::Gnss => GNSS_LETTERS
            .iter()
            .filter(|(bit, _)| bits & (1 << bit) != 0)
            .map(|(_, letter)| *letter)
            .collect::<Vec<_>>()
            .join(" + "),
        (Scalar::Int(number), Kind::Enum) => item
            .choice(*number)
            .map_or_else(|| number.to_string(), |choice| choice.title.to_owned()),
        (Scalar::Int(bits), Kind::Bitmask) => {
            let titles = item
                .toggles
                .iter()
                .filter(|toggle| bits & i64::from(toggle.mask()) != 0)
                .map(|toggle| toggle.title)
                .collect::<Vec<_>>();

            if titles.is_empty() {
                "none".to_owned()
            } else {
                titles.join(", ")
            }
        }
        (Scalar::Bool(true), _) => "on".to_owned(),
        (Scalar::Bool(false), _) => "off".to_owned(),
        (Scalar::Int(number), _) => format!("{number}{unit}"),
        (Scalar::Float(number), _) => format!("{number}{unit}"),
        (Scalar::Str(_), _) if matches!(item.field, Field::Password(_)) => "********".to_owned(),
        (Scalar::Str(text), _) => text.clone(),
    };

    (value, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::schema::ITEMS;
    use serde_json::json;

    fn item(name: &str) -> &'static ItemDef {
        ITEMS.iter().find(|item| item.name == name).unwrap()
    }

    #[test]
    fn bool_accepts_legacy_numbers() {
        let log_txt = item("log_txt");

        assert_eq!(coerce(log_txt, &json!(0)), Ok(Scalar::Bool(false)));
        assert_eq!(coerce(log_txt, &json!(true)), Ok(Scalar::Bool(true)));
        assert!(coerce(log_txt, &json!(2)).is_err());
        assert!(coerce(log_txt, &json!("yes")).is_err());
    }

    #[test]
    fn enum_rejects_undeclared_value() {
        let gnss = item("gnss");

        assert_eq!(coerce(gnss, &json!(47)), Ok(Scalar::Int(47)));
        assert_eq!(coerce(gnss, &json!(48)), Err(FieldError::NotAChoice(48)));
    }

    #[test]
    fn negative_ublox_type_means_autoselect() {
        assert_eq!(coerce(item("ublox_type"), &json!(-3)), Ok(Scalar::Int(0)));
    }

    #[test]
    fn bitmask_rejects_undefined_bits() {
        let gpio12 = item("gpio12_screens");

        assert_eq!(coerce(gpio12, &json!(0b1_1000)), Ok(Scalar::Int(0b1_1000)));
        assert_eq!(
            coerce(gpio12, &json!(0b10_0000)),
            Err(FieldError::UndefinedBits(0b10_0000))
        );
    }

    #[test]
    fn integers_are_bounded_by_field_width() {
        let bar = item("bar_length");
        let days = item("archive_days");

        assert_eq!(coerce(bar, &json!(50)), Ok(Scalar::Int(50)));
        assert_eq!(coerce(days, &json!(65_535)), Ok(Scalar::Int(65_535)));
        assert_eq!(
            coerce(days, &json!(65_536)),
            Err(FieldError::OutOfRange("65536".into()))
        );
        assert!(coerce(item("stat_speed"), &json!(256)).is_err());
        assert!(coerce(bar, &json!(-1)).is_err());
    }

    #[test]
    fn float_range_is_checked() {
        let timezone = item("timezone");

        assert_eq!(coerce(timezone, &json!(-3.5)), Ok(Scalar::Float(-3.5)));
        assert!(coerce(timezone, &json!(20)).is_err());
    }

    #[test]
    fn whole_float_is_an_integer() {
        assert_eq!(coerce(item("sample_rate"), &json!(10.0)), Ok(Scalar::Int(10)));
        assert!(coerce(item("sample_rate"), &json!(10.5)).is_err());
    }

    #[test]
    fn long_text_is_truncated() {
        let long = "x".repeat(100);
        let Ok(Scalar::Str(text)) = coerce(item("hostname"), &json!(long)) else {
            panic!("hostname refused");
        };

        assert_eq!(text.len(), crate::config::Hostname::CAPACITY);
    }

    #[test]
    fn apply_reports_change_and_force() {
        let mut record = ConfigRecord::default();

        assert_eq!(apply(&mut record, Field::SampleRate, &Scalar::Int(5), false), Ok(false));
        assert_eq!(apply(&mut record, Field::SampleRate, &Scalar::Int(5), true), Ok(true));
        assert_eq!(apply(&mut record, Field::SampleRate, &Scalar::Int(10), false), Ok(true));
        assert_eq!(record.gps.sample_rate, 10);
    }

    #[test]
    fn apply_refuses_mismatched_scalar() {
        let mut record = ConfigRecord::default();

        assert!(apply(&mut record, Field::LogTxt, &Scalar::Int(1), false).is_err());
        assert!(record.gps.log_txt);
    }

    #[test]
    fn timezone_serializes_short() {
        assert_eq!(Scalar::Float(0.1).to_json().to_string(), "0.1");
        assert_eq!(Scalar::Float(2.0).to_json().to_string(), "2.0");
    }

    #[test]
    fn gnss_is_described_by_letters() {
        let mut record = ConfigRecord::default();
        record.gps.gnss = 99;

        let (value, label) = describe(&record, item("gnss"));
        assert_eq!(value, Scalar::Int(99));
        assert_eq!(label, "G + R");
    }

    #[test]
    fn bitmask_is_described_by_titles() {
        let mut record = ConfigRecord::default();
        record.screen.gpio12_screens = 0b1_1000;

        let (_, label) = describe(&record, item("gpio12_screens"));
        assert_eq!(label, "s10 runs, Alfa's");
    }
}
