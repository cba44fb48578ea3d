use super::{
    Hostname, Password, SleepText, Ssid, UbxFileName, DEFAULT_HOSTNAME, DEFAULT_SLEEP_INFO,
    DEFAULT_UBX_FILE, STAT_SCREENS_TIME_MIN, WIFI_STATIONS,
};
use crate::registry::{fields, ItemId, ITEMS};

/// File naming mode that numbers files by scanning the existing `.txt` logs.
pub const FILE_NAMING_INDEX: u8 = 0;

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq)]
pub struct GpsConfig {
    /// UBX GNSS id bitmask, see [`GNSS_CHOICES`](crate::registry::schema::GNSS_CHOICES).
    pub gnss: u8,
    /// Navigation rate in Hz.
    pub sample_rate: u8,
    pub dynamic_model: u8,
    pub speed_unit: u8,
    pub ublox_type: u8,
    pub log_txt: bool,
    pub log_ubx: bool,
    pub log_ubx_nav_sat: bool,
    pub log_sbp: bool,
    pub log_gpy: bool,
    pub log_gpx: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenConfig {
    pub speed_field: u8,
    pub speed_large_font: u8,
    pub bar_length: u16,
    pub stat_speed: u8,
    pub stat_screens_time: u8,
    pub stat_screens: u32,
    pub gpio12_screens: u32,
    pub board_logo: u8,
    pub sail_logo: u8,
    pub sleep_off_screen: u8,
    /// Quarter turns, 0-3.
    pub rotation: u8,
    #[cfg(not(feature = "screen-brightness"))]
    pub move_offset: bool,
    #[cfg(feature = "screen-brightness")]
    pub brightness: u8,
    pub no_auto_refresh: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FwUpdateConfig {
    pub enabled: bool,
    /// 0 = stable, 1 = unstable.
    pub channel: u8,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WifiStation {
    pub ssid: Ssid,
    pub password: Password,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub stations: [WifiStation; WIFI_STATIONS],
    pub hostname: Hostname,
}

/// The full persisted settings of the logger.
///
/// Runtime observers are not part of the record; cloning or resetting it never affects them.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRecord {
    pub gps: GpsConfig,
    pub screen: ScreenConfig,
    pub fw_update: FwUpdateConfig,
    pub network: NetworkConfig,
    /// Offset to UTC in hours, may be fractional or negative.
    pub timezone: f32,
    pub file_date_time: u8,
    pub archive_days: u16,
    pub ubx_file: UbxFileName,
    pub sleep_info: SleepText,
}

impl ConfigRecord {
    /// Repair combinations that the rest of the firmware cannot work with.
    pub fn fix_values(&mut self) -> &mut Self {
        if self.file_date_time == FILE_NAMING_INDEX {
            // the running file count is derived from the text logs
            self.gps.log_txt = true;
        }

        if self.screen.stat_screens_time < STAT_SCREENS_TIME_MIN {
            self.screen.stat_screens_time = STAT_SCREENS_TIME_MIN;
        }

        self
    }

    /// Returns the first item, in canonical order, whose value differs between the records.
    pub fn first_difference(&self, other: &Self) -> Option<ItemId> {
        ITEMS
            .iter()
            .position(|item| fields::read(self, item.field) != fields::read(other, item.field))
            .map(ItemId::new)
    }
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            gnss: 111,
            sample_rate: 5,
            dynamic_model: 0,
            speed_unit: 1,
            ublox_type: 0,
            log_txt: true,
            log_ubx: true,
            log_ubx_nav_sat: false,
            log_sbp: false,
            log_gpy: false,
            log_gpx: false,
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            speed_field: 1,
            speed_large_font: 0,
            bar_length: 1852,
            stat_speed: 1,
            stat_screens_time: 3,
            stat_screens: 0b0000_1111,
            gpio12_screens: 0b0000_0110,
            board_logo: 1,
            sail_logo: 1,
            sleep_off_screen: 11,
            rotation: 0,
            #[cfg(not(feature = "screen-brightness"))]
            move_offset: false,
            #[cfg(feature = "screen-brightness")]
            brightness: 100,
            no_auto_refresh: false,
        }
    }
}

impl Default for FwUpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel: 0,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            stations: Default::default(),
            hostname: Hostname::truncated(DEFAULT_HOSTNAME),
        }
    }
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self {
            gps: GpsConfig::default(),
            screen: ScreenConfig::default(),
            fw_update: FwUpdateConfig::default(),
            network: NetworkConfig::default(),
            timezone: 2.0,
            file_date_time: 2,
            archive_days: 30,
            ubx_file: UbxFileName::truncated(DEFAULT_UBX_FILE),
            sleep_info: SleepText::truncated(DEFAULT_SLEEP_INFO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    #[test]
    fn index_naming_forces_text_log() {
        let mut record = ConfigRecord::default();
        record.gps.log_txt = false;
        record.file_date_time = FILE_NAMING_INDEX;

        record.fix_values();
        assert!(record.gps.log_txt);
    }

    #[test]
    fn date_naming_keeps_text_log_choice() {
        let mut record = ConfigRecord::default();
        record.gps.log_txt = false;
        record.file_date_time = 1;

        record.fix_values();
        assert!(!record.gps.log_txt);
    }

    #[test]
    fn refresh_interval_is_at_least_one() {
        let mut record = ConfigRecord::default();
        record.screen.stat_screens_time = 0;

        record.fix_values();
        assert_eq!(record.screen.stat_screens_time, 1);
    }

    #[test]
    fn identical_records_have_no_difference() {
        assert_eq!(
            ConfigRecord::default().first_difference(&ConfigRecord::default()),
            None
        );
    }

    #[test]
    fn first_difference_follows_canonical_order() {
        let registry = Registry::new();
        let mut other = ConfigRecord::default();
        other.archive_days = 7;
        other.gps.sample_rate = 10;

        let id = ConfigRecord::default().first_difference(&other).unwrap();
        assert_eq!(registry.item(id).name, "sample_rate");
    }
}
