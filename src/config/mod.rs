//! Compiled-in constants and the in-memory configuration record.

mod fixed;
mod record;

pub use fixed::{truncate_to_capacity, FixedStr};
pub use record::{
    ConfigRecord, FwUpdateConfig, GpsConfig, NetworkConfig, ScreenConfig, WifiStation,
};

/// Mount point of the SD card holding the configuration files.
pub const MOUNT_POINT: &str = "/sdcard";
/// Live configuration document.
pub const CONFIG_FILE: &str = "config.txt";
/// Previous primary document, rotated on every save.
pub const CONFIG_BACKUP_FILE: &str = "config_backup.txt";
/// Read-only factory defaults, shipped on the card and never written by the logger.
pub const CONFIG_FACTORY_FILE: &str = "config_default.txt";

/// Number of Wi-Fi station slots.
pub const WIFI_STATIONS: usize = 4;

// Buffer sizes of the persisted text fields, terminator included.
pub const UBX_FILE_SIZE: usize = 32;
pub const SLEEP_INFO_SIZE: usize = 32;
pub const SSID_SIZE: usize = 33;
pub const PASSWORD_SIZE: usize = 64;
pub const HOSTNAME_SIZE: usize = 32;

pub type UbxFileName = FixedStr<{ UBX_FILE_SIZE - 1 }>;
pub type SleepText = FixedStr<{ SLEEP_INFO_SIZE - 1 }>;
pub type Ssid = FixedStr<{ SSID_SIZE - 1 }>;
pub type Password = FixedStr<{ PASSWORD_SIZE - 1 }>;
pub type Hostname = FixedStr<{ HOSTNAME_SIZE - 1 }>;

pub const DEFAULT_UBX_FILE: &str = "gps";
pub const DEFAULT_SLEEP_INFO: &str = "ESP GPS";
pub const DEFAULT_HOSTNAME: &str = "esp-logger";

/// Stat-screen refresh interval bounds, in seconds.
pub const STAT_SCREENS_TIME_MIN: u8 = 1;
pub const STAT_SCREENS_TIME_MAX: u8 = 5;
