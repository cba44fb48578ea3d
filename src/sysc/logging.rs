use log::{Level, LevelFilter, Log};
use std::io::{self, Write};

const COLOR_INFO: &str = "\x1b[1;94m";
const COLOR_WARN: &str = "\x1b[1;33m";
const COLOR_ERROR: &str = "\x1b[1;91m";
const COLOR_DEBUG: &str = "\x1b[1;95m";
const RESET_COLOR: &str = "\x1b[0m";

/// Console logger for the host tool.
///
/// Log lines go to STDERR so that shell replies on STDOUT stay machine-readable.
pub struct ConfigLogger {
    level: LevelFilter,
    color: bool,
}

impl ConfigLogger {
    pub const fn new() -> Self {
        Self {
            level: if cfg!(debug_assertions) {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
            color: true,
        }
    }

    pub fn disable(&mut self) {
        self.level = LevelFilter::Off;
    }

    pub fn set_level(&mut self, level: LevelFilter) {
        self.level = level;
    }

    pub fn no_color(&mut self) {
        self.color = false;
    }

    /// Install as the global logger. Returns `false` if another logger was already set.
    pub fn init(self) -> bool {
        let level = self.level;

        if log::set_boxed_logger(Box::new(self)).is_err() {
            return false;
        }

        log::set_max_level(level);
        true
    }

    fn tag(&self, level: Level) -> (&'static str, &'static str) {
        if !self.color {
            return ("", "");
        }

        let color = match level {
            Level::Info => COLOR_INFO,
            Level::Warn => COLOR_WARN,
            Level::Error => COLOR_ERROR,
            Level::Debug => COLOR_DEBUG,
            Level::Trace => "",
        };

        (color, RESET_COLOR)
    }
}

impl Default for ConfigLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Log for ConfigLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let module = record.module_path().unwrap_or("?");
        let (color, reset) = self.tag(record.level());
        let mut stderr = io::stderr().lock();

        // A broken STDERR is not worth failing a configuration operation over.
        let _ = writeln!(
            stderr,
            "{color}{:<5}{reset} [{module}] {}",
            record.level().as_str(),
            record.args()
        );
    }
}

#[macro_export]
macro_rules! conf_info {
    ($($arg:tt)+) => {
        log::info!($($arg)+)
    };
}

#[macro_export]
macro_rules! conf_warn {
    ($($arg:tt)+) => {
        log::warn!($($arg)+)
    };
}

#[macro_export]
macro_rules! conf_error {
    ($($arg:tt)+) => {
        log::error!($($arg)+)
    };
}

#[macro_export]
macro_rules! conf_debug {
    ($($arg:tt)+) => {
        #[cfg(debug_assertions)]
        log::debug!($($arg)+)
    };
}
