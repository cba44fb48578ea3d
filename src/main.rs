#![warn(clippy::unwrap_used)]

use gpslog_config::{
    conf_debug, conf_error, conf_info, conf_warn,
    shell,
    store::{ConfigStore, StoragePaths},
    sysc::{
        events::{ConfigEvent, EventSink},
        logging::ConfigLogger,
        ReportableError,
    },
};
use std::{env, io, process::ExitCode};

/// Mirrors lifecycle events into the log, like the event loop handler on the logger.
struct LogSink;

impl EventSink for LogSink {
    fn post(&self, event: ConfigEvent) {
        match event {
            ConfigEvent::LoadFail | ConfigEvent::SaveFail => conf_warn!("Event: {event:?}"),
            _ => conf_info!("Event: {event:?}"),
        }
    }
}

#[cfg_attr(not(debug_assertions), allow(unused_variables))]
fn log_change(name: &'static str) {
    conf_debug!("Changed: {name}");
}

fn main() -> ExitCode {
    let mut logger = ConfigLogger::new();

    if env::var_os("NO_COLOR").is_some() {
        logger.no_color();
    }

    if env::var_os("GPSLOG_QUIET").is_some() {
        logger.disable();
    }

    logger.init();

    conf_info!(
        "gpslog-cfg v{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("GPSLOG_COMMIT")
    );

    let paths = env::args_os()
        .nth(1)
        .map_or_else(StoragePaths::default, StoragePaths::under);
    conf_debug!("Using {}", paths.primary.display());

    let store = ConfigStore::builder(paths).events(LogSink).build();
    store
        .set_change_hook(log_change)
        .report("Cannot watch changes");

    if store.load().is_err() {
        conf_warn!("Starting with default configuration");
    }

    match shell::run(&store, io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(why) => {
            conf_error!("Shell failed: {why}");
            ExitCode::FAILURE
        }
    }
}
