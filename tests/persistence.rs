use gpslog_config::{
    config::{ConfigRecord, CONFIG_BACKUP_FILE, CONFIG_FACTORY_FILE, CONFIG_FILE},
    registry::schema::GpsHardware,
    sysc::{
        events::ConfigEvent,
        storage::{FsStorage, Storage},
    },
    ConfigError, ConfigResult, ConfigStore, LoadSource, StoragePaths,
};
use serde_json::{json, Value};
use std::{
    fs, io,
    path::Path,
    sync::mpsc::{self, Receiver},
    thread,
};
use tempfile::{tempdir, TempDir};

/// A card that can be read but refuses every modification.
struct WriteProtected;

impl Storage for WriteProtected {
    fn read(&self, path: &Path) -> ConfigResult<Vec<u8>> {
        FsStorage.read(path)
    }

    fn write(&self, path: &Path, _contents: &[u8]) -> ConfigResult<()> {
        Err(denied(path))
    }

    fn rename(&self, from: &Path, _to: &Path) -> ConfigResult<()> {
        Err(denied(from))
    }
}

fn denied(path: &Path) -> ConfigError {
    ConfigError::Io {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "write protected"),
    }
}

fn card() -> (TempDir, ConfigStore, Receiver<ConfigEvent>) {
    let dir = tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let store = ConfigStore::builder(StoragePaths::under(dir.path()))
        .events(tx)
        .build();

    // drop InitDone
    rx.recv().unwrap();
    (dir, store, rx)
}

fn write_json(dir: &Path, file: &str, doc: &Value) {
    fs::write(dir.join(file), serde_json::to_vec_pretty(doc).unwrap()).unwrap();
}

fn read_json(dir: &Path, file: &str) -> Value {
    serde_json::from_slice(&fs::read(dir.join(file)).unwrap()).unwrap()
}

#[test]
fn corrupt_primary_falls_back_to_backup() {
    let (dir, store, rx) = card();
    fs::write(dir.path().join(CONFIG_FILE), "{\"gnss\": 47,").unwrap();
    write_json(dir.path(), CONFIG_BACKUP_FILE, &json!({"gnss": 99}));

    assert_eq!(store.load().unwrap(), LoadSource::Backup);
    assert_eq!(store.snapshot().gps.gnss, 99);
    assert_eq!(rx.try_recv(), Ok(ConfigEvent::LoadDone));
}

#[test]
fn non_object_primary_is_unusable() {
    let (dir, store, _rx) = card();
    write_json(dir.path(), CONFIG_FILE, &json!([1, 2, 3]));
    write_json(dir.path(), CONFIG_BACKUP_FILE, &json!({"archive_days": 5}));

    assert_eq!(store.load().unwrap(), LoadSource::Backup);
    assert_eq!(store.snapshot().archive_days, 5);
}

#[test]
fn factory_file_seeds_first_boot() {
    let (dir, store, _rx) = card();
    write_json(
        dir.path(),
        CONFIG_FACTORY_FILE,
        &json!({"ubx_file": "kite", "timezone": 1.0}),
    );

    assert_eq!(store.load().unwrap(), LoadSource::Factory);

    let record = store.snapshot();
    assert_eq!(record.ubx_file.as_str(), "kite");
    assert_eq!(record.timezone, 1.0);
}

#[test]
fn unreadable_card_keeps_current_values() {
    let (dir, store, rx) = card();
    fs::write(dir.path().join(CONFIG_FILE), "garbage").unwrap();
    fs::write(dir.path().join(CONFIG_BACKUP_FILE), "").unwrap();
    store.set(Some("sample_rate"), &json!(10), false).unwrap();
    let before = store.snapshot();

    assert!(matches!(store.load(), Err(ConfigError::NotFound)));
    assert_eq!(store.snapshot(), before);
    assert_eq!(rx.try_recv(), Ok(ConfigEvent::LoadFail));
}

#[test]
fn missing_keys_keep_their_value() {
    let (dir, store, _rx) = card();
    write_json(dir.path(), CONFIG_FILE, &json!({"speed_field": 4}));

    store.load().unwrap();

    let mut expected = ConfigRecord::default();
    expected.screen.speed_field = 4;
    assert_eq!(store.snapshot(), expected);
}

#[test]
fn legacy_document_is_understood() {
    let (dir, store, _rx) = card();
    write_json(
        dir.path(),
        CONFIG_FILE,
        &json!({
            "logTXT": 0,
            "logGPX": 1,
            "Board_Logo": 5,
            "Sail_Logo": 12,
            "Stat_screens_time": 4,
            "GPIO12_screens": 12,
            "UBXfile": "legacy",
            "Sleep_info": "gone sailing",
            "file_date_time": 1,
            "ublox_type": -1
        }),
    );

    store.load().unwrap();
    let record = store.snapshot();

    assert!(!record.gps.log_txt);
    assert!(record.gps.log_gpx);
    assert_eq!(record.screen.board_logo, 5);
    assert_eq!(record.screen.sail_logo, 12);
    assert_eq!(record.screen.stat_screens_time, 4);
    assert_eq!(record.screen.gpio12_screens, 12);
    assert_eq!(record.ubx_file.as_str(), "legacy");
    assert_eq!(record.sleep_info.as_str(), "gone sailing");
    assert_eq!(record.gps.ublox_type, 0);
}

#[test]
fn stored_numbers_within_field_width_survive_load() {
    let (dir, store, _rx) = card();
    write_json(
        dir.path(),
        CONFIG_FILE,
        &json!({
            "bar_length": 50,
            "archive_days": 5000,
            "stat_speed": 60,
            "stat_screens_time": 0,
            "board_logo": 0
        }),
    );

    store.load().unwrap();
    let record = store.snapshot();

    assert_eq!(record.screen.bar_length, 50);
    assert_eq!(record.archive_days, 5000);
    assert_eq!(record.screen.stat_speed, 60);
    assert_eq!(record.screen.stat_screens_time, 1);
    assert_eq!(record.screen.board_logo, 0);
}

#[test]
fn index_naming_forces_text_log_on_load() {
    let (dir, store, _rx) = card();
    write_json(
        dir.path(),
        CONFIG_FILE,
        &json!({"log_txt": false, "file_date_time": 0}),
    );

    store.load().unwrap();
    assert!(store.snapshot().gps.log_txt);
}

#[test]
fn save_rotates_previous_primary() {
    let (dir, store, rx) = card();

    store.set(Some("bar_length"), &json!(500), false).unwrap();
    store.save().unwrap();
    store.set(Some("bar_length"), &json!(1000), false).unwrap();
    store.save().unwrap();

    assert_eq!(read_json(dir.path(), CONFIG_FILE)["bar_length"], 1000);
    assert_eq!(read_json(dir.path(), CONFIG_BACKUP_FILE)["bar_length"], 500);
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        [ConfigEvent::SaveDone, ConfigEvent::SaveDone]
    );
}

#[test]
fn saved_document_reloads_identically() {
    let (dir, store, _rx) = card();
    let edits = json!({
        "speed_unit": 2,
        "gnss": 43,
        "timezone": -3.5,
        "stat_screens": 0b1010_0101,
        "hostname": "boat-logger",
        "ssid": "harbour",
        "password": "secret",
        "ssid3": "home",
        "password3": "hunter2",
        "update_enabled": false
    });
    assert_eq!(store.decode(&edits).unwrap(), 10);
    store.save().unwrap();

    let reopened = ConfigStore::new(StoragePaths::under(dir.path()));
    assert_eq!(reopened.load().unwrap(), LoadSource::Primary);
    assert_eq!(reopened.snapshot(), store.snapshot());
    assert_eq!(reopened.snapshot().first_difference(&store.snapshot()), None);
}

#[test]
fn spare_stations_are_omitted_when_empty() {
    let (dir, store, _rx) = card();
    store.save().unwrap();

    let doc = read_json(dir.path(), CONFIG_FILE);
    assert_eq!(doc["ssid"], "");
    assert!(doc.get("ssid1").is_none());
    assert!(doc.get("password3").is_none());
}

#[test]
fn failed_write_reports_save_failure() {
    let dir = tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let store = ConfigStore::builder(StoragePaths::under(dir.path()))
        .storage(WriteProtected)
        .events(tx)
        .build();

    store.set(Some("gnss"), &json!(39), false).unwrap();

    assert!(matches!(store.save(), Err(ConfigError::Io { .. })));
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        [ConfigEvent::InitDone, ConfigEvent::SaveFail]
    );
    // the edit is kept in memory
    assert_eq!(store.snapshot().gps.gnss, 39);
    assert!(!dir.path().join(CONFIG_FILE).exists());
}

#[test]
fn set_and_save_on_write_protected_card() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::builder(StoragePaths::under(dir.path()))
        .storage(WriteProtected)
        .build();

    assert!(store.set_and_save(Some("archive_days"), "30").is_ok());
    assert!(matches!(
        store.set_and_save(Some("archive_days"), "31"),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn locked_batch_is_atomic() {
    let (_dir, store, _rx) = card();

    thread::scope(|scope| {
        scope.spawn(|| {
            for rate in [1, 10, 1, 10, 1, 10] {
                store.locked(|store| {
                    store.set(Some("sample_rate"), &json!(rate), false).unwrap();
                    store
                        .set(Some("log_ubx_nav_sat"), &json!(rate == 1), false)
                        .unwrap();
                    store.save().unwrap();
                });
            }
        });

        scope.spawn(|| {
            for _ in 0..50 {
                let record = store.snapshot();

                if record.gps.sample_rate != 5 {
                    assert_eq!(record.gps.log_ubx_nav_sat, record.gps.sample_rate == 1);
                }
            }
        });
    });

    assert_eq!(store.snapshot().gps.sample_rate, 10);
}

#[test]
fn hardware_gates_introspection_only() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::builder(StoragePaths::under(dir.path()))
        .hardware(GpsHardware::M10)
        .build();

    assert!(store.get("dynamic_model", gpslog_config::Projection::Bare).is_none());
    assert!(store.encode().contains_key("dynamic_model"));
    assert_eq!(store.hardware(), GpsHardware::M10);
}
