//! Persistence controller.
//!
//! [`ConfigStore`] owns the configuration record behind a re-entrant lock together with the
//! paths of the configuration files. Every operation takes the lock for its whole duration,
//! so a set followed by a save, or a batch run through [`ConfigStore::locked`], cannot be
//! interleaved with another thread's operations.

use crate::{
    conf_debug, conf_error, conf_info, conf_warn,
    config::{ConfigRecord, CONFIG_BACKUP_FILE, CONFIG_FACTORY_FILE, CONFIG_FILE, MOUNT_POINT},
    registry::{
        cycle,
        fields::{self, Scalar},
        schema::GpsHardware,
        ChangeResult, ItemId, ItemView, Projection, Registry, SetError,
    },
    sysc::{
        events::{ConfigEvent, EventSink, NullSink},
        storage::{self, FsStorage, Storage},
        ConfigError, ConfigResult,
    },
};
use parking_lot::ReentrantMutex;
use serde_json::{Map, Value};
use std::{
    cell::RefCell,
    fmt,
    path::{Path, PathBuf},
    sync::OnceLock,
};

/// Observer called with the canonical name of every item whose value changed.
///
/// It runs while the store is locked. It may read from the store, but should hand off
/// anything slow (like saving) to another task.
pub type ChangeHook = Box<dyn Fn(&'static str) + Send + Sync>;

/// Locations of the configuration documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub primary: PathBuf,
    pub backup: PathBuf,
    /// Read-only defaults, used when neither of the others can be read.
    pub factory: PathBuf,
}

impl StoragePaths {
    /// Standard file names inside `dir`.
    pub fn under<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();

        Self {
            primary: dir.join(CONFIG_FILE),
            backup: dir.join(CONFIG_BACKUP_FILE),
            factory: dir.join(CONFIG_FACTORY_FILE),
        }
    }
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::under(MOUNT_POINT)
    }
}

/// Which document a successful [`ConfigStore::load`] used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    Backup,
    Factory,
}

impl fmt::Display for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary",
            Self::Backup => "backup",
            Self::Factory => "factory defaults",
        })
    }
}

struct State {
    record: ConfigRecord,
    hardware: GpsHardware,
}

pub struct ConfigStoreBuilder {
    paths: StoragePaths,
    storage: Box<dyn Storage>,
    events: Box<dyn EventSink>,
    hardware: GpsHardware,
}

impl ConfigStoreBuilder {
    #[must_use]
    pub fn storage<S: Storage + 'static>(mut self, storage: S) -> Self {
        self.storage = Box::new(storage);
        self
    }

    #[must_use]
    pub fn events<E: EventSink + 'static>(mut self, events: E) -> Self {
        self.events = Box::new(events);
        self
    }

    #[must_use]
    pub fn hardware(mut self, hardware: GpsHardware) -> Self {
        self.hardware = hardware;
        self
    }

    /// Create the store holding the compiled-in defaults.
    pub fn build(self) -> ConfigStore {
        let store = ConfigStore {
            state: ReentrantMutex::new(RefCell::new(State {
                record: ConfigRecord::default(),
                hardware: self.hardware,
            })),
            registry: Registry::new(),
            paths: self.paths,
            storage: self.storage,
            events: self.events,
            hook: OnceLock::new(),
        };

        store.events.post(ConfigEvent::InitDone);
        store
    }
}

/// The process-wide configuration, its files and its observers.
pub struct ConfigStore {
    state: ReentrantMutex<RefCell<State>>,
    registry: Registry,
    paths: StoragePaths,
    storage: Box<dyn Storage>,
    events: Box<dyn EventSink>,
    hook: OnceLock<ChangeHook>,
}

impl ConfigStore {
    /// Store on the local filesystem that publishes no events.
    pub fn new(paths: StoragePaths) -> Self {
        Self::builder(paths).build()
    }

    pub fn builder(paths: StoragePaths) -> ConfigStoreBuilder {
        ConfigStoreBuilder {
            paths,
            storage: Box::new(FsStorage),
            events: Box::new(NullSink),
            hardware: GpsHardware::Unknown,
        }
    }

    pub const fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register the change observer. Only one can be registered per store.
    pub fn set_change_hook<F>(&self, hook: F) -> ConfigResult<()>
    where
        F: Fn(&'static str) + Send + Sync + 'static,
    {
        self.hook
            .set(Box::new(hook))
            .map_err(|_| ConfigError::HookAlreadySet)
    }

    pub fn hardware(&self) -> GpsHardware {
        self.state.lock().borrow().hardware
    }

    /// Record the receiver generation reported by the GPS driver.
    pub fn set_hardware(&self, hardware: GpsHardware) {
        self.state.lock().borrow_mut().hardware = hardware;
    }

    /// Run `batch` while holding the store lock.
    ///
    /// Store operations called from `batch` re-acquire the lock without blocking, so the
    /// whole batch is atomic for other threads.
    pub fn locked<R>(&self, batch: impl FnOnce(&Self) -> R) -> R {
        let _guard = self.state.lock();
        batch(self)
    }

    /// Copy of the current record.
    pub fn snapshot(&self) -> ConfigRecord {
        self.state.lock().borrow().record.clone()
    }

    /// Replace the file contents in memory: primary, then backup, then the factory file.
    ///
    /// Items missing from the chosen document keep their current value. When no document
    /// can be used the record is left untouched.
    pub fn load(&self) -> ConfigResult<LoadSource> {
        let guard = self.state.lock();
        let sources = [
            (LoadSource::Primary, &self.paths.primary),
            (LoadSource::Backup, &self.paths.backup),
            (LoadSource::Factory, &self.paths.factory),
        ];

        let found = sources.into_iter().find_map(|(source, path)| {
            match self.read_document(path) {
                Ok(doc) => Some((source, doc)),
                Err(why) => {
                    conf_warn!("Cannot use {}: {why}", path.display());
                    None
                }
            }
        });

        let Some((source, doc)) = found else {
            conf_error!("No usable configuration, keeping current values");
            self.events.post(ConfigEvent::LoadFail);
            return Err(ConfigError::NotFound);
        };

        let changed = {
            let mut state = guard.borrow_mut();
            let changed = self.registry.decode(&mut state.record, &doc);
            state.record.fix_values();
            changed
        };

        conf_info!("Loaded {source} configuration, {} items changed", changed.len());
        self.notify(&changed);
        self.events.post(ConfigEvent::LoadDone);
        Ok(source)
    }

    fn read_document(&self, path: &Path) -> ConfigResult<Map<String, Value>> {
        let raw = self.storage.read(path)?;

        match serde_json::from_slice::<Value>(&raw)? {
            Value::Object(doc) => Ok(doc),
            _ => Err(ConfigError::MalformedDocument),
        }
    }

    /// Write the whole record to the primary file, keeping the previous one as backup.
    ///
    /// A failed save does not roll back the in-memory record.
    pub fn save(&self) -> ConfigResult<()> {
        let guard = self.state.lock();
        let doc = self.registry.encode(&guard.borrow().record);

        match serde_json::to_string_pretty(&Value::Object(doc)) {
            Ok(text) => self.write_document(&text),
            Err(why) => {
                conf_error!("Cannot encode configuration: {why}");
                self.events.post(ConfigEvent::SaveFail);
                Err(why.into())
            }
        }
    }

    /// Check `text`, rotate the primary file to backup and write `text` as primary.
    ///
    /// Nothing on storage is touched when `text` is not a configuration object.
    pub(crate) fn write_document(&self, text: &str) -> ConfigResult<()> {
        let _guard = self.state.lock();

        if !matches!(serde_json::from_str::<Value>(text), Ok(Value::Object(_))) {
            conf_error!("Refusing to save a malformed document");
            self.events.post(ConfigEvent::SaveFail);
            return Err(ConfigError::MalformedDocument);
        }

        match self.storage.rename(&self.paths.primary, &self.paths.backup) {
            Ok(()) => {}
            Err(why) if storage::is_not_found(&why) => {
                conf_debug!("No previous configuration to back up");
            }
            Err(why) => conf_warn!("Cannot back up configuration: {why}"),
        }

        if let Err(why) = self.storage.write(&self.paths.primary, text.as_bytes()) {
            conf_error!("Saving configuration failed: {why}");
            self.events.post(ConfigEvent::SaveFail);
            return Err(why);
        }

        conf_info!("Configuration saved");
        self.events.post(ConfigEvent::SaveDone);
        Ok(())
    }

    /// Render one item, see [`Registry::get`].
    pub fn get(&self, name: &str, projection: Projection) -> Option<String> {
        let guard = self.state.lock();
        let state = guard.borrow();

        self.registry
            .get(&state.record, name, projection, state.hardware)
    }

    /// Introspection view of one item, `None` if unknown or hidden on this receiver.
    pub fn view(&self, name: &str) -> Option<ItemView> {
        let guard = self.state.lock();
        let state = guard.borrow();
        let id = self.registry.lookup(name)?;

        id.def()
            .visible(state.hardware)
            .then(|| self.registry.view(&state.record, id, state.hardware))
    }

    /// Value and display text of one item.
    pub fn describe(&self, name: &str) -> Option<(Scalar, String)> {
        let id = self.registry.lookup(name)?;
        let guard = self.state.lock();
        let state = guard.borrow();

        Some(fields::describe(&state.record, id.def()))
    }

    /// Set one item without saving, see [`Registry::set`].
    pub fn set(
        &self,
        name: Option<&str>,
        doc: &Value,
        force: bool,
    ) -> Result<ChangeResult, SetError> {
        let guard = self.state.lock();
        let result = self
            .registry
            .set(&mut guard.borrow_mut().record, name, doc, force);

        if let Ok(ChangeResult::Changed(id)) = result {
            self.notify(&[id]);
        }

        result
    }

    /// Parse `json` and [`set`](Self::set) it. Unparseable text counts as no value.
    pub fn set_from_str(
        &self,
        name: Option<&str>,
        json: &str,
        force: bool,
    ) -> Result<ChangeResult, SetError> {
        let doc = serde_json::from_str::<Value>(json).map_err(|why| {
            conf_warn!("Cannot parse `{json}`: {why}");
            SetError::NoValue
        })?;

        self.set(name, &doc, force)
    }

    /// Set one item and save, but only if its value changed.
    pub fn set_and_save(&self, name: Option<&str>, json: &str) -> ConfigResult<ChangeResult> {
        let _guard = self.state.lock();
        let result = self.set_from_str(name, json, false)?;

        if result.changed() {
            self.save()?;
        }

        Ok(result)
    }

    /// Apply a whole document, like a load from `doc`. Returns the number of changed items.
    pub fn decode(&self, doc: &Value) -> ConfigResult<usize> {
        let Value::Object(doc) = doc else {
            return Err(ConfigError::MalformedDocument);
        };

        let guard = self.state.lock();
        let changed = {
            let mut state = guard.borrow_mut();
            let changed = self.registry.decode(&mut state.record, doc);
            state.record.fix_values();
            changed
        };

        self.notify(&changed);
        Ok(changed.len())
    }

    pub fn decode_str(&self, json: &str) -> ConfigResult<usize> {
        self.decode(&serde_json::from_str::<Value>(json)?)
    }

    /// The whole record as a document, see [`Registry::encode`].
    pub fn encode(&self) -> Map<String, Value> {
        let guard = self.state.lock();
        let doc = self.registry.encode(&guard.borrow().record);
        doc
    }

    /// Move an item to its next value and save.
    pub fn advance(&self, id: ItemId) -> ConfigResult<Scalar> {
        let guard = self.state.lock();
        let next = {
            let state = guard.borrow();
            let current = fields::read(&state.record, id.def().field);
            cycle::next_value(id.def(), &current, state.hardware)?
        };

        self.store_value(id, &next)?;
        self.save()?;
        Ok(next)
    }

    /// Flip bit `pos` of a bitmask item and save.
    pub fn toggle(&self, id: ItemId, pos: u8) -> ConfigResult<Scalar> {
        let guard = self.state.lock();
        let next = {
            let state = guard.borrow();
            let current = fields::read(&state.record, id.def().field);
            cycle::toggle_bit(id.def(), &current, pos)?
        };

        self.store_value(id, &next)?;
        self.save()?;
        Ok(next)
    }

    fn store_value(&self, id: ItemId, value: &Scalar) -> ConfigResult<()> {
        let guard = self.state.lock();
        let item = id.def();
        let changed = fields::apply(&mut guard.borrow_mut().record, item.field, value, false)
            .map_err(|reason| SetError::Invalid {
                name: item.name,
                reason,
            })?;

        if changed {
            self.notify(&[id]);
        }

        Ok(())
    }

    /// Go back to the compiled-in defaults without saving.
    ///
    /// The change hook stays registered and is called for every item that changed.
    pub fn reset_defaults(&self) {
        let guard = self.state.lock();
        let changed = {
            let mut state = guard.borrow_mut();
            let previous = std::mem::take(&mut state.record);

            self.registry
                .ids()
                .filter(|id| {
                    let field = id.def().field;
                    fields::read(&previous, field) != fields::read(&state.record, field)
                })
                .collect::<Vec<_>>()
        };

        conf_info!("Configuration reset to defaults");
        self.notify(&changed);
    }

    fn notify(&self, changed: &[ItemId]) {
        let Some(hook) = self.hook.get() else {
            return;
        };

        for id in changed {
            conf_debug!("`{}` changed", id.def().name);
            hook(id.def().name);
        }
    }
}
