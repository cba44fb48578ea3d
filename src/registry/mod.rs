//! Schema-driven access to the configuration record by item name.

pub mod cycle;
pub mod fields;
pub mod schema;

use crate::{
    config::{ConfigRecord, WIFI_STATIONS},
    conf_debug, conf_warn,
};
use fields::{FieldError, Scalar};
use schema::{GpsHardware, ItemDef};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{collections::HashMap, iter};
use thiserror::Error;

pub use fields::Field;
pub use schema::ITEMS;

/// Index of an item in [`ITEMS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(usize);

impl ItemId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }

    pub fn def(self) -> &'static ItemDef {
        &ITEMS[self.0]
    }
}

/// Outcome of a successful set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeResult {
    Changed(ItemId),
    Unchanged,
}

impl ChangeResult {
    pub const fn changed(self) -> bool {
        matches!(self, Self::Changed(..))
    }

    /// Legacy numeric status reported to the web UI.
    pub const fn status(self) -> i32 {
        match self {
            Self::Changed(..) => 1,
            Self::Unchanged => 0,
        }
    }
}

/// Why a set did not touch the record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetError {
    /// No value for the item in the document, or no document at all.
    #[error("no value given")]
    NoValue,

    /// A nameless set without a `name` member.
    #[error("no item name given")]
    NoName,

    #[error("unknown item `{0}`")]
    UnknownName(String),

    /// Every candidate value was refused.
    #[error("invalid value for `{name}`: {reason}")]
    Invalid {
        name: &'static str,
        reason: FieldError,
    },
}

impl SetError {
    /// Legacy numeric status reported to the web UI.
    pub const fn status(&self) -> i32 {
        match self {
            Self::NoValue => -1,
            _ => -2,
        }
    }
}

/// How much of an item [`Registry::get`] renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// `"name":value`
    Bare,
    /// Introspection object for the UI.
    Extended,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceView {
    pub value: i32,
    pub title: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToggleView {
    pub pos: u8,
    pub title: &'static str,
    pub value: u32,
}

/// Everything the UI needs to render and edit one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub name: &'static str,
    pub value: Value,
    pub info: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ChoiceView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub toggles: Vec<ToggleView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<&'static str>,
}

/// Name index over [`ITEMS`].
pub struct Registry {
    index: HashMap<&'static str, ItemId>,
}

impl Registry {
    pub fn new() -> Self {
        let mut index = HashMap::new();

        for (pos, item) in ITEMS.iter().enumerate() {
            for key in item.keys() {
                let previous = index.insert(key, ItemId::new(pos));
                debug_assert!(previous.is_none(), "`{key}` names two items");
            }
        }

        Self { index }
    }

    /// Resolve a canonical name or alias.
    pub fn lookup(&self, name: &str) -> Option<ItemId> {
        self.index.get(name).copied()
    }

    pub fn item(&self, id: ItemId) -> &'static ItemDef {
        id.def()
    }

    /// All items in canonical order.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> {
        (0..ITEMS.len()).map(ItemId::new)
    }

    /// Render one item, or `None` if the name is unknown or hidden for `hw`.
    pub fn get(
        &self,
        record: &ConfigRecord,
        name: &str,
        projection: Projection,
        hw: GpsHardware,
    ) -> Option<String> {
        let id = self.lookup(name)?;
        let item = id.def();

        if !item.visible(hw) {
            return None;
        }

        match projection {
            Projection::Bare => {
                let value = fields::read(record, item.field).to_json();
                Some(format!("{}:{value}", Value::from(item.name)))
            }
            Projection::Extended => serde_json::to_string(&self.view(record, id, hw)).ok(),
        }
    }

    pub fn view(&self, record: &ConfigRecord, id: ItemId, hw: GpsHardware) -> ItemView {
        let item = id.def();

        ItemView {
            name: item.name,
            value: fields::read(record, item.field).to_json(),
            info: item.info,
            kind: item.kind.type_name(),
            values: item
                .choices
                .iter()
                .filter(|choice| choice.available(hw))
                .map(|choice| ChoiceView {
                    value: choice.value,
                    title: choice.title,
                })
                .collect(),
            toggles: item
                .toggles
                .iter()
                .map(|toggle| ToggleView {
                    pos: toggle.pos,
                    title: toggle.title,
                    value: toggle.mask(),
                })
                .collect(),
            ext: item.ext,
        }
    }

    /// Set one item from `doc`.
    ///
    /// With a `name`, `doc` is either a bare value or an object holding the value under
    /// the canonical name or one of the aliases. Keys are tried canonical first, then
    /// aliases in declaration order, whichever of them `name` is; the first valid value
    /// wins. Without a `name`, `doc` must be `{"name": .., "value": ..}`.
    pub fn set(
        &self,
        record: &mut ConfigRecord,
        name: Option<&str>,
        doc: &Value,
        force: bool,
    ) -> Result<ChangeResult, SetError> {
        let Some(name) = name else {
            let name = doc
                .get("name")
                .and_then(Value::as_str)
                .ok_or(SetError::NoName)?;
            let id = self.resolve(name)?;
            let value = doc.get("value").ok_or(SetError::NoValue)?;

            return Self::apply(record, id, iter::once(value), force);
        };

        let id = self.resolve(name)?;

        let Value::Object(members) = doc else {
            return Self::apply(record, id, iter::once(doc), force);
        };

        let values = id.def().keys().filter_map(|key| members.get(key));

        Self::apply(record, id, values, force)
    }

    fn resolve(&self, name: &str) -> Result<ItemId, SetError> {
        self.lookup(name)
            .ok_or_else(|| SetError::UnknownName(name.to_owned()))
    }

    fn apply<'v>(
        record: &mut ConfigRecord,
        id: ItemId,
        candidates: impl IntoIterator<Item = &'v Value>,
        force: bool,
    ) -> Result<ChangeResult, SetError> {
        let item = id.def();
        let mut refused = None;

        for value in candidates {
            let written = fields::coerce(item, value)
                .and_then(|scalar| fields::apply(record, item.field, &scalar, force));

            match written {
                Ok(true) => return Ok(ChangeResult::Changed(id)),
                Ok(false) => return Ok(ChangeResult::Unchanged),
                Err(reason) => {
                    conf_debug!("{}: refused {value}: {reason}", item.name);
                    refused.get_or_insert(reason);
                }
            }
        }

        Err(refused.map_or(SetError::NoValue, |reason| SetError::Invalid {
            name: item.name,
            reason,
        }))
    }

    /// Apply every item present in `doc`, in canonical order.
    ///
    /// Missing and invalid members leave their field untouched. Returns the changed items.
    pub fn decode(&self, record: &mut ConfigRecord, doc: &Map<String, Value>) -> Vec<ItemId> {
        let mut changed = Vec::new();

        for id in self.ids() {
            let candidates = id.def().keys().filter_map(|key| doc.get(key));

            match Self::apply(record, id, candidates, false) {
                Ok(ChangeResult::Changed(id)) => changed.push(id),
                Ok(ChangeResult::Unchanged) | Err(SetError::NoValue) => {}
                Err(why) => conf_warn!("Ignoring stored value: {why}"),
            }
        }

        changed
    }

    /// The whole record as a document, in canonical order.
    ///
    /// Every item is written, whatever the receiver. Empty credentials of the spare Wi-Fi
    /// stations are left out.
    pub fn encode(&self, record: &ConfigRecord) -> Map<String, Value> {
        let mut doc = Map::new();

        for item in ITEMS {
            let value = fields::read(record, item.field);

            if let (Field::Ssid(slot) | Field::Password(slot), Scalar::Str(text)) =
                (item.field, &value)
            {
                if slot > 0 && slot < WIFI_STATIONS && text.is_empty() {
                    continue;
                }
            }

            doc.insert(item.name.to_owned(), value.to_json());
        }

        doc
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
