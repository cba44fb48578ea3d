//! Error types for the configuration component.

use crate::{conf_warn, registry::SetError};
use std::{fmt::Display, io, path::PathBuf};
use thiserror::Error;

/// Failures of whole-record operations (load, save, cyclic advance, hook registration).
///
/// Per-item failures of a set are described by [`SetError`], which is wrapped here when a
/// set is part of a persisting operation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file could not be read, written or renamed.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input text is not valid JSON.
    #[error("bad json: {0}")]
    Parse(#[from] serde_json::Error),

    /// A document is valid JSON but not a configuration object.
    #[error("malformed configuration document")]
    MalformedDocument,

    /// Neither the primary, the backup nor the factory file could be used.
    #[error("configuration not found")]
    NotFound,

    /// No schema item with this index or name.
    #[error("unknown item `{0}`")]
    UnknownItem(String),

    /// The item has no next-value sequence.
    #[error("item `{0}` cannot be cycled")]
    NotCyclic(&'static str),

    /// Bit position outside of the toggles declared for a bitmask item.
    #[error("item `{name}` has no toggle at bit {pos}")]
    NoSuchToggle { name: &'static str, pos: u8 },

    /// The change hook can only be registered once per store.
    #[error("change hook already registered")]
    HookAlreadySet,

    /// A set operation was refused.
    #[error(transparent)]
    Set(#[from] SetError),
}

impl ConfigError {
    /// Returns whether the in-memory record is still fully usable after this error.
    ///
    /// Storage and document failures leave the previous (or default) record in place, so
    /// everything except a refused set is recoverable by carrying on.
    pub const fn recoverable(&self) -> bool {
        !matches!(self, Self::Set(..) | Self::UnknownItem(..))
    }
}

/// Trait for non-fatal error types that can be "reported" to the console.
///
/// This trait is meant to be implemented for [`Result`](Result)s.
pub trait ReportableError {
    /// Log a warning if the [`Result`] variant is an [`Err`], or do nothing if it's [`Ok`].
    fn report(self, desc: &str);
}

impl<T, E: Display> ReportableError for Result<T, E> {
    fn report(self, desc: &str) {
        if let Err(why) = self {
            conf_warn!("{desc}: {why}");
        }
    }
}
