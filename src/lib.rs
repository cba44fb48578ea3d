#![allow(
    clippy::module_name_repetitions,
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![warn(clippy::unwrap_used)]

//! Persistent configuration of the ESP GPS logger.
//!
//! Settings live in a [`ConfigRecord`](config::ConfigRecord) described item by item in
//! [`ITEMS`](registry::ITEMS). The [`ConfigStore`](store::ConfigStore) owns the record,
//! serializes access to it and keeps the JSON documents on the SD card in sync.

pub mod config;
pub mod registry;
pub mod shell;
pub mod store;
pub mod sysc;

pub use registry::{ChangeResult, ItemId, Projection, Registry, SetError};
pub use store::{ConfigStore, LoadSource, StoragePaths};
pub use sysc::{ConfigError, ConfigResult};
