//! Lifecycle notifications published by the configuration store.

use std::sync::mpsc::{Sender, SyncSender};

/// Discrete lifecycle events of the configuration store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigEvent {
    /// The store has been created with compiled-in defaults.
    InitDone,
    /// A configuration document was read and decoded.
    LoadDone,
    /// No configuration document could be read; the record was left untouched.
    LoadFail,
    /// The record was written to the primary file.
    SaveDone,
    /// The record could not be written; previous files are unchanged or rotated only.
    SaveFail,
}

/// Receiver side of the process-wide event channel.
///
/// Posting must not block on the consumer and must not call back into the store.
pub trait EventSink: Send + Sync {
    fn post(&self, event: ConfigEvent);
}

/// Drops every event. Used when nobody is listening.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn post(&self, _event: ConfigEvent) {}
}

impl EventSink for Sender<ConfigEvent> {
    fn post(&self, event: ConfigEvent) {
        // A hung-up listener is not an error for the store.
        let _ = self.send(event);
    }
}

impl EventSink for SyncSender<ConfigEvent> {
    fn post(&self, event: ConfigEvent) {
        let _ = self.try_send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn channel_sink_delivers_in_order() {
        let (tx, rx) = mpsc::channel();

        tx.post(ConfigEvent::InitDone);
        tx.post(ConfigEvent::SaveFail);

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), [
            ConfigEvent::InitDone,
            ConfigEvent::SaveFail
        ]);
    }

    #[test]
    fn null_sink_as_trait_object() {
        let sink: Box<dyn EventSink> = Box::new(NullSink);

        sink.post(ConfigEvent::InitDone);
        sink.post(ConfigEvent::SaveFail);
    }

    #[test]
    fn bounded_sink_drops_when_full() {
        let (tx, rx) = mpsc::sync_channel(1);

        tx.post(ConfigEvent::LoadDone);
        tx.post(ConfigEvent::SaveDone);

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), [ConfigEvent::LoadDone]);
    }
}
