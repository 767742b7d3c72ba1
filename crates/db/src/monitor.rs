//! Connection-state tracking fed by driver SDAM events.

use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use mongodb::event::sdam::SdamEvent;

/// Coarse connection state as reported in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Errored,
    Disconnected,
}

impl ConnectionState {
    fn as_u8(self) -> u8 {
        match self {
            ConnectionState::Connecting => 0,
            ConnectionState::Connected => 1,
            ConnectionState::Errored => 2,
            ConnectionState::Disconnected => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connected,
            2 => ConnectionState::Errored,
            3 => ConnectionState::Disconnected,
            _ => ConnectionState::Connecting,
        }
    }
}

/// Shared, cloneable view of the client's connection state.
///
/// Only transitions are logged; repeated heartbeats in the same state are silent.
#[derive(Clone, Debug)]
pub struct ConnectionMonitor {
    state: Arc<AtomicU8>,
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(ConnectionState::Connecting.as_u8())),
        }
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Move to `next`, returning whether the state actually changed.
    pub fn record(&self, next: ConnectionState) -> bool {
        let previous = ConnectionState::from_u8(self.state.swap(next.as_u8(), Ordering::SeqCst));
        if previous == next {
            return false;
        }

        match next {
            ConnectionState::Connected => {
                tracing::info!(target: "bookshelf-db", "connected to MongoDB")
            }
            ConnectionState::Errored => {
                tracing::error!(target: "bookshelf-db", "MongoDB connection error")
            }
            ConnectionState::Disconnected => {
                tracing::warn!(target: "bookshelf-db", "disconnected from MongoDB")
            }
            ConnectionState::Connecting => {
                tracing::info!(target: "bookshelf-db", "connecting to MongoDB")
            }
        }

        true
    }

    pub(crate) fn observe(&self, event: SdamEvent) {
        match event {
            SdamEvent::ServerHeartbeatSucceeded(_) => {
                self.record(ConnectionState::Connected);
            }
            SdamEvent::ServerHeartbeatFailed(event) => {
                if self.record(ConnectionState::Errored) {
                    tracing::error!(
                        target: "bookshelf-db",
                        server = %event.server_address,
                        error = %event.failure,
                        "MongoDB heartbeat failed"
                    );
                }
            }
            SdamEvent::TopologyClosed(_) => {
                self.record(ConnectionState::Disconnected);
            }
            _ => {}
        }
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connecting() {
        assert_eq!(ConnectionMonitor::new().state(), ConnectionState::Connecting);
    }

    #[test]
    fn only_transitions_are_reported() {
        let monitor = ConnectionMonitor::new();

        assert!(monitor.record(ConnectionState::Connected));
        assert!(!monitor.record(ConnectionState::Connected));
        assert!(monitor.record(ConnectionState::Errored));
        assert!(monitor.record(ConnectionState::Connected));
        assert!(monitor.record(ConnectionState::Disconnected));
        assert_eq!(monitor.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn clones_share_state() {
        let monitor = ConnectionMonitor::new();
        let clone = monitor.clone();

        clone.record(ConnectionState::Connected);
        assert_eq!(monitor.state(), ConnectionState::Connected);
    }
}
