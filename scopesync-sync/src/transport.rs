//! Transport layer abstraction.
//!
//! A transport delivers serialized change-sets to the other replicas. How
//! they get there (socket, relay server, in-process channel) is up to the
//! implementation.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Outbound half of a change-set connection.
#[async_trait]
pub trait ChangeTransport: Send + Sync {
    /// Delivers one JSON change-set.
    async fn send_changes(&self, payload: String) -> SyncResult<()>;
}

/// Transport that hands payloads to an in-process channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    pub fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self { sender }
    }

    /// A transport plus the receiver its payloads arrive on.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl ChangeTransport for ChannelTransport {
    async fn send_changes(&self, payload: String) -> SyncResult<()> {
        self.sender
            .send(payload)
            .map_err(|_| SyncError::ChannelClosed)
    }
}

/// A recording transport for testing.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Keeps every delivered payload; can be switched offline to simulate
    /// delivery failures.
    #[derive(Debug, Clone, Default)]
    pub struct MemoryTransport {
        sent: Arc<Mutex<Vec<String>>>,
        offline: Arc<AtomicBool>,
    }

    impl MemoryTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Payloads delivered so far, oldest first.
        pub fn sent(&self) -> Vec<String> {
            self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
        }

        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ChangeTransport for MemoryTransport {
        async fn send_changes(&self, payload: String) -> SyncResult<()> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(SyncError::Transport("offline".into()));
            }
            self.sent
                .lock()
                .map_err(|_| SyncError::Transport("poisoned".into()))?
                .push(payload);
            Ok(())
        }
    }
}
