//! The session event loop.

use crate::config::SyncConfig;
use crate::debounce::FlushTimer;
use crate::error::{SyncError, SyncResult};
use crate::transport::ChangeTransport;
use scopesync_scope::{Scope, ScopeResult};
use scopesync_types::codec;
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace, warn};

/// A local edit queued for [`SyncSession::run`].
pub type LocalEdit = Box<dyn FnOnce(&mut Scope) -> ScopeResult<()>>;

/// Work items consumed by [`SyncSession::run`].
pub enum SessionInput {
    /// Edit the scope locally; the result is shipped after the debounce.
    Local(LocalEdit),
    /// A JSON change-set received from another replica.
    Remote(String),
}

impl SessionInput {
    pub fn local(edit: impl FnOnce(&mut Scope) -> ScopeResult<()> + 'static) -> Self {
        Self::Local(Box::new(edit))
    }

    pub fn remote(payload: impl Into<String>) -> Self {
        Self::Remote(payload.into())
    }
}

/// Couples a scope with a transport and flushes local diffs after a quiet
/// period.
pub struct SyncSession<T> {
    scope: Scope,
    transport: T,
    timer: FlushTimer,
    /// Serialized batches not yet accepted by the transport, oldest first.
    outbox: VecDeque<String>,
}

impl<T: ChangeTransport> SyncSession<T> {
    pub fn new(scope: Scope, transport: T) -> Self {
        Self::with_config(scope, transport, SyncConfig::default())
    }

    pub fn with_config(scope: Scope, transport: T, config: SyncConfig) -> Self {
        Self {
            scope,
            transport,
            timer: FlushTimer::new(config.flush_delay),
            outbox: VecDeque::new(),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn timer(&self) -> &FlushTimer {
        &self.timer
    }

    /// Batches waiting for a successful send.
    pub fn unsent(&self) -> usize {
        self.outbox.len()
    }

    pub fn into_scope(self) -> Scope {
        self.scope
    }

    /// Runs a local edit and, if it left changes behind, restarts the flush
    /// timer. A failing edit still schedules whatever it changed before
    /// failing.
    pub fn mutate<R>(&mut self, edit: impl FnOnce(&mut Scope) -> ScopeResult<R>) -> SyncResult<R> {
        let result = edit(&mut self.scope);
        if self.scope.has_pending_changes() {
            let deadline = self.timer.schedule();
            trace!(?deadline, "flush scheduled");
        }
        Ok(result?)
    }

    /// Applies a change-set from another replica. Pending local edits are
    /// kept and still flushed on schedule.
    pub fn receive(&mut self, payload: &str) -> SyncResult<()> {
        self.scope.update_from_str(payload)?;
        Ok(())
    }

    /// Pops pending local changes and sends everything unsent, in order.
    /// Returns the number of batches delivered.
    ///
    /// If the pending edits cannot be ordered, they stay pending and the
    /// timer keeps its deadline. On a transport failure the undelivered
    /// batches stay queued and the timer is re-armed so the next flush
    /// retries them.
    pub async fn flush(&mut self) -> SyncResult<usize> {
        let changes = self.scope.pop_changes()?;
        self.timer.cancel();
        if !changes.is_empty() {
            debug!(changes = changes.len(), "queueing local changes");
            self.outbox.push_back(codec::changes_to_string(&changes)?);
        }

        let mut sent = 0;
        while let Some(payload) = self.outbox.front() {
            if let Err(err) = self.transport.send_changes(payload.clone()).await {
                warn!(%err, unsent = self.outbox.len(), "flush failed");
                self.timer.schedule();
                return Err(err);
            }
            self.outbox.pop_front();
            sent += 1;
        }
        if sent > 0 {
            debug!(batches = sent, "flushed");
        }
        Ok(sent)
    }

    /// Flushes if the debounce deadline has passed.
    pub async fn flush_if_due(&mut self) -> SyncResult<usize> {
        if self.timer.is_due(Instant::now()) {
            self.flush().await
        } else {
            Ok(0)
        }
    }

    /// Processes `inbox` until it closes, flushing whenever local edits
    /// have been quiet for the configured delay. A closed inbox triggers a
    /// final flush.
    ///
    /// Transport failures on a timed flush are retried on the re-armed
    /// timer; any other error ends the loop.
    pub async fn run(&mut self, mut inbox: mpsc::UnboundedReceiver<SessionInput>) -> SyncResult<()> {
        loop {
            let deadline = self.timer.deadline();
            tokio::select! {
                input = inbox.recv() => match input {
                    Some(SessionInput::Local(edit)) => self.mutate(edit)?,
                    Some(SessionInput::Remote(payload)) => self.receive(&payload)?,
                    None => {
                        debug!("inbox closed");
                        self.flush().await?;
                        return Ok(());
                    }
                },
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    match self.flush().await {
                        Ok(_) | Err(SyncError::Transport(_)) => {}
                        Err(err) => return Err(err),
                    }
                }
            }
        }
    }
}
