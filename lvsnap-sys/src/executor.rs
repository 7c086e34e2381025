// SPDX-License-Identifier: GPL-3.0-only

//! Single-slot background executor for lifecycle operations
//!
//! At most one create/remove/mount runs at a time. A second request while one
//! is outstanding is rejected with [`SysError::Busy`] instead of being
//! interleaved. Running operations cannot be cancelled.

use std::sync::{Arc, Mutex};

use lvsnap_types::{LifecycleRequest, OperationResult};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::{Result, SysError};
use crate::lifecycle::SnapshotLifecycle;

type Slot = Arc<Mutex<Option<String>>>;

/// Holds the executor slot for one operation; frees it on drop, including
/// when the worker unwinds.
struct SlotGuard {
    slot: Slot,
}

impl SlotGuard {
    fn acquire(slot: &Slot, request: &LifecycleRequest) -> Result<Self> {
        let mut running = slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(operation) = running.as_ref() {
            return Err(SysError::Busy {
                operation: operation.clone(),
            });
        }

        *running = Some(request.to_string());
        Ok(Self {
            slot: Arc::clone(slot),
        })
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Completion handle for one submitted operation.
///
/// Yields exactly one [`OperationResult`].
#[derive(Debug)]
pub struct OperationHandle {
    request: LifecycleRequest,
    receiver: oneshot::Receiver<OperationResult>,
}

impl OperationHandle {
    pub fn request(&self) -> &LifecycleRequest {
        &self.request
    }

    /// Wait for the operation from async code.
    pub async fn wait(self) -> Result<OperationResult> {
        self.receiver.await.map_err(|_| SysError::WorkerLost)
    }

    /// Wait for the operation from a thread outside the runtime.
    ///
    /// Panics if called from within an async context, like
    /// [`oneshot::Receiver::blocking_recv`].
    pub fn blocking_wait(self) -> Result<OperationResult> {
        self.receiver.blocking_recv().map_err(|_| SysError::WorkerLost)
    }
}

/// Moves lifecycle operations onto tokio's blocking pool, one at a time.
#[derive(Clone)]
pub struct LifecycleExecutor {
    lifecycle: SnapshotLifecycle,
    slot: Slot,
    runtime: Handle,
}

impl LifecycleExecutor {
    /// `runtime` is where workers are spawned, so `run` can be called from
    /// threads that are not part of it.
    pub fn new(lifecycle: SnapshotLifecycle, runtime: Handle) -> Self {
        Self {
            lifecycle,
            slot: Arc::new(Mutex::new(None)),
            runtime,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.running().is_some()
    }

    /// Description of the outstanding operation, if any.
    pub fn running(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Start `request` on a background thread.
    ///
    /// Fails with [`SysError::Busy`] while another operation is outstanding.
    /// The slot is free again by the time the handle yields.
    pub fn run(&self, request: LifecycleRequest) -> Result<OperationHandle> {
        let guard = match SlotGuard::acquire(&self.slot, &request) {
            Ok(guard) => guard,
            Err(e) => {
                warn!(%request, "rejected: {e}");
                return Err(e);
            }
        };

        let (sender, receiver) = oneshot::channel();
        let lifecycle = self.lifecycle.clone();
        let task_request = request.clone();

        debug!(%request, "queueing on blocking pool");
        self.runtime.spawn_blocking(move || {
            info!(request = %task_request, "lifecycle operation started");
            let result = lifecycle.execute(&task_request);
            info!(request = %task_request, ok = result.ok, "lifecycle operation finished");

            drop(guard);
            if sender.send(result).is_err() {
                debug!(request = %task_request, "completion dropped, handle was discarded");
            }
        });

        Ok(OperationHandle { request, receiver })
    }
}
