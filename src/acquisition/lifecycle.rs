// Copyright (c) 2026 rigdaq project
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/rigdaq/rigdaq

//! Start/stop coordination for the poller generations

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Acquisition lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Idle,
    Running,
    Stopping,
}

/// Handle for one generation of pollers
///
/// Carries the generation's cancellation channel; every worker subscribes
/// and exits when the signal fires.
#[derive(Debug, Clone)]
pub struct RunToken {
    generation: u64,
    shutdown: broadcast::Sender<()>,
}

impl RunToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown.subscribe()
    }
}

struct Inner {
    state: LifecycleState,
    generation: u64,
    shutdown: Option<broadcast::Sender<()>>,
}

/// Owns the invariant "at most one active generation of pollers"
pub struct LifecycleController {
    inner: Mutex<Inner>,
}

impl LifecycleController {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: LifecycleState::Idle,
                generation: 0,
                shutdown: None,
            }),
        }
    }

    /// Begin a new generation. Returns `None` while a generation is still
    /// running or draining; a duplicate start never spawns twice.
    pub fn start(&self) -> Option<RunToken> {
        let mut inner = self.inner.lock();
        if inner.state != LifecycleState::Idle {
            debug!("start requested while {:?}; ignoring", inner.state);
            return None;
        }
        inner.generation += 1;
        let (tx, _) = broadcast::channel(4);
        inner.shutdown = Some(tx.clone());
        inner.state = LifecycleState::Running;
        info!("lifecycle running (generation {})", inner.generation);
        Some(RunToken {
            generation: inner.generation,
            shutdown: tx,
        })
    }

    /// Broadcast cancellation. Idempotent, never blocks; pollers observe
    /// within one poll interval.
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        if inner.state != LifecycleState::Running {
            return;
        }
        inner.state = LifecycleState::Stopping;
        if let Some(tx) = &inner.shutdown {
            let _ = tx.send(());
        }
        info!("lifecycle stopping (generation {})", inner.generation);
    }

    /// Called by the poller supervisor once every worker of `generation`
    /// has exited. Confirmations from stale generations are ignored.
    pub fn confirm_idle(&self, generation: u64) {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return;
        }
        inner.state = LifecycleState::Idle;
        inner.shutdown = None;
        debug!("lifecycle idle (generation {generation})");
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }
}

impl Default for LifecycleController {
    fn default() -> Self {
        Self::new()
    }
}
