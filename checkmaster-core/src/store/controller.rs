//! The controller that owns the product state.
//!
//! `ProductStore` is the only place `ProductState` lives. Callers hold it by
//! `&mut` and talk to it exclusively through `dispatch`; there is no shared
//! mutable state and no lock around the state. Fetches run as independent
//! tasks, and their results are folded back in the order they finish.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{self, JoinSet};
use tracing::{debug, error, info, warn};

use super::action::Action;
use super::effect::{Effect, FetchRequest};
use super::interpreter::{execute_fetch, execute_snapshot_effect, FetchCompletion, FetchReport};
use super::reducer::{transition, TransitionResult};
use super::state::ProductState;
use crate::config::Config;
use crate::snapshot::SnapshotStore;
use crate::source::{ProductSource, SourceError};

/// Behavior switches for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Mirror list changes into the snapshot store when one is attached.
    pub sync_snapshot: bool,
    /// Skip launching a fetch identical to one still in flight.
    pub dedupe_in_flight: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            sync_snapshot: true,
            dedupe_in_flight: false,
        }
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            sync_snapshot: config.sync_snapshot,
            dedupe_in_flight: config.dedupe_in_flight,
        }
    }
}

/// Single owner of the product state.
pub struct ProductStore {
    state: ProductState,
    source: Arc<dyn ProductSource>,
    snapshot: Option<SnapshotStore>,
    options: StoreOptions,
    tasks: JoinSet<FetchCompletion>,
    /// Requests still in flight, keyed by the task running them.
    in_flight: HashMap<task::Id, FetchRequest>,
    publisher: watch::Sender<ProductState>,
}

impl ProductStore {
    pub fn new(source: Arc<dyn ProductSource>) -> Self {
        let (publisher, _) = watch::channel(ProductState::default());
        Self {
            state: ProductState::default(),
            source,
            snapshot: None,
            options: StoreOptions::default(),
            tasks: JoinSet::new(),
            in_flight: HashMap::new(),
            publisher,
        }
    }

    /// Attach a snapshot store to mirror list changes into.
    pub fn with_snapshot(mut self, snapshot: SnapshotStore) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Current state snapshot.
    pub fn state(&self) -> &ProductState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&SnapshotStore> {
        self.snapshot.as_ref()
    }

    /// Receive every state published after a dispatch.
    pub fn subscribe(&self) -> watch::Receiver<ProductState> {
        self.publisher.subscribe()
    }

    /// Number of fetches still running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Fold an action into state and launch whatever effects it calls for.
    ///
    /// Must be called from within a tokio runtime, since load requests spawn
    /// their fetch immediately.
    pub fn dispatch(&mut self, action: Action) {
        debug!("Dispatching {}", action.log_summary());

        let current = std::mem::take(&mut self.state);
        let TransitionResult { state, effects } = transition(current, action);
        self.state = state;

        for effect in effects {
            self.run_effect(effect);
        }

        self.publisher.send_replace(self.state.clone());
    }

    fn run_effect(&mut self, effect: Effect) {
        if effect.is_snapshot() {
            self.mirror_to_snapshot(&effect);
        } else if let Effect::FetchProducts { request } = effect {
            self.launch_fetch(request);
        }
    }

    fn mirror_to_snapshot(&self, effect: &Effect) {
        if !self.options.sync_snapshot {
            return;
        }
        let Some(store) = &self.snapshot else {
            return;
        };
        // Best-effort cache: in-memory state stays authoritative
        if let Err(e) = execute_snapshot_effect(store, effect) {
            warn!("Snapshot sync failed, keeping state in memory only: {}", e);
        }
    }

    fn launch_fetch(&mut self, request: FetchRequest) {
        if self.options.dedupe_in_flight && self.in_flight.values().any(|r| *r == request) {
            debug!(
                "Skipping duplicate {:?} fetch at offset {} (already in flight)",
                request.kind, request.offset
            );
            return;
        }

        let source = self.source.clone();
        let handle = self
            .tasks
            .spawn(async move { execute_fetch(source.as_ref(), request).await });
        self.in_flight.insert(handle.id(), request);
    }

    /// Wait for the next fetch to finish and fold its result into state.
    ///
    /// Returns `None` once nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<FetchReport> {
        let (report, action) = loop {
            match self.tasks.join_next_with_id().await? {
                Ok((id, completion)) => {
                    self.in_flight.remove(&id);
                    break completion.into_parts();
                }
                Err(join_error) => {
                    // A panicked fetch still owes its request a follow-up action
                    let Some(request) = self.in_flight.remove(&join_error.id()) else {
                        error!("Untracked fetch task failed: {}", join_error);
                        continue;
                    };
                    error!(
                        "Fetch task for offset {} did not complete: {}",
                        request.offset, join_error
                    );
                    let completion = FetchCompletion {
                        request,
                        result: Err(SourceError::Task {
                            message: join_error.to_string(),
                        }),
                    };
                    break completion.into_parts();
                }
            }
        };

        self.dispatch(action);
        Some(report)
    }

    /// Drain every in-flight fetch, folding results in arrival order.
    pub async fn settle(&mut self) -> Vec<FetchReport> {
        let mut reports = Vec::new();
        while let Some(report) = self.next_completion().await {
            reports.push(report);
        }
        reports
    }

    /// Replace the list with whatever the snapshot store holds.
    ///
    /// A corrupted snapshot is reset to empty. Returns the number of products
    /// restored; zero when no snapshot store is attached.
    pub fn restore_from_snapshot(&mut self) -> usize {
        let Some(store) = &self.snapshot else {
            return 0;
        };
        let products = store.list_or_reset();
        let count = products.len();
        info!("Restoring {} products from snapshot", count);
        self.dispatch(Action::LoadSucceeded { products });
        count
    }
}
