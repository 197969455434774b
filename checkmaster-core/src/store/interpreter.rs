//! Effect interpreter that executes effects against the source and snapshot.
//!
//! The interpreter is the boundary between the pure transition function and
//! the impure world of I/O. Fetches run on their own tasks and come back as
//! a `FetchCompletion`; snapshot effects run inline because the snapshot
//! store is synchronous.

use tracing::{debug, warn};

use super::action::Action;
use super::effect::{Effect, FetchRequest};
use crate::product::Product;
use crate::snapshot::{SnapshotError, SnapshotStore};
use crate::source::{ProductSource, SourceError};

/// Outcome of one fetch, before it is folded into state.
#[derive(Debug)]
pub struct FetchCompletion {
    pub request: FetchRequest,
    pub result: Result<Vec<Product>, SourceError>,
}

impl FetchCompletion {
    /// Split into the report handed to the caller and the action folded into state.
    ///
    /// A failed fetch still produces its success action, carrying an empty
    /// page, so `loading`/`loading_more` always settle.
    pub fn into_parts(self) -> (FetchReport, Action) {
        match self.result {
            Ok(products) => {
                let report = FetchReport {
                    request: self.request,
                    outcome: Ok(products.len()),
                };
                (report, self.request.success_action(products))
            }
            Err(error) => {
                let report = FetchReport {
                    request: self.request,
                    outcome: Err(error),
                };
                (report, self.request.success_action(Vec::new()))
            }
        }
    }
}

/// What happened to a fetch, returned to whoever drives the store.
///
/// State never records failures; this is the only place the failure kind
/// surfaces, so the front end can decide whether to offer a retry.
#[derive(Debug)]
pub struct FetchReport {
    pub request: FetchRequest,
    /// Number of products delivered, or why none were.
    pub outcome: Result<usize, SourceError>,
}

impl FetchReport {
    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Fetch a page from the product source.
pub async fn execute_fetch(source: &dyn ProductSource, request: FetchRequest) -> FetchCompletion {
    debug!(
        "Fetching {:?} page: limit {}, offset {}",
        request.kind, request.limit, request.offset
    );

    let result = source.fetch(request.limit, request.offset).await;

    match &result {
        Ok(products) => debug!(
            "Fetched {} products at offset {}",
            products.len(),
            request.offset
        ),
        Err(e) => warn!(
            "Fetch at offset {} failed, folding an empty page: {}",
            request.offset, e
        ),
    }

    FetchCompletion { request, result }
}

/// Apply a snapshot effect to the store.
///
/// Non-snapshot effects are ignored here; the controller routes fetches
/// elsewhere.
pub fn execute_snapshot_effect(
    store: &SnapshotStore,
    effect: &Effect,
) -> Result<(), SnapshotError> {
    match effect {
        Effect::SaveSnapshot { products } => store.save(products),
        Effect::UpdateSnapshot { product } => store.update(product),
        Effect::DeleteSnapshot { id } => store.delete(*id),
        Effect::FetchProducts { .. } => Ok(()),
    }
}
