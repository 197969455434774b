//! Effects (side effects as data).
//!
//! Effects describe what should happen as a result of a state transition.
//! They are pure data - the interpreter executes them against the product
//! source and the snapshot store. This separation enables testing the
//! transition logic without any I/O.

use super::action::Action;
use crate::product::{Product, ProductId};

/// Which half of the pagination flow a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    /// First page: the result replaces the list.
    Initial,
    /// Further page: the result is appended to the list.
    More,
}

/// A single page request against the product source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub kind: FetchKind,
    pub limit: usize,
    pub offset: usize,
}

impl FetchRequest {
    /// The follow-up action that folds a fetched page into state.
    pub fn success_action(&self, products: Vec<Product>) -> Action {
        match self.kind {
            FetchKind::Initial => Action::LoadSucceeded { products },
            FetchKind::More => Action::LoadMoreSucceeded { products },
        }
    }
}

/// All effects that can be produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    // =========================================================================
    // Source Effects
    // =========================================================================
    /// Fetch a page from the product source.
    FetchProducts { request: FetchRequest },

    // =========================================================================
    // Snapshot Effects
    // =========================================================================
    /// Overwrite the cached list with the current product list.
    SaveSnapshot { products: Vec<Product> },

    /// Replace a cached product by id (no-op if it isn't cached).
    UpdateSnapshot { product: Product },

    /// Remove a cached product by id.
    DeleteSnapshot { id: ProductId },
}

impl Effect {
    /// Returns true for effects that only mirror state into the snapshot store.
    ///
    /// These are best-effort: the controller skips them entirely when no
    /// snapshot store is attached or syncing is disabled.
    pub fn is_snapshot(&self) -> bool {
        matches!(
            self,
            Effect::SaveSnapshot { .. } | Effect::UpdateSnapshot { .. } | Effect::DeleteSnapshot { .. }
        )
    }
}
