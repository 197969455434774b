//! Actions that trigger state transitions.
//!
//! Actions are either intents from the front end (load a page, change a
//! status, delete a product) or results fed back by the interpreter once a
//! fetch completes. They are inputs to the pure transition function.

use super::effect::{FetchKind, FetchRequest};
use crate::product::{Product, ProductId};

/// All actions that can be dispatched to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // =========================================================================
    // Initial Page
    // =========================================================================
    /// Replace the list with a freshly fetched page.
    LoadRequested { limit: usize, offset: usize },

    /// A first-page fetch finished. Carries an empty list if the fetch failed.
    LoadSucceeded { products: Vec<Product> },

    // =========================================================================
    // Further Pages
    // =========================================================================
    /// Append another page to the list.
    LoadMoreRequested { limit: usize, offset: usize },

    /// A further-page fetch finished. Carries an empty list if the fetch failed.
    LoadMoreSucceeded { products: Vec<Product> },

    // =========================================================================
    // Review Decisions
    // =========================================================================
    /// Replace the product with the same id by this one.
    StatusUpdateRequested { product: Product },

    /// Drop the product with this id from the list.
    DeleteRequested { id: ProductId },
}

impl Action {
    /// The fetch this action asks for, if it is a load request.
    pub fn fetch_request(&self) -> Option<FetchRequest> {
        match self {
            Action::LoadRequested { limit, offset } => Some(FetchRequest {
                kind: FetchKind::Initial,
                limit: *limit,
                offset: *offset,
            }),
            Action::LoadMoreRequested { limit, offset } => Some(FetchRequest {
                kind: FetchKind::More,
                limit: *limit,
                offset: *offset,
            }),
            _ => None,
        }
    }

    /// Returns a summary of the action suitable for logging.
    ///
    /// Product lists are reduced to their ids so descriptions never end up in logs.
    pub fn log_summary(&self) -> String {
        match self {
            Action::LoadRequested { limit, offset } => {
                format!("LoadRequested {{ limit: {}, offset: {} }}", limit, offset)
            }
            Action::LoadSucceeded { products } => {
                format!("LoadSucceeded {{ ids: {} }}", summarize_ids(products))
            }
            Action::LoadMoreRequested { limit, offset } => {
                format!(
                    "LoadMoreRequested {{ limit: {}, offset: {} }}",
                    limit, offset
                )
            }
            Action::LoadMoreSucceeded { products } => {
                format!("LoadMoreSucceeded {{ ids: {} }}", summarize_ids(products))
            }
            Action::StatusUpdateRequested { product } => format!(
                "StatusUpdateRequested {{ id: {}, status: {} }}",
                product.id, product.status
            ),
            Action::DeleteRequested { id } => format!("DeleteRequested {{ id: {} }}", id),
        }
    }
}

fn summarize_ids(products: &[Product]) -> String {
    match products {
        [] => "[]".to_string(),
        [only] => format!("[{}]", only.id),
        [first, .., last] => format!("[{}..{}] ({} items)", first.id, last.id, products.len()),
    }
}
