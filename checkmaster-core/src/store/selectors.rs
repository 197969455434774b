//! Derived views over `ProductState`.
//!
//! Selectors are recomputed from the state on every call and never cache, so
//! they always reflect the latest dispatch.

use super::state::ProductState;
use crate::product::{Product, ProductId, ReviewStatus};

/// Products with a decision (approved or rejected), in list order.
pub fn reviewed_products(state: &ProductState) -> Vec<&Product> {
    state
        .products
        .iter()
        .filter(|p| p.status.is_reviewed())
        .collect()
}

/// The default list view: every product, in list order.
pub fn pending_products(state: &ProductState) -> Vec<&Product> {
    state.products.iter().collect()
}

/// Products still waiting for a decision, in list order.
pub fn awaiting_review(state: &ProductState) -> Vec<&Product> {
    state
        .products
        .iter()
        .filter(|p| p.status == ReviewStatus::Pending)
        .collect()
}

pub fn find_product(state: &ProductState, id: ProductId) -> Option<&Product> {
    state.products.iter().find(|p| p.id == id)
}

/// Per-status tally of the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl ReviewCounts {
    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}

pub fn review_counts(state: &ProductState) -> ReviewCounts {
    state
        .products
        .iter()
        .fold(ReviewCounts::default(), |mut counts, p| {
            match p.status {
                ReviewStatus::Pending => counts.pending += 1,
                ReviewStatus::Approved => counts.approved += 1,
                ReviewStatus::Rejected => counts.rejected += 1,
            }
            counts
        })
}
