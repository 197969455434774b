//! Reviewer intents.
//!
//! Checking "approve" or "reject" sets the decision; unchecking it sends the
//! product back to pending.

use super::action::Action;
use crate::product::{Product, ReviewStatus};

pub fn approve(product: &Product, approved: bool) -> Action {
    decide(product, approved, ReviewStatus::Approved)
}

pub fn reject(product: &Product, rejected: bool) -> Action {
    decide(product, rejected, ReviewStatus::Rejected)
}

/// Return a product to pending regardless of its current decision.
pub fn reset(product: &Product) -> Action {
    decide(product, false, ReviewStatus::Pending)
}

fn decide(product: &Product, checked: bool, decision: ReviewStatus) -> Action {
    let status = if checked {
        decision
    } else {
        ReviewStatus::Pending
    };
    Action::StatusUpdateRequested {
        product: product.with_status(status),
    }
}
