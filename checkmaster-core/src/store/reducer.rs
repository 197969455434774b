//! Pure state transition function.
//!
//! `reduce` folds one action into the next state snapshot, and `transition`
//! pairs it with the effects the action calls for. Neither function performs
//! I/O, reads the clock, or panics: every action is handled, and an action
//! naming an absent product leaves the list untouched.

use super::action::Action;
use super::effect::Effect;
use super::state::ProductState;

/// Result of a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub state: ProductState,
    /// Effects to execute.
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ProductState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }
}

/// Fold an action into the next state.
pub fn reduce(state: ProductState, action: Action) -> ProductState {
    match action {
        Action::LoadRequested { .. } => ProductState {
            loading: true,
            ..state
        },

        // Full replacement: whatever was listed before is discarded
        Action::LoadSucceeded { products } => ProductState {
            products,
            loading: false,
            ..state
        },

        Action::LoadMoreRequested { .. } => ProductState {
            loading_more: true,
            ..state
        },

        Action::LoadMoreSucceeded { products } => {
            let ProductState {
                products: mut all,
                loading,
                ..
            } = state;
            all.extend(products);
            ProductState {
                products: all,
                loading,
                loading_more: false,
            }
        }

        Action::StatusUpdateRequested { product } => ProductState {
            products: state
                .products
                .into_iter()
                .map(|existing| {
                    if existing.id == product.id {
                        product.clone()
                    } else {
                        existing
                    }
                })
                .collect(),
            ..state
        },

        Action::DeleteRequested { id } => {
            let mut next = state;
            next.products.retain(|p| p.id != id);
            next
        }
    }
}

/// Pure state transition function.
///
/// Given the current state and an action, returns the new state and the
/// effects to execute. Load requests produce a fetch; every list-changing
/// action produces the matching snapshot effect.
pub fn transition(state: ProductState, action: Action) -> TransitionResult {
    let mut effects = Vec::new();

    if let Some(request) = action.fetch_request() {
        effects.push(Effect::FetchProducts { request });
    }

    match &action {
        Action::StatusUpdateRequested { product } => effects.push(Effect::UpdateSnapshot {
            product: product.clone(),
        }),
        Action::DeleteRequested { id } => effects.push(Effect::DeleteSnapshot { id: *id }),
        _ => {}
    }

    let replaces_list = matches!(
        action,
        Action::LoadSucceeded { .. } | Action::LoadMoreSucceeded { .. }
    );

    let state = reduce(state, action);

    if replaces_list {
        effects.push(Effect::SaveSnapshot {
            products: state.products.clone(),
        });
    }

    TransitionResult::new(state, effects)
}
