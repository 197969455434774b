//! Unidirectional state pipeline for product moderation.
//!
//! The pipeline separates:
//! - **State**: What the reviewer sees (`ProductState`)
//! - **Actions**: What was requested or what happened (`Action`)
//! - **Effects**: What to do outside the state (`Effect`)
//! - **Transition**: Pure function `(State, Action) -> (State, Vec<Effect>)`
//!
//! The interpreter executes effects against the product source and the
//! snapshot store, and the controller (`ProductStore`) owns the single state
//! instance and folds every result back in.

pub mod action;
pub mod controller;
pub mod effect;
pub mod interpreter;
pub mod pagination;
pub mod reducer;
pub mod review;
pub mod selectors;
pub mod state;

pub use action::*;
pub use controller::{ProductStore, StoreOptions};
pub use effect::*;
pub use interpreter::{FetchCompletion, FetchReport};
pub use pagination::Paginator;
pub use reducer::*;
pub use state::*;
