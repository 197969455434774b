//! State snapshot owned by the controller.

use crate::product::Product;

/// Everything the front end renders: the product list and whether a first
/// page or a further page is still being fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductState {
    pub products: Vec<Product>,
    pub loading: bool,
    pub loading_more: bool,
}

impl ProductState {
    /// Returns true while any fetch is outstanding.
    pub fn is_busy(&self) -> bool {
        self.loading || self.loading_more
    }
}
