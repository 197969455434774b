//! Pagination driver.
//!
//! The upstream has no cursor, so the driver keeps its own offset. The offset
//! moves as soon as a further page is requested, whether or not that fetch
//! later succeeds; a failed page therefore leaves a gap. `advance` is the only
//! place the offset changes.

use super::action::Action;
use crate::config::Config;

pub const DEFAULT_FIRST_PAGE_SIZE: usize = 10;
pub const DEFAULT_PAGE_SIZE: usize = 7;

/// Offset counter producing load actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    first_page_size: usize,
    page_size: usize,
    offset: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_FIRST_PAGE_SIZE, DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(first_page_size: usize, page_size: usize) -> Self {
        Self {
            first_page_size,
            page_size,
            offset: first_page_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.first_page_size, config.page_size)
    }

    /// Offset the next further page will be requested at.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Request for the first page. Rewinds the offset to just past it.
    pub fn initial_request(&mut self) -> Action {
        self.offset = self.first_page_size;
        Action::LoadRequested {
            limit: self.first_page_size,
            offset: 0,
        }
    }

    /// Request for the next page, advancing the offset immediately.
    pub fn advance(&mut self) -> Action {
        let action = Action::LoadMoreRequested {
            limit: self.page_size,
            offset: self.offset,
        };
        self.offset = self.offset.saturating_add(self.page_size);
        action
    }

    /// Continue paging after `loaded` products that are already listed,
    /// e.g. when a session was restored from the snapshot.
    pub fn resume_after(&mut self, loaded: usize) {
        self.offset = loaded;
    }
}
