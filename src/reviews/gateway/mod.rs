//! Providers that deliver filtered review pages.
//!
//! The list widget talks to a [`ReviewProvider`] rather than to HTTP directly,
//! so tests can script responses while the [`AjaxReviewGateway`] handles the
//! plugin's `admin-ajax.php` endpoints in production.

mod ajax;

pub use ajax::{AjaxReviewGateway, DEFAULT_AJAX_PATH, fetch_page, resolve_endpoint};

use async_trait::async_trait;

use crate::error::ReviewError;

use super::models::{FilterRequest, LoadMoreRequest, ReviewPage};

/// Source of filtered, paged review cards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewProvider: Send + Sync {
    /// Fetches the first page for a rating filter.
    async fn filter(&self, request: &FilterRequest) -> Result<ReviewPage, ReviewError>;

    /// Fetches the page starting at `request.offset`.
    async fn load_more(&self, request: &LoadMoreRequest) -> Result<ReviewPage, ReviewError>;
}

#[cfg(test)]
mod tests;
