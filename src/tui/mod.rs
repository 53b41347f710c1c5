//! Terminal client hosting the review widgets.
//!
//! The widgets in [`crate::widgets`] are plain state machines. This module
//! drives them from a bubbletea-rs program: key presses become widget input,
//! a periodic tick supplies the clock, and list requests run as async
//! commands against a [`ReviewProvider`].
//!
//! # Architecture
//!
//! The TUI follows the Model-View-Update (MVU) pattern:
//!
//! - **Model**: Application state in [`app::ReviewDeckApp`]
//! - **View**: String rendering in the app's `view()`
//! - **Update**: Message-driven state transitions in `handle_message()`
//!
//! # Initial Data Loading
//!
//! bubbletea-rs constructs the model through the static `Model::init()`, so
//! the decoded page and the provider are handed over through module-level
//! storage. Call [`set_initial_page`] and [`set_review_provider`] before
//! [`run`].

use std::io::{self, Write};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use bubbletea_rs::Program;

use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::error::ReviewError;
use crate::reviews::{ListMarkup, ReviewProvider, ReviewStats, SliderMarkup};

pub mod app;
pub mod input;
pub mod messages;
mod text;

pub use app::ReviewDeckApp;

static INITIAL_PAGE: OnceLock<InitialPage> = OnceLock::new();

static REVIEW_PROVIDER: OnceLock<Arc<dyn ReviewProvider>> = OnceLock::new();

/// Widget data decoded from the page, with configuration overrides applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialPage {
    /// Every slider on the page, in document order.
    pub sliders: Vec<SliderMarkup>,
    /// Every filterable list on the page, in document order.
    pub lists: Vec<ListMarkup>,
    /// Figures of every average widget on the page.
    pub stats: Vec<ReviewStats>,
    /// Deadline applied to every list request.
    pub request_timeout: Duration,
}

impl Default for InitialPage {
    fn default() -> Self {
        Self {
            sliders: Vec::new(),
            lists: Vec::new(),
            stats: Vec::new(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Stores the page data read by `ReviewDeckApp::init()`.
///
/// Returns `false` if a page was already stored.
#[must_use]
pub fn set_initial_page(page: InitialPage) -> bool {
    INITIAL_PAGE.set(page).is_ok()
}

/// Stores the provider used for filter and load-more requests.
///
/// Returns `false` if a provider was already stored.
#[must_use]
pub fn set_review_provider(provider: Arc<dyn ReviewProvider>) -> bool {
    REVIEW_PROVIDER.set(provider).is_ok()
}

/// Returns a copy of the stored page, or an empty page when none was set.
pub(crate) fn initial_page() -> InitialPage {
    INITIAL_PAGE.get().cloned().unwrap_or_default()
}

pub(crate) fn review_provider() -> Option<Arc<dyn ReviewProvider>> {
    REVIEW_PROVIDER.get().cloned()
}

/// Runs the terminal client until the user quits.
///
/// # Errors
///
/// Returns [`ReviewError::Io`] when the terminal program fails to start or
/// exits abnormally.
pub async fn run() -> Result<(), ReviewError> {
    let program = Program::<ReviewDeckApp>::builder()
        .alt_screen(true)
        .build()
        .map_err(|error| ReviewError::Io {
            message: format!("TUI error: {error}"),
        })?;

    program.run().await.map_err(|error| ReviewError::Io {
        message: format!("TUI error: {error}"),
    })?;

    io::stdout().flush().ok();
    Ok(())
}
