//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.reviewdeck.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `REVIEWDECK_PAGE_URL`, `REVIEWDECK_NONCE`,
//!    and so on
//! 4. **Command-line arguments** – `--page-url`/`-u`, `--columns`/`-c`, ...
//!
//! Values read from the page itself (slider settings, list attributes, the
//! AJAX nonce) sit below every layer: any configured value overrides them.
//!
//! # Configuration File
//!
//! ```toml
//! page_url = "https://salon.example/reviews/"
//! per_page = 10
//! columns = 2
//! default_ratings = "5,4"
//! request_timeout_secs = 20
//! log_file = "reviewdeck.log"
//! telemetry_file = "reviewdeck-telemetry.jsonl"
//! ```

use std::path::Path;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ReviewError;
use crate::reviews::{ListMarkup, RatingSet, SliderSettings};

/// Request timeout applied when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `REVIEWDECK_PAGE_URL` or `--page-url`: page embedding the widgets
/// - `REVIEWDECK_AJAX_URL` or `--ajax-url`: AJAX endpoint override
/// - `REVIEWDECK_NONCE` or `--nonce`: request nonce override
/// - `REVIEWDECK_STAFF_ID` / `REVIEWDECK_PER_PAGE`: list overrides
/// - `REVIEWDECK_COLUMNS` / `REVIEWDECK_AUTOPLAY_SPEED_MS`: slider overrides
///
/// # Example
///
/// ```no_run
/// use reviewdeck::ReviewDeckConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = ReviewDeckConfig::load().expect("failed to load configuration");
/// let page_url = config.require_page_url().expect("page URL required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "REVIEWDECK",
    discovery(
        dotfile_name = ".reviewdeck.toml",
        config_file_name = "reviewdeck.toml",
        app_name = "reviewdeck"
    )
)]
pub struct ReviewDeckConfig {
    /// URL of the page embedding the review shortcodes.
    ///
    /// Can be provided via:
    /// - CLI: `--page-url <URL>` or `-u <URL>`
    /// - Environment: `REVIEWDECK_PAGE_URL`
    /// - Config file: `page_url = "..."`
    #[ortho_config(cli_short = 'u')]
    pub page_url: Option<String>,

    /// AJAX endpoint, absolute or relative to the page URL.
    ///
    /// Defaults to the `ajax_url` published on the page, then to
    /// `/wp-admin/admin-ajax.php`.
    #[ortho_config()]
    pub ajax_url: Option<String>,

    /// Request nonce, overriding the one published on the page.
    #[ortho_config()]
    pub nonce: Option<String>,

    /// Staff member whose reviews the list shows (`0` for everyone).
    #[ortho_config()]
    pub staff_id: Option<u64>,

    /// Number of reviews per list page.
    #[ortho_config(cli_short = 'p')]
    pub per_page: Option<u32>,

    /// Slider columns, overriding the slider configuration on the page.
    #[ortho_config(cli_short = 'c')]
    pub columns: Option<u32>,

    /// Disables slider autoplay even when the page enables it.
    ///
    /// Can be provided via:
    /// - CLI: `--no-autoplay`
    /// - Config file: `no_autoplay = true`
    ///
    /// Note: `REVIEWDECK_NO_AUTOPLAY` is not supported because `ortho_config`
    /// does not load boolean values from the environment.
    #[ortho_config()]
    pub no_autoplay: bool,

    /// Slider autoplay interval in milliseconds.
    #[ortho_config()]
    pub autoplay_speed_ms: Option<u64>,

    /// Ratings initially selected in the list filter, as a comma list such
    /// as `"5,4"`. Replaces the checkboxes checked on the page.
    #[ortho_config(cli_short = 'r')]
    pub default_ratings: Option<String>,

    /// Seconds to wait for any single HTTP request.
    #[ortho_config()]
    pub request_timeout_secs: u64,

    /// File receiving diagnostic logs. Logging is discarded when unset.
    #[ortho_config(cli_short = 'l')]
    pub log_file: Option<String>,

    /// File receiving review request telemetry as JSON lines. Telemetry goes
    /// to the diagnostic log when unset.
    #[ortho_config()]
    pub telemetry_file: Option<String>,
}

impl Default for ReviewDeckConfig {
    fn default() -> Self {
        Self {
            page_url: None,
            ajax_url: None,
            nonce: None,
            staff_id: None,
            per_page: None,
            columns: None,
            no_autoplay: false,
            autoplay_speed_ms: None,
            default_ratings: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_file: None,
            telemetry_file: None,
        }
    }
}

impl ReviewDeckConfig {
    /// Returns the page URL or an error if it is missing or malformed.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when no URL is configured and
    /// [`ReviewError::InvalidUrl`] when it is not an HTTP(S) URL.
    pub fn require_page_url(&self) -> Result<Url, ReviewError> {
        let raw = self
            .page_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ReviewError::Configuration {
                message: "page URL is required (use --page-url or -u)".to_owned(),
            })?;
        let url = Url::parse(raw).map_err(|error| ReviewError::InvalidUrl(format!("{raw}: {error}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ReviewError::InvalidUrl(format!(
                "{raw}: page URL must use http or https"
            )));
        }
        Ok(url)
    }

    /// Parses `default_ratings`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when the list names a rating
    /// outside 1 to 5.
    pub fn parsed_default_ratings(&self) -> Result<Option<RatingSet>, ReviewError> {
        self.default_ratings
            .as_deref()
            .map(RatingSet::parse)
            .transpose()
    }

    /// Returns the per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when the timeout is zero.
    pub fn request_timeout(&self) -> Result<Duration, ReviewError> {
        if self.request_timeout_secs == 0 {
            return Err(ReviewError::Configuration {
                message: "request_timeout_secs must be at least 1".to_owned(),
            });
        }
        Ok(Duration::from_secs(self.request_timeout_secs))
    }

    /// Returns the configured log file, if any.
    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(Path::new)
    }

    /// Returns the configured telemetry file, if any.
    #[must_use]
    pub fn telemetry_file(&self) -> Option<&Path> {
        self.telemetry_file
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(Path::new)
    }

    /// Validates that the configured values are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] for zero page sizes, column
    /// counts, or autoplay intervals, for an out-of-range rating list, and
    /// for a zero request timeout.
    pub fn validate(&self) -> Result<(), ReviewError> {
        let zero_field = [
            ("per_page", self.per_page.map(u64::from)),
            ("columns", self.columns.map(u64::from)),
            ("autoplay_speed_ms", self.autoplay_speed_ms),
        ]
        .into_iter()
        .find_map(|(name, value)| (value == Some(0)).then_some(name));
        if let Some(name) = zero_field {
            return Err(ReviewError::Configuration {
                message: format!("{name} must be at least 1"),
            });
        }
        self.parsed_default_ratings()?;
        self.request_timeout()?;
        Ok(())
    }

    /// Applies the slider overrides to the settings read from the page.
    #[must_use]
    pub fn slider_settings(&self, page: SliderSettings) -> SliderSettings {
        SliderSettings {
            columns: self.columns.unwrap_or(page.columns),
            autoplay: page.autoplay && !self.no_autoplay,
            autoplay_speed_ms: self.autoplay_speed_ms.unwrap_or(page.autoplay_speed_ms),
        }
    }

    /// Applies the list overrides to the list read from the page.
    ///
    /// When an override changes the staff filter, the page size, or the
    /// selected ratings, the server-rendered cards describe a different
    /// query: the result is marked [`ListMarkup::stale`] so the list
    /// refetches its first page instead of showing them.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when `default_ratings` does not
    /// parse.
    pub fn list_markup(&self, page: ListMarkup) -> Result<ListMarkup, ReviewError> {
        let staff_id = self.staff_id.unwrap_or(page.staff_id);
        let per_page = self.per_page.unwrap_or(page.per_page);
        let selected = self.parsed_default_ratings()?.unwrap_or(page.selected);
        let stale = page.stale
            || staff_id != page.staff_id
            || per_page != page.per_page
            || selected != page.selected;

        Ok(ListMarkup {
            staff_id,
            per_page,
            selected,
            stale,
            ..page
        })
    }
}

#[cfg(test)]
mod tests;
