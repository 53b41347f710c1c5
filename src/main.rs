//! Reviewdeck CLI entrypoint: loads a page embedding the review widgets and
//! opens them in the terminal.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use ortho_config::OrthoConfig;
use reviewdeck::reviews::{fetch_page, resolve_endpoint};
use reviewdeck::tui::{self, InitialPage};
use reviewdeck::{
    AjaxReviewGateway, JsonlTelemetrySink, PageContract, ReviewDeckConfig, ReviewError,
    TelemetrySink, TracingTelemetrySink, init_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ReviewError> {
    let config = load_config()?;
    config.validate()?;
    init_tracing(config.log_file())?;

    let page_url = config.require_page_url()?;
    let timeout = config.request_timeout()?;
    let html = fetch_page(&page_url, timeout).await?;
    let contract = PageContract::parse(&html);

    let nonce = config
        .nonce
        .clone()
        .or_else(|| contract.ajax.as_ref().map(|ajax| ajax.nonce.clone()))
        .filter(|nonce| !nonce.trim().is_empty())
        .ok_or(ReviewError::MissingNonce)?;
    let ajax_url = config
        .ajax_url
        .as_deref()
        .or_else(|| contract.ajax.as_ref().map(|ajax| ajax.ajax_url.as_str()));
    let endpoint = resolve_endpoint(&page_url, ajax_url)?;
    let gateway = AjaxReviewGateway::new(endpoint, nonce, timeout)?
        .with_telemetry(telemetry_sink(&config)?);

    let page = InitialPage {
        sliders: contract
            .sliders
            .into_iter()
            .map(|mut slider| {
                slider.settings = config.slider_settings(slider.settings);
                slider
            })
            .collect(),
        lists: contract
            .lists
            .into_iter()
            .map(|list| config.list_markup(list))
            .collect::<Result<_, _>>()?,
        stats: contract.stats,
        request_timeout: timeout,
    };
    tracing::info!(
        url = %page_url,
        sliders = page.sliders.len(),
        lists = page.lists.len(),
        averages = page.stats.len(),
        stale_lists = page.lists.iter().filter(|list| list.stale).count(),
        "page loaded"
    );

    if !tui::set_initial_page(page) || !tui::set_review_provider(Arc::new(gateway)) {
        tracing::warn!("TUI state was already initialised; keeping the earlier page");
    }

    tui::run().await
}

/// Chooses where review request telemetry goes.
///
/// # Errors
///
/// Returns [`ReviewError::Io`] when the telemetry file cannot be opened.
fn telemetry_sink(config: &ReviewDeckConfig) -> Result<Arc<dyn TelemetrySink>, ReviewError> {
    let Some(path) = config.telemetry_file() else {
        return Ok(Arc::new(TracingTelemetrySink));
    };
    Ok(Arc::new(JsonlTelemetrySink::open(path)?))
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<ReviewDeckConfig, ReviewError> {
    ReviewDeckConfig::load().map_err(|error| ReviewError::Configuration {
        message: error.to_string(),
    })
}
