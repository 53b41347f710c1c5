//! HTTP implementation of [`ReviewProvider`] over the plugin's AJAX actions.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::ReviewError;
use crate::reviews::markup::parse_fragment;
use crate::reviews::models::{FilterRequest, LoadMoreRequest, RatingSet, ReviewPage};
use crate::telemetry::{NoopTelemetrySink, RequestKind, TelemetryEvent, TelemetrySink};

use super::ReviewProvider;

/// Path of the WordPress AJAX handler relative to the site root.
pub const DEFAULT_AJAX_PATH: &str = "/wp-admin/admin-ajax.php";

const FILTER_ACTION: &str = "bpr_filter_reviews";
const LOAD_MORE_ACTION: &str = "bpr_load_more_reviews";
const ERROR_BODY_LIMIT: usize = 160;

type Form = Vec<(&'static str, String)>;

/// Resolves the AJAX endpoint against the page it was published on.
///
/// Relative URLs are joined onto `page_url`; without an explicit URL the
/// WordPress default path is used.
///
/// # Errors
///
/// Returns [`ReviewError::InvalidUrl`] when the join fails.
pub fn resolve_endpoint(page_url: &Url, ajax_url: Option<&str>) -> Result<Url, ReviewError> {
    let target = ajax_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_AJAX_PATH);
    page_url
        .join(target)
        .map_err(|error| ReviewError::InvalidUrl(format!("{target}: {error}")))
}

/// Downloads the page that embeds the review widgets.
///
/// # Errors
///
/// Returns [`ReviewError::Timeout`] or [`ReviewError::Network`] when the page
/// cannot be fetched, including non-success statuses.
pub async fn fetch_page(page_url: &Url, timeout: Duration) -> Result<String, ReviewError> {
    let client = build_client(timeout)?;
    let response = client
        .get(page_url.clone())
        .send()
        .await
        .map_err(|error| map_transport_error(&error, timeout))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ReviewError::Network {
            message: format!("fetching {page_url} returned status {}", status.as_u16()),
        });
    }

    response
        .text()
        .await
        .map_err(|error| map_transport_error(&error, timeout))
}

/// Review provider that posts to `admin-ajax.php`.
#[derive(Clone)]
pub struct AjaxReviewGateway {
    client: Client,
    endpoint: Url,
    nonce: String,
    timeout: Duration,
    telemetry: Arc<dyn TelemetrySink>,
}

impl fmt::Debug for AjaxReviewGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AjaxReviewGateway")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AjaxReviewGateway {
    /// Creates a gateway for `endpoint` authenticated by `nonce`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::MissingNonce`] for a blank nonce,
    /// [`ReviewError::InvalidUrl`] for a non-HTTP endpoint, and
    /// [`ReviewError::Configuration`] when the HTTP client cannot be built.
    pub fn new(
        endpoint: Url,
        raw_nonce: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ReviewError> {
        let nonce = raw_nonce.into().trim().to_owned();
        if nonce.is_empty() {
            return Err(ReviewError::MissingNonce);
        }
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ReviewError::InvalidUrl(format!(
                "{endpoint}: AJAX endpoint must use http or https"
            )));
        }

        Ok(Self {
            client: build_client(timeout)?,
            endpoint,
            nonce,
            timeout,
            telemetry: Arc::new(NoopTelemetrySink),
        })
    }

    /// Routes request telemetry to `sink`.
    #[must_use]
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }

    /// Returns the endpoint requests are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn base_form(&self, action: &'static str, staff_id: u64, ratings: RatingSet) -> Form {
        let mut form = vec![
            ("action", action.to_owned()),
            ("nonce", self.nonce.clone()),
            ("staff_id", staff_id.to_string()),
        ];
        form.extend(ratings.iter().map(|rating| ("ratings[]", rating.to_string())));
        form
    }

    async fn post(
        &self,
        kind: RequestKind,
        ratings: RatingSet,
        offset: u64,
        form: Form,
    ) -> Result<ReviewPage, ReviewError> {
        self.telemetry.record(TelemetryEvent::ReviewsRequested {
            kind,
            ratings: ratings.to_string(),
            offset,
        });

        let outcome = self.send(&form).await;
        match &outcome {
            Ok(page) => self.telemetry.record(TelemetryEvent::ReviewsReceived {
                kind,
                cards: u64::try_from(page.cards.len()).unwrap_or(u64::MAX),
                has_more: page.has_more,
            }),
            Err(error) => self.telemetry.record(TelemetryEvent::ReviewsRequestFailed {
                kind,
                message: error.to_string(),
            }),
        }
        outcome
    }

    async fn send(&self, form: &Form) -> Result<ReviewPage, ReviewError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(form)
            .send()
            .await
            .map_err(|error| map_transport_error(&error, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| map_transport_error(&error, self.timeout))?;

        decode_response(status, &body)
    }
}

#[async_trait]
impl ReviewProvider for AjaxReviewGateway {
    async fn filter(&self, request: &FilterRequest) -> Result<ReviewPage, ReviewError> {
        let mut form = self.base_form(FILTER_ACTION, request.staff_id, request.ratings);
        form.push(("per_page", request.per_page.to_string()));
        self.post(RequestKind::Filter, request.ratings, 0, form).await
    }

    async fn load_more(&self, request: &LoadMoreRequest) -> Result<ReviewPage, ReviewError> {
        let mut form = self.base_form(LOAD_MORE_ACTION, request.staff_id, request.ratings);
        form.push(("offset", request.offset.to_string()));
        form.push(("per_page", request.per_page.to_string()));
        self.post(RequestKind::LoadMore, request.ratings, request.offset, form)
            .await
    }
}

fn build_client(timeout: Duration) -> Result<Client, ReviewError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("reviewdeck/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|error| ReviewError::Configuration {
            message: format!("failed to configure HTTP client: {error}"),
        })
}

fn map_transport_error(error: &reqwest::Error, timeout: Duration) -> ReviewError {
    if error.is_timeout() {
        ReviewError::Timeout {
            after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else {
        ReviewError::Network {
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AjaxEnvelope {
    success: bool,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct AjaxPayload {
    #[serde(default)]
    html: String,
    #[serde(default)]
    has_more: bool,
}

/// Maps a raw endpoint response onto a review page.
///
/// WordPress answers `-1` (usually with 403) when the nonce check fails and
/// `0` when no handler is registered for the action.
pub(super) fn decode_response(status: StatusCode, body: &str) -> Result<ReviewPage, ReviewError> {
    let trimmed = body.trim();
    if status == StatusCode::FORBIDDEN || trimmed == "-1" {
        return Err(ReviewError::Rejected {
            message: format!("nonce check failed (status {})", status.as_u16()),
        });
    }
    if !status.is_success() {
        return Err(ReviewError::Network {
            message: format!(
                "reviews endpoint returned status {}: {}",
                status.as_u16(),
                truncate(trimmed)
            ),
        });
    }
    if trimmed == "0" {
        return Err(ReviewError::Rejected {
            message: "no handler registered for the action".to_owned(),
        });
    }

    let envelope: AjaxEnvelope =
        serde_json::from_str(trimmed).map_err(|error| ReviewError::Decode {
            message: format!("response is not an AJAX envelope: {error}"),
        })?;
    if !envelope.success {
        return Err(ReviewError::Rejected {
            message: rejection_message(&envelope.data),
        });
    }

    let payload: AjaxPayload =
        serde_json::from_value(envelope.data).map_err(|error| ReviewError::Decode {
            message: format!("response data is malformed: {error}"),
        })?;
    let fragment = parse_fragment(&payload.html);

    Ok(ReviewPage {
        cards: fragment.cards,
        notice: fragment.notice,
        has_more: payload.has_more,
    })
}

fn rejection_message(data: &Value) -> String {
    match data {
        Value::String(message) if !message.trim().is_empty() => message.trim().to_owned(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| "server reported failure".to_owned(), ToOwned::to_owned),
        _ => "server reported failure".to_owned(),
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= ERROR_BODY_LIMIT {
        return text.to_owned();
    }
    let mut shortened: String = text.chars().take(ERROR_BODY_LIMIT).collect();
    shortened.push('…');
    shortened
}
