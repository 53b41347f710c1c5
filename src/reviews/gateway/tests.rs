//! Tests for the AJAX review gateway.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use rstest::rstest;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::ajax::decode_response;
use super::{AjaxReviewGateway, ReviewProvider, resolve_endpoint};
use crate::error::ReviewError;
use crate::reviews::models::{FilterRequest, LoadMoreRequest, RatingSet};
use crate::reviews::test_support::list_card_html;
use crate::telemetry::{RequestKind, TelemetryEvent, TelemetrySink};

#[derive(Debug, Default)]
struct RecordingSink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingSink {
    fn take(&self) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .expect("events mutex should be available")
            .drain(..)
            .collect()
    }
}

impl TelemetrySink for RecordingSink {
    fn record(&self, event: TelemetryEvent) {
        self.events
            .lock()
            .expect("events mutex should be available")
            .push(event);
    }
}

fn ratings(list: &str) -> RatingSet {
    RatingSet::parse(list).expect("rating list should parse")
}

fn gateway_for(server: &MockServer, timeout: Duration) -> AjaxReviewGateway {
    let endpoint = Url::parse(&format!("{}/wp-admin/admin-ajax.php", server.uri()))
        .expect("mock server URL should parse");
    AjaxReviewGateway::new(endpoint, "nonce-123", timeout).expect("gateway should build")
}

fn envelope(html: &str, has_more: bool) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "data": { "html": html, "has_more": has_more },
    })
}

#[tokio::test]
async fn filter_posts_form_and_decodes_cards() {
    let server = MockServer::start().await;
    let html = format!("{}{}", list_card_html(11, 5, "Ana"), list_card_html(12, 4, "Bo"));
    Mock::given(method("POST"))
        .and(path("/wp-admin/admin-ajax.php"))
        .and(body_string_contains("action=bpr_filter_reviews"))
        .and(body_string_contains("nonce=nonce-123"))
        .and(body_string_contains("staff_id=7"))
        .and(body_string_contains("ratings%5B%5D=5&ratings%5B%5D=4"))
        .and(body_string_contains("per_page=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&html, true)))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let gateway =
        gateway_for(&server, Duration::from_secs(5)).with_telemetry(Arc::clone(&sink) as _);
    let page = gateway
        .filter(&FilterRequest {
            staff_id: 7,
            ratings: ratings("5,4"),
            per_page: 2,
        })
        .await
        .expect("filter should succeed");

    let ids: Vec<Option<u64>> = page.cards.iter().map(|card| card.id).collect();
    assert_eq!(ids, vec![Some(11), Some(12)]);
    assert!(page.has_more);
    assert_eq!(
        sink.take(),
        vec![
            TelemetryEvent::ReviewsRequested {
                kind: RequestKind::Filter,
                ratings: "5,4".to_owned(),
                offset: 0,
            },
            TelemetryEvent::ReviewsReceived {
                kind: RequestKind::Filter,
                cards: 2,
                has_more: true,
            },
        ]
    );
}

#[tokio::test]
async fn load_more_sends_offset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("action=bpr_load_more_reviews"))
        .and(body_string_contains("offset=10&per_page=5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            &list_card_html(21, 3, "Cy"),
            false,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let page = gateway_for(&server, Duration::from_secs(5))
        .load_more(&LoadMoreRequest {
            staff_id: 0,
            ratings: ratings("3"),
            offset: 10,
            per_page: 5,
        })
        .await
        .expect("load more should succeed");

    assert_eq!(page.cards.len(), 1);
    assert!(!page.has_more);
}

#[tokio::test]
async fn empty_selection_returns_server_notice() {
    let server = MockServer::start().await;
    let notice = r#"<p class="bpr-no-reviews">Please select at least one rating filter.</p>"#;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(notice, false)))
        .mount(&server)
        .await;

    let page = gateway_for(&server, Duration::from_secs(5))
        .filter(&FilterRequest {
            staff_id: 0,
            ratings: RatingSet::empty(),
            per_page: 5,
        })
        .await
        .expect("filter should succeed");

    assert!(page.is_empty());
    assert!(!page.has_more);
    assert_eq!(
        page.notice.as_deref(),
        Some("Please select at least one rating filter.")
    );
}

#[tokio::test]
async fn stalled_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope("", false))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let error = gateway_for(&server, Duration::from_millis(100))
        .with_telemetry(Arc::clone(&sink) as _)
        .filter(&FilterRequest {
            staff_id: 0,
            ratings: ratings("5"),
            per_page: 5,
        })
        .await
        .expect_err("stalled request should fail");

    assert_eq!(error, ReviewError::Timeout { after_ms: 100 });
    assert!(matches!(
        sink.take().last(),
        Some(TelemetryEvent::ReviewsRequestFailed {
            kind: RequestKind::Filter,
            ..
        })
    ));
}

#[rstest]
#[case(StatusCode::FORBIDDEN, "-1")]
#[case(StatusCode::OK, "-1")]
#[case(StatusCode::OK, "0")]
#[case(StatusCode::OK, r#"{"success":false,"data":"Invalid nonce"}"#)]
#[case(StatusCode::OK, r#"{"success":false}"#)]
fn rejections_are_reported(#[case] status: StatusCode, #[case] body: &str) {
    let error = decode_response(status, body).expect_err("response should be rejected");
    assert!(
        matches!(error, ReviewError::Rejected { .. }),
        "expected rejection, got {error:?}"
    );
    assert!(error.is_transport());
}

#[test]
fn rejection_carries_server_message() {
    let error = decode_response(
        StatusCode::OK,
        r#"{"success":false,"data":{"message":"Security check failed"}}"#,
    )
    .expect_err("response should be rejected");
    assert_eq!(
        error,
        ReviewError::Rejected {
            message: "Security check failed".to_owned(),
        }
    );
}

#[rstest]
#[case(StatusCode::OK, "<html>maintenance</html>")]
#[case(StatusCode::OK, r#"{"success":true,"data":"oops"}"#)]
fn malformed_bodies_are_decode_errors(#[case] status: StatusCode, #[case] body: &str) {
    let error = decode_response(status, body).expect_err("body should not decode");
    assert!(matches!(error, ReviewError::Decode { .. }), "got {error:?}");
}

#[test]
fn server_errors_are_network_errors() {
    let error = decode_response(StatusCode::BAD_GATEWAY, "upstream down")
        .expect_err("5xx should fail");
    assert_eq!(
        error,
        ReviewError::Network {
            message: "reviews endpoint returned status 502: upstream down".to_owned(),
        }
    );
}

#[test]
fn blank_nonce_is_rejected() {
    let endpoint = Url::parse("https://salon.example/wp-admin/admin-ajax.php")
        .expect("URL should parse");
    let error = AjaxReviewGateway::new(endpoint, "  ", Duration::from_secs(1))
        .expect_err("blank nonce should fail");
    assert_eq!(error, ReviewError::MissingNonce);
}

#[test]
fn non_http_endpoint_is_rejected() {
    let endpoint = Url::parse("ftp://salon.example/admin-ajax.php").expect("URL should parse");
    let error = AjaxReviewGateway::new(endpoint, "abc", Duration::from_secs(1))
        .expect_err("ftp endpoint should fail");
    assert!(matches!(error, ReviewError::InvalidUrl(_)));
}

#[rstest]
#[case(None, "https://salon.example/wp-admin/admin-ajax.php")]
#[case(Some(""), "https://salon.example/wp-admin/admin-ajax.php")]
#[case(Some("/custom/ajax.php"), "https://salon.example/custom/ajax.php")]
#[case(
    Some("https://cdn.example/wp-admin/admin-ajax.php"),
    "https://cdn.example/wp-admin/admin-ajax.php"
)]
fn endpoint_resolves_against_page(#[case] ajax_url: Option<&str>, #[case] expected: &str) {
    let page = Url::parse("https://salon.example/team/reviews/").expect("URL should parse");
    let endpoint = resolve_endpoint(&page, ajax_url).expect("endpoint should resolve");
    assert_eq!(endpoint.as_str(), expected);
}
