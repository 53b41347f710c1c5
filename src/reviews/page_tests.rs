//! Tests for decoding the page markup contract.

use rstest::{fixture, rstest};

use super::*;
use crate::reviews::test_support::{list_section_html, sample_page_html, slider_section_html};

#[fixture]
fn contract() -> PageContract {
    PageContract::parse(&sample_page_html(12))
}

#[rstest]
fn ajax_context_is_read_from_localised_script(contract: PageContract) {
    let ajax = contract.ajax.expect("bprAjax should be present");
    assert_eq!(ajax.ajax_url, "https://salon.example/wp-admin/admin-ajax.php");
    assert_eq!(ajax.nonce, "a1b2c3d4e5");
}

#[rstest]
fn slider_settings_and_slides_are_decoded(contract: PageContract) {
    let slider = contract.sliders.first().expect("slider should be present");
    assert_eq!(
        slider.settings,
        SliderSettings {
            columns: 3,
            autoplay: true,
            autoplay_speed_ms: 4_000,
        }
    );
    assert!(!slider.show_arrows, "bpr-no-arrows hides the arrows");
    assert_eq!(slider.cards.len(), 12);
    assert_eq!(
        slider.cards.first().and_then(|card| card.title.as_deref()),
        Some("Slide 1")
    );
}

#[rstest]
fn list_attributes_and_checkboxes_are_decoded(contract: PageContract) {
    let list = contract.lists.first().expect("list should be present");
    assert_eq!(list.per_page, 5);
    assert_eq!(list.staff_id, 7);
    assert!(list.has_more);
    assert_eq!(list.selected.to_string(), "5,4");
    assert_eq!(list.cards.len(), 5);
    assert_eq!(list.notice, None);

    let counts: Vec<(u8, u64, u8)> = list
        .rating_counts
        .iter()
        .map(|entry| (entry.rating.get(), entry.count, entry.percentage))
        .collect();
    assert_eq!(counts, vec![(5, 1000, 80), (4, 0, 0), (1, 250, 20)]);
}

#[rstest]
fn average_widget_supplies_stats(contract: PageContract) {
    let stats = contract.stats.first().expect("stats should be present");
    assert_eq!(stats.average_tenths, 46);
    assert_eq!(stats.total, 1_250);
    assert_eq!(stats.recommend_percentage, 80);
    let breakdown: Vec<(u8, u64)> = stats
        .breakdown
        .iter()
        .map(|entry| (entry.rating.get(), entry.count))
        .collect();
    assert_eq!(breakdown, vec![(5, 1_000), (1, 250)]);
}

#[test]
fn missing_widgets_decode_to_empty_lists() {
    assert_eq!(PageContract::parse("<html><body></body></html>"), PageContract::default());
}

#[rstest]
#[case(r#"{"columns":"2","autoplay":false,"autoplay_speed":"750ms"}"#, 2, false, 750)]
#[case(r#"{"columns":0}"#, 3, true, 5_000)]
#[case(r#"{}"#, 3, true, 5_000)]
#[case(r#"not json"#, 3, true, 5_000)]
fn slider_config_follows_script_fallbacks(
    #[case] config: &str,
    #[case] columns: u32,
    #[case] autoplay: bool,
    #[case] speed: u64,
) {
    let html = format!(
        "<div class=\"bpr-reviews-slider-wrapper\" data-slider-config='{}'></div>",
        config.replace('"', "&quot;")
    );
    let slider = PageContract::parse(&html)
        .sliders
        .into_iter()
        .next()
        .expect("slider should be present");

    assert_eq!(slider.settings.columns, columns);
    assert_eq!(slider.settings.autoplay, autoplay);
    assert_eq!(slider.settings.autoplay_speed_ms, speed);
    assert!(slider.show_arrows);
    assert!(slider.cards.is_empty());
}

#[test]
fn compact_average_is_used_without_full_widget() {
    let html = concat!(
        "<div class=\"bpr-average-compact\">",
        "<span class=\"bpr-compact-number\" style=\"font-size: 16px\">4.2</span>",
        "<span class=\"bpr-compact-count\">Based on 37 reviews</span></div>"
    );
    let stats = PageContract::parse(html)
        .stats
        .into_iter()
        .next()
        .expect("stats should be present");
    assert_eq!(stats.average_tenths, 42);
    assert_eq!(stats.total, 37);
    assert!(stats.breakdown.is_empty());
    assert_eq!(stats.recommend_percentage, 0);
}

#[test]
fn empty_list_carries_its_notice() {
    let html = concat!(
        "<div class=\"bpr-reviews-list-container bpr-filter-left\" data-per-page=\"5\" ",
        "data-staff-id=\"0\" data-has-more=\"false\">",
        "<div class=\"bpr-reviews-list\" id=\"bpr-reviews-list\">",
        "<p class=\"bpr-no-reviews\">No reviews found matching your filters.</p></div></div>"
    );
    let list = PageContract::parse(html)
        .lists
        .into_iter()
        .next()
        .expect("list should be present");
    assert!(!list.has_more);
    assert!(list.cards.is_empty());
    assert!(list.selected.is_empty());
    assert_eq!(
        list.notice.as_deref(),
        Some("No reviews found matching your filters.")
    );
}

fn titles(cards: &[ReviewCard]) -> Vec<&str> {
    cards.iter().filter_map(|card| card.title.as_deref()).collect()
}

#[test]
fn complete_list_ends_before_a_later_slider() {
    let html = format!(
        "<body>{}{}</body>",
        list_section_html(0, &[1, 2], false),
        slider_section_html(1, 3, 3)
    );
    let contract = PageContract::parse(&html);

    let list = contract.lists.first().expect("list should be present");
    assert!(!list.has_more);
    assert_eq!(titles(&list.cards), vec!["Review 1", "Review 2"]);
    let slider = contract.sliders.first().expect("slider should be present");
    assert_eq!(titles(&slider.cards), vec!["Slide 1", "Slide 2", "Slide 3"]);
}

#[test]
fn every_widget_instance_is_decoded_in_document_order() {
    let html = format!(
        "<body>{}{}{}{}</body>",
        slider_section_html(1, 2, 1),
        list_section_html(3, &[10, 11], true),
        slider_section_html(20, 3, 2),
        list_section_html(4, &[30], false)
    );
    let contract = PageContract::parse(&html);

    let slides: Vec<Vec<&str>> = contract
        .sliders
        .iter()
        .map(|slider| titles(&slider.cards))
        .collect();
    assert_eq!(
        slides,
        vec![vec!["Slide 1", "Slide 2"], vec!["Slide 20", "Slide 21", "Slide 22"]]
    );
    let columns: Vec<u32> = contract
        .sliders
        .iter()
        .map(|slider| slider.settings.columns)
        .collect();
    assert_eq!(columns, vec![1, 2]);

    let lists: Vec<(u64, bool, Vec<&str>)> = contract
        .lists
        .iter()
        .map(|list| (list.staff_id, list.has_more, titles(&list.cards)))
        .collect();
    assert_eq!(
        lists,
        vec![
            (3, true, vec!["Review 10", "Review 11"]),
            (4, false, vec!["Review 30"]),
        ]
    );
}
