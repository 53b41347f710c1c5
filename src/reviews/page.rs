//! The page markup contract the review widgets attach to.
//!
//! A page that embeds the plugin's shortcodes carries everything a client
//! needs: the AJAX endpoint and nonce in the localised `bprAjax` script, the
//! slider's configuration and slides, the list's data attributes and initial
//! cards, and the aggregate statistics of the average widget. A page may
//! embed any number of each widget, and every instance is decoded in
//! document order. Widgets missing from the page decode to empty lists;
//! absence is not an error.
//!
//! Each widget's content ends at the `</div>` that balances its opening tag,
//! so cards belonging to a later widget never leak into an earlier one.

use std::sync::LazyLock;

use regex::{Captures, Match, Regex};
use serde::Deserialize;
use serde_json::Value;

use super::markup::{decode_entities, parse_cards, parse_fragment};
use super::models::{Rating, RatingCount, RatingSet, ReviewCard, ReviewStats};

/// Column count used when the slider configuration omits one.
pub const DEFAULT_COLUMNS: u32 = 3;
/// Autoplay interval used when the slider configuration omits one.
pub const DEFAULT_AUTOPLAY_SPEED_MS: u64 = 5_000;
/// Page size used when the list omits `data-per-page`.
pub const DEFAULT_PER_PAGE: u32 = 5;

/// AJAX endpoint and nonce issued with the page render.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AjaxContext {
    /// Absolute URL of `admin-ajax.php`.
    pub ajax_url: String,
    /// One-time request token.
    pub nonce: String,
}

/// Slider settings from the wrapper's `data-slider-config` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderSettings {
    /// Configured number of cards per page.
    pub columns: u32,
    /// Whether autoplay is configured.
    pub autoplay: bool,
    /// Autoplay interval in milliseconds.
    pub autoplay_speed_ms: u64,
}

impl Default for SliderSettings {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            autoplay: true,
            autoplay_speed_ms: DEFAULT_AUTOPLAY_SPEED_MS,
        }
    }
}

/// Decoded slider widget.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SliderMarkup {
    /// Settings from the configuration attribute.
    pub settings: SliderSettings,
    /// Whether previous/next arrows are rendered.
    pub show_arrows: bool,
    /// Slides in order.
    pub cards: Vec<ReviewCard>,
}

/// Decoded filterable list widget.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListMarkup {
    /// Page size from `data-per-page`.
    pub per_page: u32,
    /// Staff filter from `data-staff-id`.
    pub staff_id: u64,
    /// Whether the first page was full.
    pub has_more: bool,
    /// Ratings whose checkboxes are checked.
    pub selected: RatingSet,
    /// Per-rating counts shown next to each checkbox.
    pub rating_counts: Vec<RatingCount>,
    /// Initially rendered cards.
    pub cards: Vec<ReviewCard>,
    /// Initial notice, shown when no card matched.
    pub notice: Option<String>,
    /// Whether the query parameters were overridden after the page was
    /// rendered, so the initial cards and `has_more` no longer describe
    /// them.
    pub stale: bool,
}

/// Everything the client reads from one page render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageContract {
    /// Localised AJAX settings.
    pub ajax: Option<AjaxContext>,
    /// Every slider on the page.
    pub sliders: Vec<SliderMarkup>,
    /// Every filterable list on the page.
    pub lists: Vec<ListMarkup>,
    /// Statistics of every full average widget, or of every compact one
    /// when the page has no full widget.
    pub stats: Vec<ReviewStats>,
}

#[expect(clippy::expect_used, reason = "patterns are string literals")]
fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("page pattern should compile")
}

static AJAX_SCRIPT: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?s)var bprAjax = (\{.*?\});"));
static SLIDER_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"<div class="(bpr-reviews-slider-wrapper[^"]*)" data-slider-config='([^']*)'>"#)
});
static SLIDER_END: LazyLock<Regex> = LazyLock::new(|| pattern(r#"<div class="bpr-slider-dots">"#));
static DIV_TAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"<div\b|</div\s*>"));
static LIST_CONTAINER: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"<div class="bpr-reviews-list-container[^"]*"([^>]*)>"#));
static LIST_BODY: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"<div class="bpr-reviews-list"[^>]*>"#));
static FILTER_OPTION: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?s)<label class="bpr-filter-option">(.*?)</label>"#));
static CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"<input type="checkbox" class="bpr-filter-checkbox"([^>]*)>"#));
static VALUE_ATTR: LazyLock<Regex> = LazyLock::new(|| pattern(r#"value="(\d+)""#));
static CHECKED_ATTR: LazyLock<Regex> = LazyLock::new(|| pattern(r"\bchecked\b"));
static COUNT_WITH_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?s)>\s*([\d,]+)\s*\((\d+)%\)"));
static AVERAGE_WIDGET: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"<div class="bpr-average-reviews[^"]*""#));
static AVERAGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"class="bpr-(?:average|compact)-number"[^>]*>\s*(\d+)(?:\.(\d))?"#)
});
static BASED_ON: LazyLock<Regex> = LazyLock::new(|| pattern(r"Based on ([\d,]+) reviews"));
static RATING_ROW: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"(?s)<div class="bpr-rating-row">(.*?)class="bpr-rating-stats">\s*([\d,]+)\s*\((\d+)%\)"#)
});
static RECOMMEND: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(\d+)% of customers recommend us"));
static COMPACT_WIDGET: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"<div class="bpr-average-compact""#));

impl PageContract {
    /// Decodes the widget contract from a full page render.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let mut stats: Vec<ReviewStats> = AVERAGE_WIDGET
            .find_iter(html)
            .filter_map(|widget| parse_stats(element_body(html, widget)))
            .collect();
        if stats.is_empty() {
            stats = COMPACT_WIDGET
                .find_iter(html)
                .filter_map(|widget| parse_stats(element_body(html, widget)))
                .collect();
        }

        Self {
            ajax: parse_ajax_context(html),
            sliders: SLIDER_WRAPPER
                .captures_iter(html)
                .filter_map(|caps| parse_slider(html, &caps))
                .collect(),
            lists: LIST_CONTAINER
                .captures_iter(html)
                .filter_map(|caps| parse_list(html, &caps))
                .collect(),
            stats,
        }
    }
}

/// Markup between the end of `open` and the `</div>` balancing the element
/// `open` starts, or the rest of `html` when the element is never closed.
fn element_body<'h>(html: &'h str, open: Match<'_>) -> &'h str {
    let tail = html.get(open.start()..).unwrap_or("");
    let mut depth = 0_usize;
    for tag in DIV_TAG.find_iter(tail) {
        if tag.as_str().starts_with("</") {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                let close = open.start().saturating_add(tag.start());
                return html.get(open.end()..close).unwrap_or("");
            }
        } else {
            depth = depth.saturating_add(1);
        }
    }
    html.get(open.end()..).unwrap_or("")
}

fn parse_ajax_context(html: &str) -> Option<AjaxContext> {
    let json = AJAX_SCRIPT.captures(html)?.get(1)?.as_str();
    match serde_json::from_str(json) {
        Ok(context) => Some(context),
        Err(error) => {
            tracing::debug!("ignoring malformed bprAjax settings: {error}");
            None
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawSliderConfig {
    columns: Option<Value>,
    autoplay: Option<Value>,
    autoplay_speed: Option<Value>,
}

/// Reads an integer the way `parseInt(x) || fallback` would: numbers and
/// numeric strings are accepted, anything else or zero yields the fallback.
fn lenient_int(value: Option<&Value>, fallback: u64) -> u64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_u64(),
        Some(Value::String(text)) => {
            let digits: String = text
                .trim()
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        }
        _ => None,
    };
    parsed.filter(|number| *number > 0).unwrap_or(fallback)
}

impl From<RawSliderConfig> for SliderSettings {
    fn from(raw: RawSliderConfig) -> Self {
        let columns = lenient_int(raw.columns.as_ref(), u64::from(DEFAULT_COLUMNS));
        Self {
            columns: u32::try_from(columns).unwrap_or(DEFAULT_COLUMNS),
            autoplay: !matches!(raw.autoplay, Some(Value::Bool(false))),
            autoplay_speed_ms: lenient_int(raw.autoplay_speed.as_ref(), DEFAULT_AUTOPLAY_SPEED_MS),
        }
    }
}

fn parse_slider(html: &str, caps: &Captures<'_>) -> Option<SliderMarkup> {
    let wrapper = caps.get(0)?;
    let classes = caps.get(1).map_or("", |m| m.as_str());
    let raw_config = caps
        .get(2)
        .map(|m| decode_entities(m.as_str()))
        .unwrap_or_default();

    let settings = serde_json::from_str::<RawSliderConfig>(&raw_config)
        .inspect_err(|error| tracing::debug!("slider config is not JSON, using defaults: {error}"))
        .unwrap_or_default()
        .into();

    let rest = element_body(html, wrapper);
    let slides = SLIDER_END
        .find(rest)
        .and_then(|end| rest.get(..end.start()))
        .unwrap_or(rest);

    Some(SliderMarkup {
        settings,
        show_arrows: !classes.split_whitespace().any(|class| class == "bpr-no-arrows"),
        cards: parse_cards(slides),
    })
}

fn attribute<'h>(attributes: &'h str, name: &str) -> Option<&'h str> {
    let needle = format!("{name}=\"");
    let start = attributes.find(&needle)?.saturating_add(needle.len());
    let tail = attributes.get(start..)?;
    let end = tail.find('"')?;
    tail.get(..end)
}

fn parse_count(text: &str) -> u64 {
    text.replace(',', "").parse().unwrap_or(0)
}

fn parse_list(html: &str, caps: &Captures<'_>) -> Option<ListMarkup> {
    let container = caps.get(0)?;
    let attributes = caps.get(1).map_or("", |m| m.as_str());
    let section = element_body(html, container);

    let per_page = attribute(attributes, "data-per-page")
        .and_then(|value| value.parse().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PER_PAGE);
    let staff_id = attribute(attributes, "data-staff-id")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    let has_more = attribute(attributes, "data-has-more") == Some("true");

    let mut selected = RatingSet::empty();
    let mut rating_counts = Vec::new();
    for option in FILTER_OPTION.captures_iter(section) {
        let Some(body) = option.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let Some(checkbox) = CHECKBOX.captures(body).and_then(|c| c.get(1)) else {
            continue;
        };
        let Some(rating) = VALUE_ATTR
            .captures(checkbox.as_str())
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .and_then(Rating::new)
        else {
            continue;
        };
        if CHECKED_ATTR.is_match(checkbox.as_str()) {
            selected.insert(rating);
        }
        if let Some(count) = COUNT_WITH_PERCENT.captures(body) {
            rating_counts.push(RatingCount {
                rating,
                count: count.get(1).map_or(0, |m| parse_count(m.as_str())),
                percentage: count
                    .get(2)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(0),
            });
        }
    }

    let initial = LIST_BODY
        .find(section)
        .map_or("", |body| element_body(section, body));
    let fragment = parse_fragment(initial);

    Some(ListMarkup {
        per_page,
        staff_id,
        has_more,
        selected,
        rating_counts,
        cards: fragment.cards,
        notice: fragment.notice,
        stale: false,
    })
}

fn parse_stats(section: &str) -> Option<ReviewStats> {
    let average = AVERAGE_NUMBER.captures(section)?;
    let whole: u16 = average
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    let tenth: u16 = average
        .get(2)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    let total = BASED_ON
        .captures(section)
        .and_then(|c| c.get(1))
        .map_or(0, |m| parse_count(m.as_str()));

    let breakdown: Vec<RatingCount> = RATING_ROW
        .captures_iter(section)
        .filter_map(|row| {
            let label = row.get(1)?.as_str();
            let stars = u8::try_from(label.matches("bpr-star-full").count()).ok()?;
            Some(RatingCount {
                rating: Rating::new(stars)?,
                count: row.get(2).map_or(0, |m| parse_count(m.as_str())),
                percentage: row
                    .get(3)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(0),
            })
        })
        .collect();

    let mut stats = ReviewStats {
        average_tenths: whole.saturating_mul(10).saturating_add(tenth),
        total,
        breakdown,
        recommend_percentage: 0,
    };
    stats.recommend_percentage = RECOMMEND
        .captures(section)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_else(|| stats.recommend_from_breakdown());

    Some(stats)
}

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;
