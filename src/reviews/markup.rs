//! Decoding of the pre-rendered card markup the reviews endpoint returns.
//!
//! The server renders cards as HTML fragments. The client treats each card as
//! an opaque unit, but a terminal cannot display HTML, so this module lifts
//! the handful of fields a card shows (stars, title, body, author, date) out
//! of the fragment. Anything it does not recognise is ignored.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::models::ReviewCard;

/// Cards and notice text decoded from one HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewFragment {
    /// Cards in document order.
    pub cards: Vec<ReviewCard>,
    /// Text of a `bpr-no-reviews` notice, if the fragment carried one.
    pub notice: Option<String>,
}

#[expect(clippy::expect_used, reason = "patterns are string literals")]
fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("markup pattern should compile")
}

static CARD_START: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"<div class="bpr-review-card"[^>]*>"#));
static REVIEW_ID: LazyLock<Regex> = LazyLock::new(|| pattern(r#"data-review-id="(\d+)""#));
static RATING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"class="bpr-review-rating-number">\s*(\d+)(?:\.(\d))?"#)
});
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?s)<h[1-6] class="bpr-review-title">(.*?)</h[1-6]>"#));
static CONTENT: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?s)<div class="bpr-review-content">(.*?)</div>"#));
static AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"(?s)class="bpr-review(?:-author|er-name)">(.*?)</(?:span|div)>"#)
});
static DATE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?s)class="bpr-review-date">(.*?)</(?:span|div)>"#));
static NOTICE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?s)<p class="bpr-no-reviews">(.*?)</p>"#));
static BLOCK_BREAK: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)</p>|<br\s*/?>"));
static TAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"<[^>]*>"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| pattern(r"&(#[xX]?[0-9a-fA-F]+|[a-zA-Z]+);"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| pattern(r"\s+"));

/// Decodes every card and notice in an HTML fragment.
#[must_use]
pub fn parse_fragment(html: &str) -> ReviewFragment {
    ReviewFragment {
        cards: parse_cards(html),
        notice: NOTICE
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|text| inline_text(text.as_str()))
            .filter(|text| !text.is_empty()),
    }
}

/// Decodes every `bpr-review-card` in document order.
#[must_use]
pub fn parse_cards(html: &str) -> Vec<ReviewCard> {
    let starts: Vec<usize> = CARD_START.find_iter(html).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .filter_map(|(index, &start)| {
            let end = starts.get(index + 1).copied().unwrap_or(html.len());
            html.get(start..end)
        })
        .map(parse_card)
        .collect()
}

fn parse_card(chunk: &str) -> ReviewCard {
    let opening_tag = CARD_START.find(chunk).map_or("", |m| m.as_str());

    ReviewCard {
        id: REVIEW_ID
            .captures(opening_tag)
            .and_then(|caps| caps.get(1))
            .and_then(|id| id.as_str().parse().ok()),
        rating_tenths: rating_tenths(chunk),
        title: first_capture(&TITLE, chunk)
            .map(inline_text)
            .filter(|title| !title.is_empty()),
        body: first_capture(&CONTENT, chunk)
            .map(block_text)
            .unwrap_or_default(),
        author: first_capture(&AUTHOR, chunk)
            .map(inline_text)
            .filter(|author| !author.is_empty()),
        date: first_capture(&DATE, chunk)
            .map(inline_text)
            .filter(|date| !date.is_empty()),
    }
}

fn first_capture<'h>(regex: &Regex, haystack: &'h str) -> Option<&'h str> {
    regex
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Reads the numeric rating when present, otherwise counts star glyphs.
fn rating_tenths(chunk: &str) -> u16 {
    if let Some(caps) = RATING_NUMBER.captures(chunk) {
        let whole: u16 = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        let tenth: u16 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        return whole.saturating_mul(10).saturating_add(tenth);
    }

    let full = u16::try_from(chunk.matches("bpr-star-full").count()).unwrap_or(u16::MAX);
    let half = u16::try_from(chunk.matches("bpr-star-half").count()).unwrap_or(u16::MAX);
    full.saturating_mul(10).saturating_add(half.saturating_mul(5))
}

/// Flattens inline markup to a single line of text.
#[must_use]
pub fn inline_text(html: &str) -> String {
    let stripped = TAG.replace_all(html, " ");
    let decoded = decode_entities(&stripped);
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

/// Flattens block markup, keeping one line per paragraph.
#[must_use]
pub fn block_text(html: &str) -> String {
    let with_breaks = BLOCK_BREAK.replace_all(html, "\n");
    with_breaks
        .lines()
        .map(inline_text)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes named and numeric HTML entities.
///
/// Unknown named entities are left untouched.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            caps.get(1)
                .and_then(|name| decode_entity(name.as_str()))
                .map_or_else(|| whole.to_owned(), String::from)
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(hex) = name
        .strip_prefix("#x")
        .or_else(|| name.strip_prefix("#X"))
    {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(decimal) = name.strip_prefix('#') {
        return decimal.parse::<u32>().ok().and_then(char::from_u32);
    }

    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "larr" => '←',
        "rarr" => '→',
        "bull" => '•',
        _ => return None,
    };
    Some(decoded)
}
