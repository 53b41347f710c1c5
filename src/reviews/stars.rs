//! Star glyph rendering for ratings and averages.

const FULL_STAR: char = '★';
const HALF_STAR: char = '⯪';
const EMPTY_STAR: char = '☆';

/// Renders five stars for a rating given in tenths.
///
/// The whole part becomes full stars, a fractional part of one half or more
/// adds a half star, and the remainder is padded with empty stars.
#[must_use]
pub fn stars(rating_tenths: u16) -> String {
    let clamped = rating_tenths.min(50);
    let full = usize::from(clamped.checked_div(10).unwrap_or(0));
    let has_half = clamped.checked_rem(10).unwrap_or(0) >= 5;
    let empty = 5_usize
        .saturating_sub(full)
        .saturating_sub(usize::from(has_half));

    let mut rendered = String::with_capacity(5 * FULL_STAR.len_utf8());
    rendered.extend(std::iter::repeat_n(FULL_STAR, full));
    if has_half {
        rendered.push(HALF_STAR);
    }
    rendered.extend(std::iter::repeat_n(EMPTY_STAR, empty));
    rendered
}

/// Formats tenths of a star as a one-decimal number (`45` becomes `4.5`).
#[must_use]
pub fn format_tenths(rating_tenths: u16) -> String {
    let whole = rating_tenths.checked_div(10).unwrap_or(0);
    let tenth = rating_tenths.checked_rem(10).unwrap_or(0);
    format!("{whole}.{tenth}")
}
