//! Review records, rating filters, and request payloads.

use std::fmt;

use crate::error::ReviewError;

/// A star rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    /// Lowest rating a review can carry.
    pub const MIN: u8 = 1;
    /// Highest rating a review can carry.
    pub const MAX: u8 = 5;

    /// Every rating in filter-sidebar order (five stars first).
    pub const DESCENDING: [Self; 5] = [Self(5), Self(4), Self(3), Self(2), Self(1)];

    /// Creates a rating when `value` lies in `1..=5`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::MIN && value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the numeric star value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    const fn bit(self) -> u8 {
        1 << self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Set of ratings selected in the list's filter sidebar.
///
/// Stored as a bitmask so that the set is `Copy` and iteration order is
/// fixed (five stars first), matching the order the sidebar renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingSet {
    bits: u8,
}

impl RatingSet {
    /// Returns a set with no ratings selected.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Returns a set containing every rating.
    #[must_use]
    pub fn all() -> Self {
        Rating::DESCENDING.into_iter().collect()
    }

    /// Adds a rating. Returns `true` if it was not already present.
    pub const fn insert(&mut self, rating: Rating) -> bool {
        let was_present = self.contains(rating);
        self.bits |= rating.bit();
        !was_present
    }

    /// Removes a rating. Returns `true` if it was present.
    pub const fn remove(&mut self, rating: Rating) -> bool {
        let was_present = self.contains(rating);
        self.bits &= !rating.bit();
        was_present
    }

    /// Returns true when `rating` is selected.
    #[must_use]
    pub const fn contains(self, rating: Rating) -> bool {
        self.bits & rating.bit() != 0
    }

    /// Returns true when no rating is selected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Number of selected ratings.
    #[must_use]
    pub const fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterates the selected ratings, five stars first.
    pub fn iter(self) -> impl Iterator<Item = Rating> {
        Rating::DESCENDING
            .into_iter()
            .filter(move |rating| self.contains(*rating))
    }

    /// Parses a comma separated list such as `"5,4"`.
    ///
    /// Blank entries are skipped so `""` yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when an entry is not a number
    /// in `1..=5`.
    pub fn parse(list: &str) -> Result<Self, ReviewError> {
        list.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .parse::<u8>()
                    .ok()
                    .and_then(Rating::new)
                    .ok_or_else(|| ReviewError::Configuration {
                        message: format!("rating filter '{entry}' must be a number from 1 to 5"),
                    })
            })
            .collect()
    }
}

impl FromIterator<Rating> for RatingSet {
    fn from_iter<I: IntoIterator<Item = Rating>>(iter: I) -> Self {
        let mut set = Self::empty();
        for rating in iter {
            set.insert(rating);
        }
        set
    }
}

impl fmt::Display for RatingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .iter()
            .map(|rating| rating.to_string())
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

/// A single review as decoded from the provider's card markup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewCard {
    /// Review id from `data-review-id`, absent on slider cards.
    pub id: Option<u64>,
    /// Rating in tenths of a star (`45` is 4.5 stars).
    pub rating_tenths: u16,
    /// Optional review headline.
    pub title: Option<String>,
    /// Review body with paragraphs separated by newlines.
    pub body: String,
    /// Customer name.
    pub author: Option<String>,
    /// Human readable age such as "3 days ago".
    pub date: Option<String>,
}

/// One page of results returned by the reviews endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewPage {
    /// Cards in display order.
    pub cards: Vec<ReviewCard>,
    /// Notice text sent instead of cards (for example when no rating is
    /// selected).
    pub notice: Option<String>,
    /// Whether the provider believes another page exists.
    pub has_more: bool,
}

impl ReviewPage {
    /// Returns true when the page carries no cards.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Request replacing the list with the first page for a rating set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterRequest {
    /// Staff member filter, `0` for all staff.
    pub staff_id: u64,
    /// Ratings to include.
    pub ratings: RatingSet,
    /// Page size.
    pub per_page: u32,
}

/// Request for the next page of the current filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadMoreRequest {
    /// Staff member filter, `0` for all staff.
    pub staff_id: u64,
    /// Ratings to include.
    pub ratings: RatingSet,
    /// Number of reviews already consumed.
    pub offset: u64,
    /// Page size.
    pub per_page: u32,
}

/// Number of reviews carrying one rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingCount {
    /// The rating being counted.
    pub rating: Rating,
    /// Reviews with exactly this rating.
    pub count: u64,
    /// Share of all reviews, rounded to a whole percent.
    pub percentage: u8,
}

/// Aggregate rating statistics published by the average widget.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewStats {
    /// Average rating in tenths of a star.
    pub average_tenths: u16,
    /// Total number of reviews.
    pub total: u64,
    /// Per-rating counts, five stars first. May be empty when the widget
    /// hides its breakdown.
    pub breakdown: Vec<RatingCount>,
    /// Share of customers who left four or five stars.
    pub recommend_percentage: u8,
}

impl ReviewStats {
    /// Returns the count for one rating, or zero when not published.
    #[must_use]
    pub fn count_for(&self, rating: Rating) -> u64 {
        self.breakdown
            .iter()
            .find(|entry| entry.rating == rating)
            .map_or(0, |entry| entry.count)
    }

    /// Derives the recommend percentage from four and five star counts.
    ///
    /// Rounds half up, and yields zero when there are no reviews.
    #[must_use]
    pub fn recommend_from_breakdown(&self) -> u8 {
        let positive = self
            .count_for(Rating(5))
            .saturating_add(self.count_for(Rating(4)));
        percentage_of(positive, self.total)
    }
}

/// Rounds `part / whole` to a whole percent, half up.
#[must_use]
pub fn percentage_of(part: u64, whole: u64) -> u8 {
    let scaled = part.saturating_mul(200).saturating_add(whole);
    let rounded = scaled.checked_div(whole.saturating_mul(2)).unwrap_or(0);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}
