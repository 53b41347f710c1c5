//! Markup builders and a scripted provider shared by unit and integration
//! tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ReviewError;

use super::gateway::ReviewProvider;
use super::models::{FilterRequest, LoadMoreRequest, ReviewCard, ReviewPage};

/// Renders one list card the way the plugin's card template does.
#[must_use]
pub fn list_card_html(id: u64, rating: u8, author: &str) -> String {
    let full = "<span class=\"bpr-star bpr-star-full\">&#9733;</span>".repeat(usize::from(rating));
    let empty = "<span class=\"bpr-star bpr-star-empty\">&#9734;</span>"
        .repeat(usize::from(5_u8.saturating_sub(rating)));
    format!(
        concat!(
            "<div class=\"bpr-review-card\" data-review-id=\"{id}\">",
            "<div class=\"bpr-review-header\"><div class=\"bpr-review-rating\">",
            "<div class=\"bpr-stars\">{full}{empty}</div>",
            "<span class=\"bpr-review-rating-number\">{rating}.0</span></div>",
            "<div class=\"bpr-review-meta\"><span class=\"bpr-review-author\">{author}</span>",
            "<span class=\"bpr-review-separator\">•</span>",
            "<span class=\"bpr-review-date\">2 days ago</span></div></div>",
            "<h4 class=\"bpr-review-title\">Review {id}</h4>",
            "<div class=\"bpr-review-content\"><p>Body of review {id}.</p></div>",
            "</div>"
        ),
        id = id,
        full = full,
        empty = empty,
        rating = rating,
        author = author,
    )
}

/// Renders one slider slide.
#[must_use]
pub fn slide_html(index: usize) -> String {
    format!(
        concat!(
            "<div class=\"bpr-review-slide\"><div class=\"bpr-review-card\" style=\"border-radius: 8px;\">",
            "<div class=\"bpr-review-header\"><div class=\"bpr-review-rating\"><div class=\"bpr-stars\">",
            "<span class=\"bpr-star bpr-star-full\">&#9733;</span>",
            "<span class=\"bpr-star bpr-star-full\">&#9733;</span>",
            "<span class=\"bpr-star bpr-star-full\">&#9733;</span>",
            "<span class=\"bpr-star bpr-star-full\">&#9733;</span>",
            "<span class=\"bpr-star bpr-star-full\">&#9733;</span>",
            "</div></div><div class=\"bpr-review-date\">1 week ago</div></div>",
            "<h3 class=\"bpr-review-title\">Slide {index}</h3>",
            "<div class=\"bpr-review-content\"><p>Slide body {index}</p></div>",
            "<div class=\"bpr-review-footer\"><div class=\"bpr-reviewer-name\">Guest {index}</div></div>",
            "</div></div>"
        ),
        index = index,
    )
}

/// Builds a full page embedding the slider, list, and average widgets.
#[must_use]
pub fn sample_page_html(slide_count: usize) -> String {
    let slides: String = (1..=slide_count).map(slide_html).collect();
    let cards: String = (1..=5)
        .map(|id| list_card_html(id, if matches!(id, 2 | 4) { 4 } else { 5 }, "Sam"))
        .collect();

    format!(
        concat!(
            "<html><head><script id=\"bpr-slider-script-js-extra\">\n",
            "var bprAjax = {{\"ajax_url\":\"https:\\/\\/salon.example\\/wp-admin\\/admin-ajax.php\",",
            "\"nonce\":\"a1b2c3d4e5\"}};\n</script></head><body>",
            "<div class=\"bpr-reviews-slider-wrapper bpr-no-arrows\" ",
            "data-slider-config='{{&quot;autoplay&quot;:true,&quot;autoplay_speed&quot;:4000,&quot;columns&quot;:3}}'>",
            "<div class=\"bpr-reviews-slider\">{slides}</div>",
            "<div class=\"bpr-slider-dots\"></div></div>",
            "<div class=\"bpr-average-reviews bpr-style-card\" style=\"padding: 30px\">",
            "<div class=\"bpr-average-container\"><div class=\"bpr-average-main\">",
            "<div class=\"bpr-average-number\">\n 4.6 </div>",
            "<div class=\"bpr-average-details\"><div class=\"bpr-average-count\">Based on 1,250 reviews</div></div></div>",
            "<div class=\"bpr-rating-breakdown\">",
            "<div class=\"bpr-rating-row\"><div class=\"bpr-rating-label\"><div class=\"bpr-stars\">",
            "<span class=\"bpr-star bpr-star-full\">&#9733;</span><span class=\"bpr-star bpr-star-full\">&#9733;</span>",
            "<span class=\"bpr-star bpr-star-full\">&#9733;</span><span class=\"bpr-star bpr-star-full\">&#9733;</span>",
            "<span class=\"bpr-star bpr-star-full\">&#9733;</span></div></div>",
            "<div class=\"bpr-rating-bar-container\"><div class=\"bpr-rating-bar\" style=\"width: 80%;\"></div></div>",
            "<div class=\"bpr-rating-stats\">1,000 (80%)</div></div>",
            "<div class=\"bpr-rating-row\"><div class=\"bpr-rating-label\"><div class=\"bpr-stars\">",
            "<span class=\"bpr-star bpr-star-full\">&#9733;</span>",
            "<span class=\"bpr-star bpr-star-empty\">&#9734;</span></div></div>",
            "<div class=\"bpr-rating-bar-container\"><div class=\"bpr-rating-bar\" style=\"width: 20%;\"></div></div>",
            "<div class=\"bpr-rating-stats\">250 (20%)</div></div>",
            "</div>",
            "<div class=\"bpr-recommend\">80% of customers recommend us</div>",
            "</div></div>",
            "<div class=\"bpr-reviews-list-container bpr-filter-left\" data-per-page=\"5\" ",
            "data-staff-id=\"7\" data-has-more=\"true\">",
            "<div class=\"bpr-reviews-list-wrapper bpr-filter-left\"><aside class=\"bpr-reviews-filter\">",
            "<div class=\"bpr-filter-options\">",
            "<label class=\"bpr-filter-option\"><input type=\"checkbox\" class=\"bpr-filter-checkbox\" ",
            "name=\"bpr_rating_filter\" value=\"5\" checked>",
            "<span class=\"bpr-filter-count\">\n 1000 (80%)\n</span></label>",
            "<label class=\"bpr-filter-option\"><input type=\"checkbox\" class=\"bpr-filter-checkbox\" ",
            "name=\"bpr_rating_filter\" value=\"4\" checked>",
            "<span class=\"bpr-filter-count\">\n 0 (0%)\n</span></label>",
            "<label class=\"bpr-filter-option\"><input type=\"checkbox\" class=\"bpr-filter-checkbox\" ",
            "name=\"bpr_rating_filter\" value=\"1\" >",
            "<span class=\"bpr-filter-count\">\n 250 (20%)\n</span></label>",
            "</div></aside>",
            "<div class=\"bpr-reviews-list-content\"><div class=\"bpr-reviews-list\" id=\"bpr-reviews-list\">",
            "{cards}</div>",
            "<div class=\"bpr-load-more-container\"><button type=\"button\" class=\"bpr-load-more-btn\">",
            "<span class=\"bpr-load-more-text\">Load More</span></button></div>",
            "</div></div></div></body></html>"
        ),
        slides = slides,
        cards = cards,
    )
}

/// Renders a slider widget whose slides are numbered from `first_slide`.
#[must_use]
pub fn slider_section_html(first_slide: usize, slide_count: usize, columns: u32) -> String {
    let slides: String = (first_slide..first_slide.saturating_add(slide_count))
        .map(slide_html)
        .collect();
    format!(
        concat!(
            "<div class=\"bpr-reviews-slider-wrapper\" ",
            "data-slider-config='{{&quot;autoplay&quot;:false,&quot;columns&quot;:{columns}}}'>",
            "<div class=\"bpr-reviews-slider\">{slides}</div>",
            "<div class=\"bpr-slider-dots\"></div></div>"
        ),
        columns = columns,
        slides = slides,
    )
}

/// Renders a filterable list holding rating-5 cards with the given ids. A
/// list without more pages has no load-more container.
#[must_use]
pub fn list_section_html(staff_id: u64, ids: &[u64], has_more: bool) -> String {
    let cards: String = ids.iter().map(|id| list_card_html(*id, 5, "Sam")).collect();
    let load_more = if has_more {
        concat!(
            "<div class=\"bpr-load-more-container\"><button type=\"button\" class=\"bpr-load-more-btn\">",
            "<span class=\"bpr-load-more-text\">Load More</span></button></div>"
        )
    } else {
        ""
    };
    format!(
        concat!(
            "<div class=\"bpr-reviews-list-container\" data-per-page=\"5\" ",
            "data-staff-id=\"{staff_id}\" data-has-more=\"{has_more}\">",
            "<div class=\"bpr-reviews-list-wrapper\"><aside class=\"bpr-reviews-filter\">",
            "<div class=\"bpr-filter-options\">",
            "<label class=\"bpr-filter-option\"><input type=\"checkbox\" class=\"bpr-filter-checkbox\" ",
            "name=\"bpr_rating_filter\" value=\"5\" checked>",
            "<span class=\"bpr-filter-count\">\n {count} (100%)\n</span></label>",
            "</div></aside>",
            "<div class=\"bpr-reviews-list-content\"><div class=\"bpr-reviews-list\">",
            "{cards}</div>{load_more}</div></div></div>"
        ),
        staff_id = staff_id,
        has_more = has_more,
        count = ids.len(),
        cards = cards,
        load_more = load_more,
    )
}

/// Builds a card value without going through markup.
#[must_use]
pub fn card(id: u64, rating: u8) -> ReviewCard {
    ReviewCard {
        id: Some(id),
        rating_tenths: u16::from(rating).saturating_mul(10),
        title: Some(format!("Review {id}")),
        body: format!("Body of review {id}."),
        author: Some("Sam".to_owned()),
        date: Some("2 days ago".to_owned()),
    }
}

/// Builds a page of cards with sequential ids starting at `first_id`.
#[must_use]
pub fn page_of(first_id: u64, count: u64, has_more: bool) -> ReviewPage {
    ReviewPage {
        cards: (first_id..first_id.saturating_add(count))
            .map(|id| card(id, 5))
            .collect(),
        notice: None,
        has_more,
    }
}

/// A request observed by [`ScriptedProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedRequest {
    /// A filter request.
    Filter(FilterRequest),
    /// A load-more request.
    LoadMore(LoadMoreRequest),
}

/// Provider that replays queued outcomes and records every request.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    outcomes: Mutex<VecDeque<Result<ReviewPage, ReviewError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    /// Creates a provider that replays `outcomes` in order.
    #[must_use]
    pub fn new(outcomes: impl IntoIterator<Item = Result<ReviewPage, ReviewError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns every request seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn next_outcome(&self, request: RecordedRequest) -> Result<ReviewPage, ReviewError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.outcomes
            .lock()
            .ok()
            .and_then(|mut outcomes| outcomes.pop_front())
            .unwrap_or_else(|| {
                Err(ReviewError::Network {
                    message: "no scripted outcome left".to_owned(),
                })
            })
    }
}

#[async_trait]
impl ReviewProvider for ScriptedProvider {
    async fn filter(&self, request: &FilterRequest) -> Result<ReviewPage, ReviewError> {
        self.next_outcome(RecordedRequest::Filter(*request))
    }

    async fn load_more(&self, request: &LoadMoreRequest) -> Result<ReviewPage, ReviewError> {
        self.next_outcome(RecordedRequest::LoadMore(*request))
    }
}
