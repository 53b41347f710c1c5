//! Review data: records, page markup decoding, and the review providers.

pub mod gateway;
pub mod markup;
pub mod models;
pub mod page;
pub mod stars;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use gateway::{AjaxReviewGateway, ReviewProvider, fetch_page, resolve_endpoint};
pub use markup::{ReviewFragment, parse_cards, parse_fragment};
pub use models::{
    FilterRequest, LoadMoreRequest, Rating, RatingCount, RatingSet, ReviewCard, ReviewPage,
    ReviewStats,
};
pub use page::{AjaxContext, ListMarkup, PageContract, SliderMarkup, SliderSettings};
