//! Reviewdeck library crate: a terminal client for the review widgets a
//! WordPress reviews plugin embeds in its pages.
//!
//! The library decodes the slider, filterable list, and average-reviews
//! markup from a page, talks to the plugin's AJAX endpoint for filtering
//! and pagination, and models each widget as a deterministic state machine
//! driven by explicit timestamps. The [`tui`] module hosts those widgets in
//! a bubbletea-rs terminal program.

pub mod config;
pub mod error;
pub mod reviews;
pub mod telemetry;
pub mod tui;
pub mod widgets;

pub use config::ReviewDeckConfig;
pub use error::ReviewError;
pub use reviews::{
    AjaxReviewGateway, PageContract, Rating, RatingSet, ReviewCard, ReviewPage, ReviewProvider,
    ReviewStats,
};
pub use telemetry::{
    JsonlTelemetrySink, NoopTelemetrySink, TelemetryEvent, TelemetrySink,
    TracingTelemetrySink, init_tracing,
};
pub use widgets::{AverageAnimator, ListenerRegistry, ReviewList, Slider};
