//! Client-side widget state machines.
//!
//! Each widget is attached once, driven by input events and by
//! [`poll`](slider::Slider::poll) calls carrying the current time, and
//! disposed on teardown. None of them performs I/O or owns a timer thread,
//! which keeps them deterministic under test.

pub mod animator;
pub mod listeners;
pub mod review_list;
pub mod slider;

pub use animator::{AverageAnimator, CountUp, VerticalSpan};
pub use listeners::{ListenerRegistry, PageEventKind, SubscriberId, Subscription};
pub use review_list::{
    ListedCard, LoadMoreControl, PendingRequest, ReviewList, ReviewQuery, Ticket,
};
pub use slider::{Direction, NavControls, NavKey, Slider, columns_for_width};
