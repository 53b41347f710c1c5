//! Message types for the TUI update loop.
//!
//! Messages represent user actions, async request results, and timer ticks.

use crate::error::ReviewError;
use crate::reviews::{Rating, ReviewPage};
use crate::widgets::{NavKey, Ticket};

/// Messages for the review deck application.
#[derive(Debug, Clone)]
pub enum AppMsg {
    // Slider
    /// Arrow key aimed at the slider.
    SliderKey(NavKey),
    /// The slider's previous button.
    SliderPrevious,
    /// The slider's next button.
    SliderNext,
    /// A slider dot, zero based.
    SliderDot(usize),

    // List
    /// Toggles a rating checkbox.
    ToggleRating(Rating),
    /// The list's load-more button.
    LoadMore,
    /// A list request finished.
    ReviewsLoaded {
        /// Index of the list that issued the request.
        list: usize,
        /// Ticket issued when the request started.
        ticket: Ticket,
        /// Decoded page or the failure.
        result: Result<ReviewPage, ReviewError>,
    },

    // Page
    /// Scroll the page down one row.
    ScrollDown,
    /// Scroll the page up one row.
    ScrollUp,
    /// Move focus to the next widget.
    FocusNext,

    // Application lifecycle
    /// Periodic clock tick.
    Tick,
    /// Quit the application.
    Quit,
    /// Toggle help overlay.
    ToggleHelp,
    /// Terminal window was resized.
    WindowResized {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },
}

impl AppMsg {
    /// Returns true for messages handled by the slider.
    #[must_use]
    pub const fn is_slider(&self) -> bool {
        matches!(
            self,
            Self::SliderKey(_) | Self::SliderPrevious | Self::SliderNext | Self::SliderDot(_)
        )
    }

    /// Returns true for messages handled by the filterable list.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(
            self,
            Self::ToggleRating(_) | Self::LoadMore | Self::ReviewsLoaded { .. }
        )
    }

    /// Returns true for page scrolling and focus messages.
    #[must_use]
    pub const fn is_page(&self) -> bool {
        matches!(self, Self::ScrollDown | Self::ScrollUp | Self::FocusNext)
    }
}
