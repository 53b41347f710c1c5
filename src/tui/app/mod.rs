//! Main TUI application model implementing the MVU pattern.
//!
//! The app owns one widget per slider, list, and average widget found on the
//! page and forwards input to them. Page-level events (resize, arrow keys,
//! scroll) are delivered to every widget holding a live subscription for
//! that event kind in the shared [`ListenerRegistry`]; each widget decides
//! for itself whether the event concerns it.
//!
//! Focus moves through the sliders and then the lists. The focused slider
//! counts as hovered. Slider buttons act on the slider focused last, list
//! actions on the list focused last.
//!
//! # Module Structure
//!
//! - `slider_handlers`: slider buttons, dots, and arrow keys
//! - `list_handlers`: rating toggles, load more, and request commands
//! - `lifecycle_handlers`: ticks, resize, scroll, focus, and quit
//! - `rendering`: view rendering methods for terminal output
//! - `model_impl`: the `bubbletea_rs::Model` implementation

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bubbletea_rs::Cmd;

use super::InitialPage;
use super::input::InputContext;
use super::messages::AppMsg;
use crate::reviews::{RatingCount, ReviewCard, ReviewProvider};
use crate::widgets::{AverageAnimator, ListenerRegistry, ReviewList, Slider, VerticalSpan};

mod lifecycle_handlers;
mod list_handlers;
mod model_impl;
mod rendering;
mod slider_handlers;

/// Horizontal pixels represented by one terminal cell, used for the slider
/// breakpoints.
pub const PIXELS_PER_CELL: u32 = 8;

/// Interval between clock ticks driving the widget deadlines.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Rows taken by the header and the status bar.
const CHROME_ROWS: u16 = 2;

/// A slider with the slides it pages through.
#[derive(Debug)]
struct SliderPane {
    slider: Slider,
    slides: Vec<ReviewCard>,
    show_arrows: bool,
}

/// A filterable list with its sidebar counts.
#[derive(Debug)]
struct ListPane {
    list: ReviewList,
    rating_counts: Vec<RatingCount>,
}

/// Main application model for the review deck TUI.
pub struct ReviewDeckApp {
    registry: ListenerRegistry,
    sliders: Vec<SliderPane>,
    lists: Vec<ListPane>,
    averages: Vec<AverageAnimator>,
    provider: Option<Arc<dyn ReviewProvider>>,
    request_timeout: Duration,
    focus: InputContext,
    slider_cursor: usize,
    list_cursor: usize,
    scroll_offset: usize,
    width: u16,
    height: u16,
    show_help: bool,
}

impl fmt::Debug for ReviewDeckApp {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ReviewDeckApp")
            .field("sliders", &self.sliders)
            .field("lists", &self.lists)
            .field("averages", &self.averages)
            .field("focus", &self.focus)
            .field("slider_cursor", &self.slider_cursor)
            .field("list_cursor", &self.list_cursor)
            .field("scroll_offset", &self.scroll_offset)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl ReviewDeckApp {
    /// Attaches a widget for every section present on `page`.
    #[must_use]
    pub fn new(
        page: InitialPage,
        provider: Option<Arc<dyn ReviewProvider>>,
        now: Instant,
    ) -> Self {
        let registry = ListenerRegistry::new();
        let InitialPage {
            sliders,
            lists,
            stats,
            request_timeout,
        } = page;

        let sliders: Vec<SliderPane> = sliders
            .into_iter()
            .map(|markup| SliderPane {
                slider: Slider::attach(markup.settings, markup.cards.len(), &registry, now),
                slides: markup.cards,
                show_arrows: markup.show_arrows,
            })
            .collect();
        let lists: Vec<ListPane> = lists
            .into_iter()
            .map(|markup| ListPane {
                rating_counts: markup.rating_counts.clone(),
                list: ReviewList::attach(markup, request_timeout, now),
            })
            .collect();
        let mut app = Self {
            registry,
            sliders,
            lists,
            averages: Vec::new(),
            provider,
            request_timeout,
            focus: InputContext::List,
            slider_cursor: 0,
            list_cursor: 0,
            scroll_offset: 0,
            width: 80,
            height: 24,
            show_help: false,
        };
        let viewport = app.viewport();
        let averages: Vec<AverageAnimator> = stats
            .into_iter()
            .enumerate()
            .map(|(index, figures)| {
                AverageAnimator::attach(
                    figures,
                    app.average_extent(index),
                    viewport,
                    &app.registry,
                    now,
                )
            })
            .collect();
        app.averages = averages;
        app
    }

    /// Creates an app with no widgets.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(InitialPage::default(), None, Instant::now())
    }

    /// Handles a message using the current time.
    pub fn handle_message(&mut self, msg: &AppMsg) -> Option<Cmd> {
        self.handle_message_at(msg, Instant::now())
    }

    /// Handles a message as if it arrived at `now`.
    ///
    /// Delegates to specialised handlers for each message category.
    pub fn handle_message_at(&mut self, msg: &AppMsg, now: Instant) -> Option<Cmd> {
        if msg.is_slider() {
            return self.handle_slider_msg(msg, now);
        }
        if msg.is_list() {
            return self.handle_list_msg(msg, now);
        }
        if msg.is_page() {
            return self.handle_page_msg(msg, now);
        }
        self.handle_lifecycle_msg(msg, now)
    }

    /// Slider at `index` in document order.
    #[must_use]
    pub fn slider(&self, index: usize) -> Option<&Slider> {
        self.sliders.get(index).map(|pane| &pane.slider)
    }

    /// Filterable list at `index` in document order.
    #[must_use]
    pub fn list(&self, index: usize) -> Option<&ReviewList> {
        self.lists.get(index).map(|pane| &pane.list)
    }

    /// Average widget animator at `index` in document order.
    #[must_use]
    pub fn average(&self, index: usize) -> Option<&AverageAnimator> {
        self.averages.get(index)
    }

    /// Number of sliders on the page.
    #[must_use]
    pub const fn slider_count(&self) -> usize {
        self.sliders.len()
    }

    /// Number of filterable lists on the page.
    #[must_use]
    pub const fn list_count(&self) -> usize {
        self.lists.len()
    }

    /// Shared listener registry.
    #[must_use]
    pub const fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    /// Kind of widget holding keyboard focus.
    #[must_use]
    pub const fn focus(&self) -> InputContext {
        self.focus
    }

    /// Index of the focused slider, if a slider has focus.
    #[must_use]
    pub const fn focused_slider(&self) -> Option<usize> {
        if matches!(self.focus, InputContext::Slider) && self.slider_cursor < self.sliders.len() {
            Some(self.slider_cursor)
        } else {
            None
        }
    }

    /// Index of the focused list, if a list has focus.
    #[must_use]
    pub const fn focused_list(&self) -> Option<usize> {
        if matches!(self.focus, InputContext::List) && self.list_cursor < self.lists.len() {
            Some(self.list_cursor)
        } else {
            None
        }
    }

    /// First document row shown below the header.
    #[must_use]
    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Whether the help overlay is shown.
    #[must_use]
    pub const fn is_help_visible(&self) -> bool {
        self.show_help
    }

    /// Rows available to the scrolling document.
    pub(crate) const fn body_height(&self) -> u16 {
        self.height.saturating_sub(CHROME_ROWS)
    }

    /// Visible slice of the document as a vertical span.
    pub(crate) fn viewport(&self) -> VerticalSpan {
        VerticalSpan::new(
            u32::try_from(self.scroll_offset).unwrap_or(u32::MAX),
            u32::from(self.body_height()),
        )
    }

    /// Terminal width converted to viewport pixels.
    pub(crate) fn width_px(&self) -> u32 {
        u32::from(self.width).saturating_mul(PIXELS_PER_CELL)
    }
}
