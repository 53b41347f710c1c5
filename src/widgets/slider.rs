//! Paginated review slider.
//!
//! A slider splits a fixed set of pre-rendered cards into pages of
//! `columns` cards. Navigation comes from the previous/next controls, page
//! indicators, arrow keys while the pointer is over the slider, and swipes.
//! Autoplay advances one page per interval until the user interacts.
//!
//! Every timer (autoplay, the 500 ms settle window after a page change, and
//! the 250 ms resize debounce) is a deadline checked by [`Slider::poll`], so
//! the state machine is driven entirely by the caller's clock.

use std::ops::Range;
use std::time::{Duration, Instant};

use crate::reviews::SliderSettings;

use super::listeners::{ListenerRegistry, PageEventKind, SubscriberId, Subscription};

/// Window after a page change during which further changes are ignored.
pub const SETTLE_WINDOW: Duration = Duration::from_millis(500);
/// Quiet period after the last resize before columns are recalculated.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);
/// Minimum horizontal travel, in pixels, for a drag to count as a swipe.
pub const SWIPE_THRESHOLD_PX: i32 = 50;

/// Direction of the most recent page change, used only for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Moving towards later pages.
    #[default]
    Forward,
    /// Moving towards earlier pages.
    Backward,
}

/// Arrow keys the slider reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
}

/// Enabled state of the previous/next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavControls {
    /// Whether the previous control can be used.
    pub previous_enabled: bool,
    /// Whether the next control can be used.
    pub next_enabled: bool,
}

/// Column count for a viewport width.
///
/// Narrow viewports cap the configured count: one column up to 480 px, two up
/// to 768 px, three up to 1024 px.
#[must_use]
pub fn columns_for_width(width_px: u32, configured: u32) -> u32 {
    let configured_columns = configured.max(1);
    match width_px {
        0..=480 => 1,
        481..=768 => configured_columns.min(2),
        769..=1024 => configured_columns.min(3),
        _ => configured_columns,
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingResize {
    width_px: u32,
    due: Instant,
}

/// State of one slider widget.
#[derive(Debug)]
pub struct Slider {
    settings: SliderSettings,
    card_count: usize,
    columns: usize,
    current_page: usize,
    total_pages: usize,
    direction: Direction,
    settle_until: Option<Instant>,
    autoplay_due: Option<Instant>,
    pointer_over: bool,
    pending_resize: Option<PendingResize>,
    subscription: Subscription,
    disposed: bool,
}

impl Slider {
    /// Attaches a slider over `card_count` cards and shows the first page.
    ///
    /// Autoplay starts when it is configured and there is more than one page.
    /// With no cards the slider is inert and every operation is a no-op.
    #[must_use]
    pub fn attach(
        settings: SliderSettings,
        card_count: usize,
        registry: &ListenerRegistry,
        now: Instant,
    ) -> Self {
        let columns = usize::try_from(settings.columns.max(1)).unwrap_or(1);
        let mut slider = Self {
            settings,
            card_count,
            columns,
            current_page: 0,
            total_pages: page_count(card_count, columns),
            direction: Direction::Forward,
            settle_until: None,
            autoplay_due: None,
            pointer_over: false,
            pending_resize: None,
            subscription: registry.subscribe(&[PageEventKind::Resize, PageEventKind::Key]),
            disposed: false,
        };
        slider.show_page(0, now);
        if settings.autoplay {
            slider.start_autoplay(now);
        }
        tracing::debug!(
            cards = card_count,
            columns,
            pages = slider.total_pages,
            autoplay = slider.is_autoplaying(),
            "slider attached"
        );
        slider
    }

    /// Shows page `index`.
    ///
    /// Ignored while the previous change is settling, when `index` is out of
    /// range, and after disposal. Returns whether the page was shown.
    pub fn show_page(&mut self, index: usize, now: Instant) -> bool {
        if self.is_settling(now) {
            return false;
        }
        self.display(index, now)
    }

    fn display(&mut self, index: usize, now: Instant) -> bool {
        if self.disposed || index >= self.total_pages {
            return false;
        }
        self.current_page = index;
        self.settle_until = Some(now + SETTLE_WINDOW);
        true
    }

    fn show_towards(&mut self, index: usize, direction: Direction, now: Instant) -> bool {
        let shown = self.show_page(index, now);
        if shown {
            self.direction = direction;
        }
        shown
    }

    /// Advances one page, wrapping to the first page only when autoplay is
    /// configured.
    pub fn next(&mut self, now: Instant) -> bool {
        if self.current_page.saturating_add(1) < self.total_pages {
            self.show_towards(self.current_page.saturating_add(1), Direction::Forward, now)
        } else if self.settings.autoplay {
            self.show_towards(0, Direction::Forward, now)
        } else {
            false
        }
    }

    /// Goes back one page. Does nothing on the first page.
    pub fn previous(&mut self, now: Instant) -> bool {
        if self.current_page == 0 {
            return false;
        }
        self.show_towards(self.current_page.saturating_sub(1), Direction::Backward, now)
    }

    /// Jumps to `index`, inferring the direction from the current page.
    pub fn go_to(&mut self, index: usize, now: Instant) -> bool {
        let direction = if index > self.current_page {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self.show_towards(index, direction, now)
    }

    /// Handles the next control. Stops autoplay.
    pub fn press_next(&mut self, now: Instant) -> bool {
        let shown = self.next(now);
        self.stop_autoplay();
        shown
    }

    /// Handles the previous control. Stops autoplay.
    pub fn press_previous(&mut self, now: Instant) -> bool {
        let shown = self.previous(now);
        self.stop_autoplay();
        shown
    }

    /// Handles a page indicator. Stops autoplay.
    pub fn select_indicator(&mut self, index: usize, now: Instant) -> bool {
        let shown = self.go_to(index, now);
        self.stop_autoplay();
        shown
    }

    /// Handles an arrow key. Only reacts while the pointer is over the
    /// slider; returns whether the key was consumed.
    pub fn on_key(&mut self, key: NavKey, now: Instant) -> bool {
        if self.disposed || !self.pointer_over {
            return false;
        }
        match key {
            NavKey::Left => self.previous(now),
            NavKey::Right => self.next(now),
        };
        self.stop_autoplay();
        true
    }

    /// Handles a horizontal drag from `start_x` to `end_x`.
    ///
    /// A leftward drag longer than [`SWIPE_THRESHOLD_PX`] advances, a
    /// rightward one goes back. Returns whether the drag counted as a swipe.
    pub fn swipe(&mut self, start_x: i32, end_x: i32, now: Instant) -> bool {
        if self.disposed {
            return false;
        }
        let travel = start_x.saturating_sub(end_x);
        if travel.saturating_abs() <= SWIPE_THRESHOLD_PX {
            return false;
        }
        if travel > 0 {
            self.next(now);
        } else {
            self.previous(now);
        }
        self.stop_autoplay();
        true
    }

    /// Pointer entered the slider: pause autoplay.
    pub fn pointer_enter(&mut self) {
        if self.disposed {
            return;
        }
        self.pointer_over = true;
        self.stop_autoplay();
    }

    /// Pointer left the slider: resume autoplay if it was configured.
    pub fn pointer_leave(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        self.pointer_over = false;
        if self.settings.autoplay {
            self.start_autoplay(now);
        }
    }

    /// Records a viewport resize. Columns are recalculated once no further
    /// resize arrives for [`RESIZE_DEBOUNCE`].
    pub fn on_resize(&mut self, width_px: u32, now: Instant) {
        if self.disposed {
            return;
        }
        self.pending_resize = Some(PendingResize {
            width_px,
            due: now + RESIZE_DEBOUNCE,
        });
    }

    /// Fires every deadline that has passed. Returns whether anything
    /// visible changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.disposed {
            return false;
        }
        if self.settle_until.is_some_and(|until| until <= now) {
            self.settle_until = None;
        }

        let mut changed = false;
        if let Some(pending) = self.pending_resize.filter(|pending| pending.due <= now) {
            self.pending_resize = None;
            changed |= self.apply_width(pending.width_px, now);
        }
        if let Some(due) = self.autoplay_due.filter(|due| *due <= now) {
            let following = due + self.autoplay_interval();
            self.autoplay_due = Some(if following <= now {
                now + self.autoplay_interval()
            } else {
                following
            });
            changed |= self.next(now);
        }
        changed
    }

    fn apply_width(&mut self, width_px: u32, now: Instant) -> bool {
        let target = columns_for_width(width_px, self.settings.columns);
        let new_columns = usize::try_from(target).unwrap_or(1);
        if new_columns == self.columns {
            return false;
        }

        self.columns = new_columns;
        self.total_pages = page_count(self.card_count, new_columns);
        self.current_page = self
            .current_page
            .min(self.total_pages.saturating_sub(1));
        // A column change must not be swallowed by an unrelated settle window.
        self.display(self.current_page, now);
        tracing::debug!(
            width_px,
            columns = new_columns,
            pages = self.total_pages,
            page = self.current_page,
            "slider columns recalculated"
        );
        true
    }

    fn start_autoplay(&mut self, now: Instant) {
        self.stop_autoplay();
        if self.disposed || self.total_pages <= 1 {
            return;
        }
        self.autoplay_due = Some(now + self.autoplay_interval());
    }

    const fn stop_autoplay(&mut self) {
        self.autoplay_due = None;
    }

    const fn autoplay_interval(&self) -> Duration {
        Duration::from_millis(self.settings.autoplay_speed_ms)
    }

    /// Releases the listener subscription and cancels every timer. Safe to
    /// call repeatedly; returns true only on the first call.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        self.stop_autoplay();
        self.pending_resize = None;
        self.settle_until = None;
        self.subscription.release();
        tracing::debug!("slider disposed");
        true
    }

    /// Settings the slider was attached with.
    #[must_use]
    pub const fn settings(&self) -> &SliderSettings {
        &self.settings
    }

    /// Number of cards being paginated.
    #[must_use]
    pub const fn card_count(&self) -> usize {
        self.card_count
    }

    /// Columns currently in effect.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Zero-based index of the visible page.
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Number of pages at the current column count.
    #[must_use]
    pub const fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Direction of the most recent page change.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether the slider has no cards to show.
    #[must_use]
    pub const fn is_inert(&self) -> bool {
        self.card_count == 0
    }

    /// Whether [`Slider::dispose`] has run.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Whether the pointer is over the slider.
    #[must_use]
    pub const fn pointer_over(&self) -> bool {
        self.pointer_over
    }

    /// Whether an autoplay deadline is armed.
    #[must_use]
    pub const fn is_autoplaying(&self) -> bool {
        self.autoplay_due.is_some()
    }

    /// Whether a page change is still settling at `now`.
    #[must_use]
    pub fn is_settling(&self, now: Instant) -> bool {
        self.settle_until.is_some_and(|until| now < until)
    }

    /// Subscription identifier for event dispatch.
    #[must_use]
    pub const fn subscriber(&self) -> SubscriberId {
        self.subscription.id()
    }

    /// Indices of the cards on the visible page.
    #[must_use]
    pub fn active_range(&self) -> Range<usize> {
        if self.total_pages == 0 {
            return 0..0;
        }
        let start = self.current_page.saturating_mul(self.columns);
        let end = start.saturating_add(self.columns).min(self.card_count);
        start..end
    }

    /// Whether card `index` is on the visible page.
    #[must_use]
    pub fn is_card_active(&self, index: usize) -> bool {
        self.active_range().contains(&index)
    }

    /// One entry per page, true for the visible page.
    #[must_use]
    pub fn indicators(&self) -> Vec<bool> {
        (0..self.total_pages)
            .map(|page| page == self.current_page)
            .collect()
    }

    /// Enabled state of the previous/next controls.
    ///
    /// Next stays enabled on the last page when autoplay is configured,
    /// because it wraps to the first page.
    #[must_use]
    pub const fn controls(&self) -> NavControls {
        let last_page = self.current_page.saturating_add(1) >= self.total_pages;
        NavControls {
            previous_enabled: self.current_page > 0,
            next_enabled: self.total_pages > 0 && (!last_page || self.settings.autoplay),
        }
    }
}

fn page_count(card_count: usize, columns: usize) -> usize {
    card_count.div_ceil(columns.max(1))
}

#[cfg(test)]
#[path = "slider_tests.rs"]
mod tests;
