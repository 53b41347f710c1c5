//! One-shot count-up and bar-fill animation for the average widget.
//!
//! The animation starts the first time the widget overlaps the viewport and
//! never restarts. Rating bars jump to their share shortly after the start;
//! each number counts up from zero in about thirty steps over one second.

use std::time::{Duration, Instant};

use crate::reviews::{Rating, ReviewStats};

use super::listeners::{ListenerRegistry, PageEventKind, SubscriberId, Subscription};

/// Delay between the start of the animation and the bars filling.
pub const BAR_FILL_DELAY: Duration = Duration::from_millis(100);
/// Approximate duration of a count-up.
pub const COUNT_UP_DURATION: Duration = Duration::from_millis(1_000);
/// Number of steps a count-up aims for.
pub const COUNT_UP_STEPS: u64 = 30;

/// A vertical band of the page, in rows or pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerticalSpan {
    /// First row of the band.
    pub top: u32,
    /// Number of rows covered.
    pub height: u32,
}

impl VerticalSpan {
    /// Creates a span starting at `top`.
    #[must_use]
    pub const fn new(top: u32, height: u32) -> Self {
        Self { top, height }
    }

    /// Row just past the band.
    #[must_use]
    pub const fn bottom(self) -> u32 {
        self.top.saturating_add(self.height)
    }

    /// Whether the two bands share at least one row.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.bottom() > other.top && self.top < other.bottom()
    }
}

/// A number counting up from zero to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountUp {
    target: u64,
    increment: u64,
    step: Duration,
    shown: u64,
    next_at: Option<Instant>,
}

impl CountUp {
    /// Starts counting towards `target` at `now`. A zero target is finished
    /// immediately.
    #[must_use]
    pub fn start(target: u64, now: Instant) -> Self {
        let increment = target.div_ceil(COUNT_UP_STEPS).max(1);
        // Duration over the unrounded step count `target / increment`; the
        // final step is clamped to the target.
        let step = u64::try_from(COUNT_UP_DURATION.as_micros())
            .unwrap_or(u64::MAX)
            .saturating_mul(increment)
            .checked_div(target)
            .map_or(COUNT_UP_DURATION, Duration::from_micros);
        Self {
            target,
            increment,
            step,
            shown: 0,
            next_at: (target > 0).then(|| now + step),
        }
    }

    /// Advances through every step due by `now`. Returns whether the shown
    /// value changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let before = self.shown;
        while let Some(due) = self.next_at.filter(|due| *due <= now) {
            let advanced = self.shown.saturating_add(self.increment);
            if advanced >= self.target {
                self.shown = self.target;
                self.next_at = None;
            } else {
                self.shown = advanced;
                self.next_at = Some(due + self.step);
            }
        }
        self.shown != before
    }

    /// Value currently displayed.
    #[must_use]
    pub const fn shown(&self) -> u64 {
        self.shown
    }

    /// Final value.
    #[must_use]
    pub const fn target(&self) -> u64 {
        self.target
    }

    /// Amount added per step.
    #[must_use]
    pub const fn increment(&self) -> u64 {
        self.increment
    }

    /// Interval between steps.
    #[must_use]
    pub const fn step(&self) -> Duration {
        self.step
    }

    /// Whether the target has been reached.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.next_at.is_none()
    }
}

#[derive(Debug, Clone)]
struct Running {
    bars_due: Instant,
    bars_filled: bool,
    total: CountUp,
    recommend: CountUp,
    breakdown: Vec<(Rating, CountUp)>,
}

/// Animation state of one average widget.
#[derive(Debug)]
pub struct AverageAnimator {
    stats: ReviewStats,
    extent: VerticalSpan,
    running: Option<Running>,
    subscription: Subscription,
    disposed: bool,
}

impl AverageAnimator {
    /// Attaches to a widget occupying `extent` and checks it against the
    /// initial `viewport`.
    #[must_use]
    pub fn attach(
        stats: ReviewStats,
        extent: VerticalSpan,
        viewport: VerticalSpan,
        registry: &ListenerRegistry,
        now: Instant,
    ) -> Self {
        let mut animator = Self {
            stats,
            extent,
            running: None,
            subscription: registry.subscribe(&[PageEventKind::Scroll]),
            disposed: false,
        };
        animator.check_viewport(viewport, now);
        animator
    }

    /// Starts the animation when the widget first becomes visible. Returns
    /// true only on the call that starts it.
    pub fn check_viewport(&mut self, viewport: VerticalSpan, now: Instant) -> bool {
        if self.disposed || self.running.is_some() || !self.extent.overlaps(viewport) {
            return false;
        }
        self.running = Some(Running {
            bars_due: now + BAR_FILL_DELAY,
            bars_filled: false,
            total: CountUp::start(self.stats.total, now),
            recommend: CountUp::start(u64::from(self.stats.recommend_percentage), now),
            breakdown: self
                .stats
                .breakdown
                .iter()
                .map(|entry| (entry.rating, CountUp::start(entry.count, now)))
                .collect(),
        });
        tracing::debug!(total = self.stats.total, "average animation started");
        true
    }

    /// Moves the widget, for example after the layout changed.
    pub const fn relocate(&mut self, extent: VerticalSpan) {
        self.extent = extent;
    }

    /// Advances bars and counters. Returns whether anything visible changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.disposed {
            return false;
        }
        let Some(running) = self.running.as_mut() else {
            return false;
        };

        let mut changed = false;
        if !running.bars_filled && running.bars_due <= now {
            running.bars_filled = true;
            changed = true;
        }
        changed |= running.total.poll(now);
        changed |= running.recommend.poll(now);
        for (_, counter) in &mut running.breakdown {
            changed |= counter.poll(now);
        }
        changed
    }

    /// Releases the scroll subscription. Returns true only on the first call.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        self.subscription.release();
        true
    }

    /// Statistics being animated.
    #[must_use]
    pub const fn stats(&self) -> &ReviewStats {
        &self.stats
    }

    /// Current placement of the widget.
    #[must_use]
    pub const fn extent(&self) -> VerticalSpan {
        self.extent
    }

    /// Whether the animation has started.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.running.is_some()
    }

    /// Whether every part of the animation has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.running.as_ref().is_some_and(|running| {
            running.bars_filled
                && running.total.is_finished()
                && running.recommend.is_finished()
                && running
                    .breakdown
                    .iter()
                    .all(|(_, counter)| counter.is_finished())
        })
    }

    /// Subscription identifier for event dispatch.
    #[must_use]
    pub const fn subscriber(&self) -> SubscriberId {
        self.subscription.id()
    }

    /// Total review count as currently displayed.
    ///
    /// Before the animation starts the published value is shown as is.
    #[must_use]
    pub fn total_shown(&self) -> u64 {
        self.running
            .as_ref()
            .map_or(self.stats.total, |running| running.total.shown())
    }

    /// Recommend percentage as currently displayed.
    #[must_use]
    pub fn recommend_shown(&self) -> u64 {
        self.running.as_ref().map_or(
            u64::from(self.stats.recommend_percentage),
            |running| running.recommend.shown(),
        )
    }

    /// Count for `rating` as currently displayed.
    #[must_use]
    pub fn count_shown(&self, rating: Rating) -> u64 {
        self.running
            .as_ref()
            .and_then(|running| {
                running
                    .breakdown
                    .iter()
                    .find(|(entry, _)| *entry == rating)
                    .map(|(_, counter)| counter.shown())
            })
            .unwrap_or_else(|| self.stats.count_for(rating))
    }

    /// Width of the bar for `rating`, in percent of the full bar.
    ///
    /// Bars are empty until the fill delay passes.
    #[must_use]
    pub fn bar_percentage(&self, rating: Rating) -> u8 {
        let filled = self
            .running
            .as_ref()
            .is_none_or(|running| running.bars_filled);
        if !filled {
            return 0;
        }
        self.stats
            .breakdown
            .iter()
            .find(|entry| entry.rating == rating)
            .map_or(0, |entry| entry.percentage)
    }
}
