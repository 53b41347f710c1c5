//! Lifecycle, clock, and page event handlers.
//!
//! The clock tick drives every widget deadline. Resize and scroll events are
//! forwarded only to widgets subscribed to them.

use std::any::Any;
use std::time::Instant;

use bubbletea_rs::Cmd;

use super::{ReviewDeckApp, TICK_INTERVAL};
use crate::tui::input::InputContext;
use crate::tui::messages::AppMsg;
use crate::widgets::PageEventKind;

impl ReviewDeckApp {
    /// Dispatches scrolling and focus messages.
    pub(super) fn handle_page_msg(&mut self, msg: &AppMsg, now: Instant) -> Option<Cmd> {
        match msg {
            AppMsg::ScrollDown => self.scroll_to(self.scroll_offset.saturating_add(1), now),
            AppMsg::ScrollUp => self.scroll_to(self.scroll_offset.saturating_sub(1), now),
            AppMsg::FocusNext => self.handle_focus_next(now),
            _ => {
                debug_assert!(false, "non-page message routed to handle_page_msg");
                None
            }
        }
    }

    /// Dispatches lifecycle and window messages.
    pub(super) fn handle_lifecycle_msg(&mut self, msg: &AppMsg, now: Instant) -> Option<Cmd> {
        match msg {
            AppMsg::Tick => self.handle_tick(now),
            AppMsg::Quit => self.handle_quit(),
            AppMsg::ToggleHelp => {
                self.show_help = !self.show_help;
                None
            }
            AppMsg::WindowResized { width, height } => self.handle_resize(*width, *height, now),
            _ => {
                debug_assert!(false, "non-lifecycle message routed to handle_lifecycle_msg");
                None
            }
        }
    }

    /// Fires due widget deadlines and re-arms the clock.
    #[expect(
        clippy::unnecessary_wraps,
        reason = "Returns Option<Cmd> for consistency with other message handlers"
    )]
    fn handle_tick(&mut self, now: Instant) -> Option<Cmd> {
        for pane in &mut self.sliders {
            pane.slider.poll(now);
        }
        for pane in &mut self.lists {
            pane.list.poll(now);
        }
        let extents = self.average_extents();
        for (average, extent) in self.averages.iter_mut().zip(extents) {
            average.relocate(extent);
            average.poll(now);
        }
        self.clamp_scroll();
        Some(Self::arm_tick())
    }

    fn handle_resize(&mut self, width: u16, height: u16, now: Instant) -> Option<Cmd> {
        self.width = width;
        self.height = height;
        let width_px = self.width_px();
        for pane in &mut self.sliders {
            if self
                .registry
                .is_listening(pane.slider.subscriber(), PageEventKind::Resize)
            {
                pane.slider.on_resize(width_px, now);
            }
        }
        self.clamp_scroll();
        None
    }

    #[expect(
        clippy::unnecessary_wraps,
        reason = "Returns Option<Cmd> for consistency with other message handlers"
    )]
    fn handle_quit(&mut self) -> Option<Cmd> {
        for pane in &mut self.sliders {
            pane.slider.dispose();
        }
        for pane in &mut self.lists {
            pane.list.dispose();
        }
        for average in &mut self.averages {
            average.dispose();
        }
        Some(bubbletea_rs::quit())
    }

    /// Moves focus to the next slider, then through the lists, and back.
    /// Focusing a slider counts as the pointer entering it.
    #[expect(
        clippy::unnecessary_wraps,
        reason = "Returns Option<Cmd> for consistency with other message handlers"
    )]
    fn handle_focus_next(&mut self, now: Instant) -> Option<Cmd> {
        let previous = self.focused_slider();
        match self.focus {
            InputContext::Slider if self.slider_cursor.saturating_add(1) < self.sliders.len() => {
                self.slider_cursor = self.slider_cursor.saturating_add(1);
            }
            InputContext::List if self.list_cursor.saturating_add(1) < self.lists.len() => {
                self.list_cursor = self.list_cursor.saturating_add(1);
            }
            InputContext::Slider => {
                self.focus = InputContext::List;
                self.list_cursor = 0;
            }
            InputContext::List => {
                if !self.sliders.is_empty() {
                    self.focus = InputContext::Slider;
                    self.slider_cursor = 0;
                }
                self.list_cursor = 0;
            }
        }

        let current = self.focused_slider();
        if previous != current {
            if let Some(pane) = previous.and_then(|index| self.sliders.get_mut(index)) {
                pane.slider.pointer_leave(now);
            }
            if let Some(pane) = current.and_then(|index| self.sliders.get_mut(index)) {
                pane.slider.pointer_enter();
            }
        }
        None
    }

    fn scroll_to(&mut self, offset: usize, now: Instant) -> Option<Cmd> {
        self.scroll_offset = offset.min(self.max_scroll());
        let extents = self.average_extents();
        let viewport = self.viewport();
        for (average, extent) in self.averages.iter_mut().zip(extents) {
            if self
                .registry
                .is_listening(average.subscriber(), PageEventKind::Scroll)
            {
                average.relocate(extent);
                average.check_viewport(viewport, now);
            }
        }
        None
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    fn max_scroll(&self) -> usize {
        self.document_lines()
            .len()
            .saturating_sub(usize::from(self.body_height()))
    }

    /// Creates a command that delivers the next clock tick.
    pub(super) fn arm_tick() -> Cmd {
        Box::pin(async {
            tokio::time::sleep(TICK_INTERVAL).await;
            Some(Box::new(AppMsg::Tick) as Box<dyn Any + Send>)
        })
    }
}
