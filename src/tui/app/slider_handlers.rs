//! Slider input handlers.
//!
//! Buttons and dots act on the slider focused last. Arrow keys are
//! page-level events and reach every slider subscribed to them; each slider
//! ignores them unless it has focus.

use std::time::Instant;

use bubbletea_rs::Cmd;

use super::ReviewDeckApp;
use crate::tui::messages::AppMsg;
use crate::widgets::{NavKey, PageEventKind, Slider};

impl ReviewDeckApp {
    /// Dispatches slider messages to their handlers.
    pub(super) fn handle_slider_msg(&mut self, msg: &AppMsg, now: Instant) -> Option<Cmd> {
        match msg {
            AppMsg::SliderKey(key) => self.handle_slider_key(*key, now),
            AppMsg::SliderPrevious => {
                if let Some(slider) = self.current_slider_mut() {
                    slider.press_previous(now);
                }
                None
            }
            AppMsg::SliderNext => {
                if let Some(slider) = self.current_slider_mut() {
                    slider.press_next(now);
                }
                None
            }
            AppMsg::SliderDot(index) => {
                if let Some(slider) = self.current_slider_mut() {
                    slider.select_indicator(*index, now);
                }
                None
            }
            _ => {
                debug_assert!(false, "non-slider message routed to handle_slider_msg");
                None
            }
        }
    }

    fn current_slider_mut(&mut self) -> Option<&mut Slider> {
        self.sliders
            .get_mut(self.slider_cursor)
            .map(|pane| &mut pane.slider)
    }

    fn handle_slider_key(&mut self, key: NavKey, now: Instant) -> Option<Cmd> {
        for pane in &mut self.sliders {
            if self
                .registry
                .is_listening(pane.slider.subscriber(), PageEventKind::Key)
            {
                pane.slider.on_key(key, now);
            }
        }
        None
    }
}
