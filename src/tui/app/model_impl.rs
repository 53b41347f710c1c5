//! `Model` trait implementation for the review deck application.

use std::any::Any;
use std::time::Instant;

use bubbletea_rs::{Cmd, Model};

use super::ReviewDeckApp;
use crate::tui::input::map_key_to_message_with_context;
use crate::tui::messages::AppMsg;
use crate::tui::text::fit_to_width;

impl Model for ReviewDeckApp {
    fn init() -> (Self, Option<Cmd>) {
        let page = crate::tui::initial_page();
        let now = Instant::now();
        let mut model = Self::new(page, crate::tui::review_provider(), now);
        let mut cmds = model.startup_requests(now);
        if cmds.is_empty() {
            return (model, Some(Self::arm_tick()));
        }
        cmds.push(Self::arm_tick());
        (model, Some(bubbletea_rs::batch(cmds)))
    }

    fn update(&mut self, msg: Box<dyn Any + Send>) -> Option<Cmd> {
        if let Some(app_msg) = msg.downcast_ref::<AppMsg>() {
            return self.handle_message(app_msg);
        }

        if let Some(key_msg) = msg.downcast_ref::<bubbletea_rs::event::KeyMsg>() {
            if self.show_help {
                return self.handle_message(&AppMsg::ToggleHelp);
            }
            let mapped = map_key_to_message_with_context(key_msg, self.focus)?;
            return self.handle_message(&mapped);
        }

        if let Some(size_msg) = msg.downcast_ref::<bubbletea_rs::event::WindowSizeMsg>() {
            let resize_msg = AppMsg::WindowResized {
                width: size_msg.width,
                height: size_msg.height,
            };
            return self.handle_message(&resize_msg);
        }

        None
    }

    fn view(&self) -> String {
        if self.show_help {
            return self.normalise_viewport(&self.render_help_overlay());
        }

        let mut output = self.render_header();
        for line in self.visible_lines() {
            output.push_str(&line);
            output.push('\n');
        }
        output.push_str(&self.render_status_bar());

        self.normalise_viewport(&output)
    }
}

impl ReviewDeckApp {
    /// Pads or clamps every row to one column less than the terminal width,
    /// and the frame to the terminal height, so stale cells are cleared.
    fn normalise_viewport(&self, output: &str) -> String {
        let safe_width = usize::from(self.width).saturating_sub(1).max(1);
        let height = usize::from(self.height.max(1));

        let mut lines: Vec<String> = output
            .lines()
            .map(|line| fit_to_width(line, safe_width))
            .collect();
        lines.truncate(height);
        lines.resize(height, " ".repeat(safe_width));

        let mut normalised = lines.join("\n");
        normalised.push('\n');
        normalised
    }
}
