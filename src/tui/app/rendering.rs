//! Rendering logic for the review deck application.
//!
//! The page is rendered as one scrolling document (sliders, lists, average
//! widgets) between a fixed header and status bar. These are pure query
//! methods that read state without modification.

use crate::reviews::stars::{format_tenths, stars};
use crate::reviews::{Rating, ReviewCard};
use crate::tui::input::InputContext;
use crate::tui::text::{fit_to_width, wrap_words};
use crate::widgets::{AverageAnimator, Slider, VerticalSpan};

use super::{ListPane, ReviewDeckApp, SliderPane};

/// Rows rendered by the average section.
pub(super) const AVERAGE_ROWS: u32 = 10;

const BAR_WIDTH: usize = 20;
const COLUMN_GAP: usize = 2;

impl ReviewDeckApp {
    /// Renders the header with the compact form of the first average.
    pub(super) fn render_header(&self) -> String {
        let mut header = "ReviewDeck".to_owned();
        if let Some(average) = self.averages.first() {
            let figures = average.stats();
            header.push_str(&format!(
                "  {} {} Based on {} reviews",
                format_tenths(figures.average_tenths),
                stars(figures.average_tenths),
                figures.total
            ));
        }
        if self.lists.iter().any(|pane| pane.list.is_loading()) {
            header.push_str(" [Loading...]");
        }
        header.push('\n');
        header
    }

    /// Renders the status bar with help hints.
    pub(super) fn render_status_bar(&self) -> String {
        let hints = match self.focus {
            InputContext::Slider => "Tab:next  \u{2190}/\u{2192}:slide  1-9:dot  [/]:prev/next  ?:help  q:quit",
            InputContext::List => "Tab:next  1-5:filter  m:more  j/k:scroll  ?:help  q:quit",
        };
        format!("{hints}\n")
    }

    /// Every row of the scrolling document.
    pub(super) fn document_lines(&self) -> Vec<String> {
        let mut lines = self.widget_lines();
        for average in &self.averages {
            lines.extend(average_lines(average));
        }
        lines
    }

    /// Slider and list sections, which sit above the average widgets.
    fn widget_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .sliders
            .iter()
            .enumerate()
            .flat_map(|(index, pane)| self.render_slider_section(index, pane))
            .collect();
        for (index, pane) in self.lists.iter().enumerate() {
            lines.extend(self.render_list_section(index, pane));
        }
        lines
    }

    /// Rows of the document currently on screen, padded to the body height.
    pub(super) fn visible_lines(&self) -> Vec<String> {
        let body = usize::from(self.body_height());
        let mut lines: Vec<String> = self
            .document_lines()
            .into_iter()
            .skip(self.scroll_offset)
            .take(body)
            .collect();
        lines.resize(body, String::new());
        lines
    }

    /// Where the average section at `index` sits in the document.
    pub(super) fn average_extent(&self, index: usize) -> VerticalSpan {
        average_span(self.widget_lines().len(), index)
    }

    /// Where every average section sits in the document.
    pub(super) fn average_extents(&self) -> Vec<VerticalSpan> {
        let above = self.widget_lines().len();
        (0..self.averages.len())
            .map(|index| average_span(above, index))
            .collect()
    }

    fn render_slider_section(&self, index: usize, pane: &SliderPane) -> Vec<String> {
        let slider = &pane.slider;
        let marker = focus_marker(self.focused_slider() == Some(index));
        let mut lines = vec![format!(
            "{marker}{} {}",
            section_title("Review slider", index, self.sliders.len()),
            page_position(slider)
        )];
        if slider.is_inert() {
            lines.push("  No reviews yet.".to_owned());
            lines.push(String::new());
            return lines;
        }

        let width = usize::from(self.width).saturating_sub(1).max(1);
        let columns = slider.columns().max(1);
        let column_width = width
            .saturating_sub(COLUMN_GAP.saturating_mul(columns.saturating_sub(1)))
            .checked_div(columns)
            .unwrap_or(width)
            .max(1);
        let blocks: Vec<Vec<String>> = pane
            .slides
            .get(slider.active_range())
            .unwrap_or_default()
            .iter()
            .map(|card| card_lines(card, column_width))
            .collect();
        let rows = blocks.iter().map(Vec::len).max().unwrap_or(0);
        let gap = " ".repeat(COLUMN_GAP);
        for row in 0..rows {
            let cells: Vec<String> = blocks
                .iter()
                .map(|block| fit_to_width(block.get(row).map_or("", String::as_str), column_width))
                .collect();
            lines.push(cells.join(&gap).trim_end().to_owned());
        }

        lines.push(render_indicators(slider));
        if pane.show_arrows {
            let controls = slider.controls();
            lines.push(format!(
                "{} prev   next {}",
                if controls.previous_enabled { "[<]" } else { "[ ]" },
                if controls.next_enabled { "[>]" } else { "[ ]" }
            ));
        }
        lines.push(String::new());
        lines
    }

    fn render_list_section(&self, index: usize, pane: &ListPane) -> Vec<String> {
        let list = &pane.list;
        let marker = focus_marker(self.focused_list() == Some(index));
        let mut lines = vec![format!(
            "{marker}{}",
            section_title("Reviews", index, self.lists.len())
        )];

        let toggles: Vec<String> = Rating::DESCENDING
            .into_iter()
            .map(|rating| {
                let mark = if list.selected().contains(rating) { 'x' } else { ' ' };
                pane.rating_counts
                    .iter()
                    .find(|entry| entry.rating == rating)
                    .map_or_else(
                        || format!("[{mark}] {}\u{2605}", rating.get()),
                        |entry| {
                            format!(
                                "[{mark}] {}\u{2605} {} ({}%)",
                                rating.get(),
                                entry.count,
                                entry.percentage
                            )
                        },
                    )
            })
            .collect();
        lines.push(format!("  {}", toggles.join("  ")));
        if list.overlay_visible() {
            lines.push("  Filtering...".to_owned());
        }

        let width = usize::from(self.width).saturating_sub(3).max(1);
        for card in list.revealed_cards() {
            lines.extend(card_lines(card, width).into_iter().map(|line| format!("  {line}")));
            lines.push(String::new());
        }
        if let Some(placeholder) = list.placeholder() {
            lines.push(format!("  {placeholder}"));
        }

        let control = list.load_more_control();
        if control.visible {
            lines.push(format!("  [ {} ]", control.label));
        }
        lines.push(String::new());
        lines
    }

    /// Renders the help overlay.
    pub(super) fn render_help_overlay(&self) -> String {
        if !self.show_help {
            return String::new();
        }

        let help_text = r"
=== Keyboard Shortcuts ===

Focus:
  Tab          Move focus to the next slider or list

Slider (focused):
  Left/Right   Previous/next page
  1-9          Jump to page
  [ / ]        Previous/next button

List:
  1-5          Toggle rating filter
  m            Load more reviews

Page:
  j, Down      Scroll down
  k, Up        Scroll up
  ?            Toggle this help
  q            Quit

Press any key to close this help.
";
        help_text.to_owned()
    }
}

fn average_span(above: usize, index: usize) -> VerticalSpan {
    let offset = u32::try_from(above)
        .unwrap_or(u32::MAX)
        .saturating_add(AVERAGE_ROWS.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX)));
    VerticalSpan::new(offset, AVERAGE_ROWS)
}

const fn focus_marker(focused: bool) -> &'static str {
    if focused { "> " } else { "  " }
}

/// Numbers section titles once a page holds more than one of a kind.
fn section_title(name: &str, index: usize, count: usize) -> String {
    if count > 1 {
        format!("{name} {}", index.saturating_add(1))
    } else {
        name.to_owned()
    }
}

fn page_position(slider: &Slider) -> String {
    if slider.is_inert() {
        return String::new();
    }
    let autoplay = if slider.is_autoplaying() { " (auto)" } else { "" };
    format!(
        "{}/{}{autoplay}",
        slider.current_page().saturating_add(1),
        slider.total_pages()
    )
}

fn render_indicators(slider: &Slider) -> String {
    let dots: Vec<&str> = slider
        .indicators()
        .into_iter()
        .map(|active| if active { "\u{25cf}" } else { "\u{25cb}" })
        .collect();
    format!("  {}", dots.join(" "))
}

/// Lays out one review card at `width` cells.
fn card_lines(card: &ReviewCard, width: usize) -> Vec<String> {
    let mut rating = stars(card.rating_tenths);
    if let Some(date) = &card.date {
        rating.push_str("  ");
        rating.push_str(date);
    }
    let mut lines = wrap_words(&rating, width);
    if let Some(title) = &card.title {
        lines.extend(wrap_words(title, width));
    }
    lines.extend(wrap_words(&card.body, width));
    if let Some(author) = &card.author {
        lines.extend(wrap_words(&format!("- {author}"), width));
    }
    lines
}

/// Rows of the average section; always [`AVERAGE_ROWS`] long.
pub(super) fn average_lines(average: &AverageAnimator) -> Vec<String> {
    let figures = average.stats();
    let mut lines = vec![
        "  Average rating".to_owned(),
        format!(
            "  {} {}",
            format_tenths(figures.average_tenths),
            stars(figures.average_tenths)
        ),
        format!("  Based on {} reviews", average.total_shown()),
        format!(
            "  {}% of customers recommend us",
            average.recommend_shown()
        ),
    ];
    lines.extend(Rating::DESCENDING.into_iter().map(|rating| {
        format!(
            "  {}\u{2605} {} {}",
            rating.get(),
            bar(average.bar_percentage(rating)),
            average.count_shown(rating)
        )
    }));
    lines.push(String::new());
    lines
}

fn bar(percentage: u8) -> String {
    let filled = usize::from(percentage.min(100))
        .saturating_mul(BAR_WIDTH)
        .checked_div(100)
        .unwrap_or(0);
    let mut rendered = "\u{2588}".repeat(filled);
    rendered.push_str(&"\u{2591}".repeat(BAR_WIDTH.saturating_sub(filled)));
    rendered
}
