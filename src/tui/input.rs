//! Input handling for the TUI application.
//!
//! Digit keys mean different things depending on which widget has focus, so
//! mapping takes an [`InputContext`].

use crossterm::event::KeyCode;

use super::messages::AppMsg;
use crate::reviews::Rating;
use crate::widgets::NavKey;

/// Kind of widget holding keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputContext {
    /// The slider; digits select dots.
    Slider,
    /// The filterable list; digits toggle ratings.
    #[default]
    List,
}

/// Maps a key event to an application message.
///
/// Returns `None` for unrecognised key events, allowing them to be ignored.
#[must_use]
pub fn map_key_to_message_with_context(
    key: &bubbletea_rs::event::KeyMsg,
    context: InputContext,
) -> Option<AppMsg> {
    match key.key {
        KeyCode::Char('q') => Some(AppMsg::Quit),
        KeyCode::Char('?') => Some(AppMsg::ToggleHelp),
        KeyCode::Tab => Some(AppMsg::FocusNext),
        KeyCode::Left => Some(AppMsg::SliderKey(NavKey::Left)),
        KeyCode::Right => Some(AppMsg::SliderKey(NavKey::Right)),
        KeyCode::Char('[') => Some(AppMsg::SliderPrevious),
        KeyCode::Char(']') => Some(AppMsg::SliderNext),
        KeyCode::Char('m') => Some(AppMsg::LoadMore),
        KeyCode::Char('j') | KeyCode::Down => Some(AppMsg::ScrollDown),
        KeyCode::Char('k') | KeyCode::Up => Some(AppMsg::ScrollUp),
        KeyCode::Char(digit @ '1'..='9') => map_digit(digit, context),
        _ => None,
    }
}

fn map_digit(digit: char, context: InputContext) -> Option<AppMsg> {
    let value = u8::try_from(digit.to_digit(10)?).ok()?;
    match context {
        InputContext::Slider => Some(AppMsg::SliderDot(usize::from(value.saturating_sub(1)))),
        InputContext::List => Rating::new(value).map(AppMsg::ToggleRating),
    }
}
