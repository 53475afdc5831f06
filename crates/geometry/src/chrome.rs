//! Hover chrome visibility

use crate::Rect;

/// Chrome strip state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChromeState {
    #[default]
    Hidden,
    Visible,
}

/// Geometry change caused by showing or hiding the chrome.
///
/// Showing grows the window upward by the strip height so the content
/// stays where it was on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeDelta {
    pub content_offset: i32,
    pub top: i32,
    pub height: i32,
    pub min_height: i32,
}

impl ChromeDelta {
    fn show(chrome_height: i32) -> Self {
        Self {
            content_offset: chrome_height,
            top: -chrome_height,
            height: chrome_height,
            min_height: chrome_height,
        }
    }

    pub fn inverse(&self) -> Self {
        Self {
            content_offset: -self.content_offset,
            top: -self.top,
            height: -self.height,
            min_height: -self.min_height,
        }
    }
}

/// Hidden/Visible state machine driven by pointer enter and leave
#[derive(Debug, Clone)]
pub struct ChromeVisibilityController {
    state: ChromeState,
    chrome_height: i32,
}

impl ChromeVisibilityController {
    pub fn new(chrome_height: i32) -> Self {
        Self {
            state: ChromeState::Hidden,
            chrome_height,
        }
    }

    pub fn state(&self) -> ChromeState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == ChromeState::Visible
    }

    /// Vertical offset of the content area below the chrome
    pub fn content_offset(&self) -> i32 {
        match self.state {
            ChromeState::Hidden => 0,
            ChromeState::Visible => self.chrome_height,
        }
    }

    /// Show the chrome. `None` if it is already shown.
    pub fn pointer_enter(&mut self) -> Option<ChromeDelta> {
        if self.is_visible() {
            return None;
        }
        self.state = ChromeState::Visible;
        Some(ChromeDelta::show(self.chrome_height))
    }

    /// Hide the chrome if `cursor` has really left `bounds`.
    ///
    /// Leave events fire while the pointer crosses the strip itself, so the
    /// live cursor position decides; a cursor still inside keeps the chrome.
    pub fn pointer_leave(&mut self, cursor: (i32, i32), bounds: &Rect) -> Option<ChromeDelta> {
        if !self.is_visible() || bounds.contains(cursor.0, cursor.1) {
            return None;
        }
        self.state = ChromeState::Hidden;
        Some(ChromeDelta::show(self.chrome_height).inverse())
    }

    /// Drop back to hidden without emitting a delta.
    pub fn reset(&mut self) {
        self.state = ChromeState::Hidden;
    }
}
