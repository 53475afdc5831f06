//! Geometry and compositor binding engine for the PiP overlay
//!
//! Derives the overlay frame from a selected source region, keeps the live
//! compositor thumbnail in sync with it, enforces the aspect ratio during
//! resize and toggles the hover chrome without breaking the ratio.

pub mod chrome;
pub mod compositor;
pub mod config;
pub mod controller;
pub mod notify;
pub mod selection;
pub mod solver;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use chrome::{ChromeDelta, ChromeState, ChromeVisibilityController};
pub use compositor::{Compositor, ThumbnailBinding, ThumbnailHandle, ThumbnailProperties};
pub use config::PipConfig;
pub use controller::{
    GeometryController, LeaveCheck, OverlayFrame, OverlayGeometry, SessionState, SizeChange,
};
pub use notify::{NotificationGate, SuspendScope};
pub use selection::SourceSelection;
pub use solver::Axis;

use thiserror::Error;

/// Failures reported by the native compositor collaborator.
///
/// Both variants are recovered locally: the session keeps running and the
/// next geometry event tries again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositorError {
    #[error("Invalid window handle: {0}")]
    InvalidHandle(&'static str),

    #[error("Compositor rejected the request: {0}")]
    Rejected(String),
}

pub type CompositorResult<T> = Result<T, CompositorError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{operation} is not valid while the session is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("Source region is empty ({width}x{height})")]
    EmptyRegion { width: u32, height: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type GeometryResult<T> = Result<T, GeometryError>;

/// Native window handle as an opaque integer, zero meaning "not realized"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub const NULL: WindowHandle = WindowHandle(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// How a session ended, reported back to the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// User closed the overlay
    Closed,
    /// User asked to pick another source window
    SourceChangeRequested,
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Rectangle in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add_unsigned(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add_unsigned(self.height)
    }

    /// Edges count as inside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
