//! Overlay module for the PiP tool
//!
//! Native side of a PiP session: the borderless topmost window, the DWM
//! thumbnail compositor and source window lookup.

#[cfg(windows)]
pub mod display;
#[cfg(windows)]
pub mod dwm;
#[cfg(windows)]
mod paint;
#[cfg(windows)]
pub mod source;
#[cfg(windows)]
pub mod window;

#[cfg(windows)]
pub use dwm::DwmCompositor;
#[cfg(windows)]
pub use source::{SourceWindow, WindowInfo};
#[cfg(windows)]
pub use window::PipWindow;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] geometry::GeometryError),

    #[error("No source window matches {0:?}")]
    NoSource(String),

    #[error("Source window is no longer valid")]
    InvalidSource,
}

pub type OverlayResult<T> = Result<T, OverlayError>;
