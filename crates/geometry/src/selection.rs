//! Source selection handed over by the shell

use crate::{GeometryError, GeometryResult, Rect, WindowHandle};

/// Source window and the region of it to mirror.
///
/// Immutable once built; the crop pushed to the compositor never changes
/// for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSelection {
    source: WindowHandle,
    region: Rect,
    ratio: f64,
    inverse_ratio: f64,
}

impl SourceSelection {
    /// Build a selection, precomputing width/height and height/width.
    pub fn new(source: WindowHandle, region: Rect) -> GeometryResult<Self> {
        if region.is_empty() {
            return Err(GeometryError::EmptyRegion {
                width: region.width,
                height: region.height,
            });
        }

        let width = f64::from(region.width);
        let height = f64::from(region.height);

        Ok(Self {
            source,
            region,
            ratio: width / height,
            inverse_ratio: height / width,
        })
    }

    /// Source window handle
    pub fn source(&self) -> WindowHandle {
        self.source
    }

    /// Selected region in source-window-local coordinates
    pub fn region(&self) -> Rect {
        self.region
    }

    /// width / height
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// height / width
    pub fn inverse_ratio(&self) -> f64 {
        self.inverse_ratio
    }
}
