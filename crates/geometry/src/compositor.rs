//! Live thumbnail binding against the window compositor

use crate::{CompositorError, CompositorResult, Rect, WindowHandle};
use tracing::{debug, warn};

/// Registered thumbnail. Not `Clone`: only the binding ever holds it.
#[derive(Debug, PartialEq, Eq)]
pub struct ThumbnailHandle(isize);

impl ThumbnailHandle {
    /// Wrap a raw handle returned by the native registration call.
    pub fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> isize {
        self.0
    }
}

/// Properties pushed to the compositor, always as one set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailProperties {
    /// Where the thumbnail is drawn, relative to the overlay's client area
    pub destination: Rect,
    /// Crop of the source window
    pub source: Rect,
    pub opacity: u8,
    pub visible: bool,
}

/// Native window-compositing service
pub trait Compositor {
    /// Register a thumbnail of `source` drawn inside `target`.
    fn register(
        &mut self,
        target: WindowHandle,
        source: WindowHandle,
    ) -> CompositorResult<ThumbnailHandle>;

    /// Push visibility, destination, opacity and source crop together.
    fn update(
        &mut self,
        thumbnail: &ThumbnailHandle,
        properties: &ThumbnailProperties,
    ) -> CompositorResult<()>;

    fn unregister(&mut self, thumbnail: ThumbnailHandle) -> CompositorResult<()>;

    /// Live cursor position in screen coordinates
    fn cursor_position(&self) -> Option<(i32, i32)>;
}

/// Owns at most one live thumbnail
#[derive(Debug)]
pub struct ThumbnailBinding<C: Compositor> {
    compositor: C,
    thumbnail: Option<ThumbnailHandle>,
    pair: Option<(WindowHandle, WindowHandle)>,
}

impl<C: Compositor> ThumbnailBinding<C> {
    pub fn new(compositor: C) -> Self {
        Self {
            compositor,
            thumbnail: None,
            pair: None,
        }
    }

    /// Register against `(target, source)` and push `properties` right away.
    ///
    /// Any live thumbnail is released first. A failed initial update still
    /// leaves the registration in place; it is logged and the next update
    /// makes the thumbnail appear.
    pub fn register(
        &mut self,
        target: WindowHandle,
        source: WindowHandle,
        properties: &ThumbnailProperties,
    ) -> CompositorResult<()> {
        self.unregister();

        if target.is_null() {
            return Err(CompositorError::InvalidHandle("overlay window not realized"));
        }
        if source.is_null() {
            return Err(CompositorError::InvalidHandle("source window not resolved"));
        }

        let thumbnail = self.compositor.register(target, source)?;
        debug!(
            thumbnail = thumbnail.raw(),
            target = target.0,
            source = source.0,
            "thumbnail registered"
        );
        self.thumbnail = Some(thumbnail);
        self.pair = Some((target, source));

        if let Err(e) = self.update(properties) {
            warn!("initial thumbnail update failed: {e}");
        }

        Ok(())
    }

    /// Push `properties` to the live thumbnail; nothing to do without one.
    pub fn update(&mut self, properties: &ThumbnailProperties) -> CompositorResult<()> {
        match self.thumbnail.as_ref() {
            Some(thumbnail) => self.compositor.update(thumbnail, properties),
            None => Ok(()),
        }
    }

    /// Release the live thumbnail, if any.
    pub fn unregister(&mut self) {
        self.pair = None;
        if let Some(thumbnail) = self.thumbnail.take() {
            let raw = thumbnail.raw();
            match self.compositor.unregister(thumbnail) {
                Ok(()) => debug!(thumbnail = raw, "thumbnail unregistered"),
                Err(e) => warn!(thumbnail = raw, "unregister failed: {e}"),
            }
        }
    }

    pub fn is_registered(&self) -> bool {
        self.thumbnail.is_some()
    }

    /// `(target, source)` of the live thumbnail
    pub fn pair(&self) -> Option<(WindowHandle, WindowHandle)> {
        self.pair
    }

    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut C {
        &mut self.compositor
    }
}

impl<C: Compositor> Drop for ThumbnailBinding<C> {
    fn drop(&mut self) {
        self.unregister();
    }
}
