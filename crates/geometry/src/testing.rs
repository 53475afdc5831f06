//! Recording compositor for tests

use crate::{
    Compositor, CompositorError, CompositorResult, ThumbnailHandle, ThumbnailProperties,
    WindowHandle,
};

/// Native call observed by [`RecordingCompositor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Register {
        target: WindowHandle,
        source: WindowHandle,
        thumbnail: isize,
    },
    Update {
        thumbnail: isize,
        properties: ThumbnailProperties,
    },
    Unregister {
        thumbnail: isize,
    },
}

/// In-memory compositor that records calls and can be told to fail
#[derive(Debug, Default)]
pub struct RecordingCompositor {
    calls: Vec<Call>,
    next_handle: isize,
    live: usize,
    reject_register: bool,
    reject_update: bool,
    cursor: Option<(i32, i32)>,
}

impl RecordingCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of registered, not yet released thumbnails
    pub fn live(&self) -> usize {
        self.live
    }

    pub fn reject_register(&mut self, reject: bool) {
        self.reject_register = reject;
    }

    pub fn reject_update(&mut self, reject: bool) {
        self.reject_update = reject;
    }

    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = Some((x, y));
    }

    /// Properties of the most recent update
    pub fn last_update(&self) -> Option<ThumbnailProperties> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::Update { properties, .. } => Some(*properties),
            _ => None,
        })
    }

    pub fn update_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Update { .. }))
            .count()
    }
}

impl Compositor for RecordingCompositor {
    fn register(
        &mut self,
        target: WindowHandle,
        source: WindowHandle,
    ) -> CompositorResult<ThumbnailHandle> {
        if self.reject_register {
            return Err(CompositorError::Rejected("source window is gone".into()));
        }
        self.next_handle += 1;
        self.live += 1;
        self.calls.push(Call::Register {
            target,
            source,
            thumbnail: self.next_handle,
        });
        Ok(ThumbnailHandle::from_raw(self.next_handle))
    }

    fn update(
        &mut self,
        thumbnail: &ThumbnailHandle,
        properties: &ThumbnailProperties,
    ) -> CompositorResult<()> {
        if self.reject_update {
            return Err(CompositorError::Rejected("update refused".into()));
        }
        self.calls.push(Call::Update {
            thumbnail: thumbnail.raw(),
            properties: *properties,
        });
        Ok(())
    }

    fn unregister(&mut self, thumbnail: ThumbnailHandle) -> CompositorResult<()> {
        self.live = self.live.saturating_sub(1);
        self.calls.push(Call::Unregister {
            thumbnail: thumbnail.raw(),
        });
        Ok(())
    }

    fn cursor_position(&self) -> Option<(i32, i32)> {
        self.cursor
    }
}
