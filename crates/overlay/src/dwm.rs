//! DWM thumbnail compositor

use geometry::{
    Compositor, CompositorError, CompositorResult, Rect, ThumbnailHandle, ThumbnailProperties,
    WindowHandle,
};
use windows::Win32::Foundation::{BOOL, HWND, POINT, RECT};
use windows::Win32::Graphics::Dwm::{
    DwmRegisterThumbnail, DwmUnregisterThumbnail, DwmUpdateThumbnailProperties,
    DWM_THUMBNAIL_PROPERTIES, DWM_TNP_OPACITY, DWM_TNP_RECTDESTINATION, DWM_TNP_RECTSOURCE,
    DWM_TNP_VISIBLE,
};
use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

/// Live thumbnails through the Desktop Window Manager
#[derive(Debug, Default)]
pub struct DwmCompositor;

impl DwmCompositor {
    pub fn new() -> Self {
        Self
    }
}

fn hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut std::ffi::c_void)
}

fn to_native(rect: &Rect) -> RECT {
    RECT {
        left: rect.x,
        top: rect.y,
        right: rect.right(),
        bottom: rect.bottom(),
    }
}

impl Compositor for DwmCompositor {
    fn register(
        &mut self,
        target: WindowHandle,
        source: WindowHandle,
    ) -> CompositorResult<ThumbnailHandle> {
        unsafe {
            DwmRegisterThumbnail(hwnd(target), hwnd(source))
                .map(ThumbnailHandle::from_raw)
                .map_err(|e| CompositorError::Rejected(e.to_string()))
        }
    }

    fn update(
        &mut self,
        thumbnail: &ThumbnailHandle,
        properties: &ThumbnailProperties,
    ) -> CompositorResult<()> {
        let props = DWM_THUMBNAIL_PROPERTIES {
            dwFlags: DWM_TNP_VISIBLE | DWM_TNP_RECTDESTINATION | DWM_TNP_OPACITY | DWM_TNP_RECTSOURCE,
            rcDestination: to_native(&properties.destination),
            rcSource: to_native(&properties.source),
            opacity: properties.opacity,
            fVisible: BOOL::from(properties.visible),
            fSourceClientAreaOnly: BOOL(0),
        };

        unsafe {
            DwmUpdateThumbnailProperties(thumbnail.raw(), &props)
                .map_err(|e| CompositorError::Rejected(e.to_string()))
        }
    }

    fn unregister(&mut self, thumbnail: ThumbnailHandle) -> CompositorResult<()> {
        unsafe {
            DwmUnregisterThumbnail(thumbnail.raw())
                .map_err(|e| CompositorError::Rejected(e.to_string()))
        }
    }

    fn cursor_position(&self) -> Option<(i32, i32)> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point).ok()? };
        Some((point.x, point.y))
    }
}
