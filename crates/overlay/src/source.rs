//! Source window lookup

use crate::{OverlayError, OverlayResult};
use geometry::{Rect, SourceSelection, WindowHandle};
use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT};
use windows::Win32::Graphics::Dwm::{DwmGetWindowAttribute, DWMWA_CLOAKED};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetAncestor, GetForegroundWindow, GetWindow, GetWindowLongW, GetWindowRect,
    GetWindowTextW, IsIconic, IsWindow, IsWindowVisible, GA_ROOT, GWL_EXSTYLE, GWL_STYLE,
    GW_OWNER, WS_DISABLED, WS_EX_TOOLWINDOW,
};

/// Top-level window that can be mirrored
#[derive(Debug, Clone)]
pub struct WindowInfo {
    pub hwnd: isize,
    pub rect: Rect,
    pub title: String,
}

/// Enumerate candidate source windows in Z-order
pub fn enumerate_windows() -> Vec<WindowInfo> {
    let mut windows = Vec::new();

    unsafe {
        let _ = EnumWindows(
            Some(enum_window_callback),
            LPARAM(&mut windows as *mut Vec<WindowInfo> as isize),
        );
    }

    windows
}

unsafe extern "system" fn enum_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam.0 as *mut Vec<WindowInfo>);

    if is_candidate(hwnd) {
        if let Some(info) = window_info(hwnd) {
            windows.push(info);
        }
    }

    BOOL(1) // Continue enumeration
}

unsafe fn is_candidate(hwnd: HWND) -> bool {
    if !IsWindowVisible(hwnd).as_bool() || IsIconic(hwnd).as_bool() {
        return false;
    }

    let style = GetWindowLongW(hwnd, GWL_STYLE) as u32;
    if style & WS_DISABLED.0 != 0 {
        return false;
    }

    let ex_style = GetWindowLongW(hwnd, GWL_EXSTYLE) as u32;
    if ex_style & WS_EX_TOOLWINDOW.0 != 0 {
        return false;
    }

    // Cloaked windows live on another virtual desktop
    let mut cloaked: u32 = 0;
    if DwmGetWindowAttribute(
        hwnd,
        DWMWA_CLOAKED,
        &mut cloaked as *mut _ as *mut _,
        std::mem::size_of::<u32>() as u32,
    )
    .is_ok()
        && cloaked != 0
    {
        return false;
    }

    if let Ok(owner) = GetWindow(hwnd, GW_OWNER) {
        if !owner.is_invalid() {
            return false;
        }
    }

    if GetAncestor(hwnd, GA_ROOT) != hwnd {
        return false;
    }

    let mut rect = RECT::default();
    if GetWindowRect(hwnd, &mut rect).is_err() {
        return false;
    }

    rect.right - rect.left > 50 && rect.bottom - rect.top > 50
}

unsafe fn window_info(hwnd: HWND) -> Option<WindowInfo> {
    let mut rect = RECT::default();
    if GetWindowRect(hwnd, &mut rect).is_err() {
        return None;
    }

    let mut title_buf = [0u16; 512];
    let len = GetWindowTextW(hwnd, &mut title_buf);
    let title = if len > 0 {
        OsString::from_wide(&title_buf[..len as usize])
            .to_string_lossy()
            .into_owned()
    } else {
        String::new()
    };

    Some(WindowInfo {
        hwnd: hwnd.0 as isize,
        rect: Rect::new(
            rect.left,
            rect.top,
            (rect.right - rect.left) as u32,
            (rect.bottom - rect.top) as u32,
        ),
        title,
    })
}

/// First window in Z-order whose title contains `needle`, ignoring case
pub fn find_window_by_title<'a>(windows: &'a [WindowInfo], needle: &str) -> Option<&'a WindowInfo> {
    let needle = needle.to_lowercase();
    windows
        .iter()
        .find(|w| w.title.to_lowercase().contains(&needle))
}

/// Window the PiP session mirrors
#[derive(Debug, Clone)]
pub struct SourceWindow {
    info: WindowInfo,
}

impl SourceWindow {
    /// Match a window by title substring.
    pub fn by_title(needle: &str) -> OverlayResult<Self> {
        let windows = enumerate_windows();
        find_window_by_title(&windows, needle)
            .cloned()
            .map(|info| Self { info })
            .ok_or_else(|| OverlayError::NoSource(needle.to_string()))
    }

    /// Current foreground window, unless it is one of `exclude`.
    pub fn foreground(exclude: &[isize]) -> Option<Self> {
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.is_invalid() || exclude.contains(&(hwnd.0 as isize)) || !is_candidate(hwnd) {
                return None;
            }
            window_info(hwnd).map(|info| Self { info })
        }
    }

    pub fn info(&self) -> &WindowInfo {
        &self.info
    }

    pub fn handle(&self) -> WindowHandle {
        WindowHandle(self.info.hwnd)
    }

    pub fn is_alive(&self) -> bool {
        unsafe { IsWindow(HWND(self.info.hwnd as *mut std::ffi::c_void)).as_bool() }
    }

    /// Selection of `region` (window-local), or of the whole window.
    pub fn selection(&self, region: Option<Rect>) -> OverlayResult<SourceSelection> {
        if !self.is_alive() {
            return Err(OverlayError::InvalidSource);
        }
        let region = region.unwrap_or_else(|| {
            Rect::new(0, 0, self.info.rect.width, self.info.rect.height)
        });
        Ok(SourceSelection::new(self.handle(), region)?)
    }
}
