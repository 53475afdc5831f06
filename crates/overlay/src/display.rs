//! Primary display bounds

use geometry::Size;
use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

/// Size of the primary display in physical pixels
pub fn primary_display_size() -> Size {
    unsafe {
        Size::new(
            GetSystemMetrics(SM_CXSCREEN).max(0) as u32,
            GetSystemMetrics(SM_CYSCREEN).max(0) as u32,
        )
    }
}
