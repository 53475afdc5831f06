//! GDI painting for the chrome strip

use windows::Win32::Foundation::{COLORREF, HWND, RECT};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateSolidBrush, DeleteObject, EndPaint, FillRect, GetStockObject, SetBkMode,
    SetTextColor, TextOutW, BLACK_BRUSH, HBRUSH, HDC, PAINTSTRUCT, TRANSPARENT,
};
use windows::Win32::UI::WindowsAndMessaging::GetClientRect;

const STRIP_COLOR: COLORREF = COLORREF(0x00202020);
const GLYPH_COLOR: COLORREF = COLORREF(0x00E0E0E0);

/// Button in the chrome strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeButton {
    ChangeSource,
    Close,
}

impl ChromeButton {
    fn glyph(self) -> &'static str {
        match self {
            ChromeButton::ChangeSource => "\u{21C4}",
            ChromeButton::Close => "\u{2715}",
        }
    }

    /// Client-area slot of the button; square slots packed from the right edge.
    fn slot(self, width: i32, chrome_height: i32) -> RECT {
        let index = match self {
            ChromeButton::Close => 1,
            ChromeButton::ChangeSource => 2,
        };
        RECT {
            left: width - index * chrome_height,
            top: 0,
            right: width - (index - 1) * chrome_height,
            bottom: chrome_height,
        }
    }
}

/// Button under a client-area point, if the strip is showing.
pub fn button_at(x: i32, y: i32, width: i32, chrome_height: i32) -> Option<ChromeButton> {
    if chrome_height <= 0 || y < 0 || y >= chrome_height {
        return None;
    }
    [ChromeButton::Close, ChromeButton::ChangeSource]
        .into_iter()
        .find(|button| {
            let slot = button.slot(width, chrome_height);
            x >= slot.left && x < slot.right
        })
}

/// Paint the window background, plus the strip when `chrome_height` is non-zero.
pub fn paint(hwnd: HWND, chrome_height: i32) {
    unsafe {
        let mut ps = PAINTSTRUCT::default();
        let hdc = BeginPaint(hwnd, &mut ps);

        let mut client = RECT::default();
        let _ = GetClientRect(hwnd, &mut client);
        FillRect(hdc, &client, HBRUSH(GetStockObject(BLACK_BRUSH).0));

        if chrome_height > 0 {
            draw_strip(hdc, client.right, chrome_height);
        }

        let _ = EndPaint(hwnd, &ps);
    }
}

unsafe fn draw_strip(hdc: HDC, width: i32, chrome_height: i32) {
    let brush = CreateSolidBrush(STRIP_COLOR);
    let strip = RECT {
        left: 0,
        top: 0,
        right: width,
        bottom: chrome_height,
    };
    FillRect(hdc, &strip, brush);
    let _ = DeleteObject(brush);

    SetBkMode(hdc, TRANSPARENT);
    SetTextColor(hdc, GLYPH_COLOR);

    for button in [ChromeButton::ChangeSource, ChromeButton::Close] {
        let slot = button.slot(width, chrome_height);
        let text: Vec<u16> = button.glyph().encode_utf16().collect();
        // Rough centering; default GUI font glyphs are ~8x16
        let _ = TextOutW(
            hdc,
            slot.left + (chrome_height - 8) / 2,
            (chrome_height - 16) / 2,
            &text,
        );
    }
}
