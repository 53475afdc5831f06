//! PiP overlay window

use crate::{
    display::primary_display_size,
    dwm::DwmCompositor,
    paint::{self, ChromeButton},
    OverlayResult,
};
use geometry::{
    Axis, GeometryController, LeaveCheck, NotificationGate, OverlayFrame, PipConfig, SessionEnd,
    SizeChange, SourceSelection, WindowHandle,
};
use once_cell::sync::OnceCell;
use std::cell::RefCell;
use tracing::{debug, info};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetStockObject, InvalidateRect, BLACK_BRUSH, HBRUSH};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    ReleaseCapture, TrackMouseEvent, TME_LEAVE, TME_NONCLIENT, TRACKMOUSEEVENT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
    GetWindowRect, KillTimer, LoadCursorW, RegisterClassExW, SendMessageW, SetTimer,
    SetWindowPos, ShowWindow, TranslateMessage, CS_HREDRAW, CS_VREDRAW, HTBOTTOM,
    HTBOTTOMLEFT, HTBOTTOMRIGHT, HTCAPTION, HTCLIENT, HTLEFT, HTRIGHT, HTTOP, HTTOPLEFT,
    HTTOPRIGHT, IDC_ARROW, MINMAXINFO, MSG, SIZE_MINIMIZED, SWP_NOACTIVATE, SWP_NOZORDER,
    SW_SHOWNOACTIVATE, WM_CLOSE, WM_DESTROY, WM_GETMINMAXINFO, WM_KEYDOWN, WM_LBUTTONDOWN,
    WM_LBUTTONUP, WM_MOUSEMOVE, WM_MOVE, WM_NCCALCSIZE, WM_NCHITTEST, WM_NCLBUTTONDOWN,
    WM_NCMOUSEMOVE, WM_PAINT, WM_SIZE, WM_TIMER, WNDCLASSEXW, WS_EX_TOOLWINDOW, WS_EX_TOPMOST,
    WS_POPUP, WS_THICKFRAME,
};

const WM_NCMOUSELEAVE: u32 = 0x02A2;
const WM_MOUSELEAVE: u32 = 0x02A3;

const LEAVE_TIMER_ID: usize = 1;
const RESIZE_BORDER: i32 = 6;

thread_local! {
    static PIP_STATE: RefCell<Option<Box<PipState>>> = RefCell::new(None);
}

struct PipState {
    controller: GeometryController<DwmCompositor>,
    gate: NotificationGate,
    pending_leave: Option<LeaveCheck>,
    tracking: bool,
    tracking_nc: bool,
    outcome: Option<SessionEnd>,
}

impl PipState {
    fn new(config: PipConfig) -> Self {
        let controller = GeometryController::new(config, DwmCompositor::new());
        let gate = controller.notifications();
        Self {
            controller,
            gate,
            pending_leave: None,
            tracking: false,
            tracking_nc: false,
            outcome: None,
        }
    }

    fn button_at(&self, x: i32, y: i32) -> Option<ChromeButton> {
        paint::button_at(
            x,
            y,
            self.controller.geometry().width,
            self.controller.content_offset(),
        )
    }

    fn finish(&mut self, outcome: SessionEnd) {
        if self.outcome.is_none() {
            info!(?outcome, "overlay session ending");
            self.outcome = Some(outcome);
        }
    }
}

/// Run `f` against the session state.
///
/// `None` when no session is running or the state is already borrowed
/// further up the stack (a native call re-entered the window procedure).
fn with_state<R>(f: impl FnOnce(&mut PipState) -> R) -> Option<R> {
    PIP_STATE.with(|s| {
        let mut guard = s.try_borrow_mut().ok()?;
        guard.as_mut().map(|state| f(state))
    })
}

static CLASS: OnceCell<()> = OnceCell::new();

/// Borderless, topmost PiP window
pub struct PipWindow;

impl PipWindow {
    const CLASS_NAME: PCWSTR = w!("PipToolOverlay");

    fn register_class(hinstance: HINSTANCE) -> OverlayResult<()> {
        CLASS
            .get_or_try_init(|| -> OverlayResult<()> {
                let wc = WNDCLASSEXW {
                    cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                    style: CS_HREDRAW | CS_VREDRAW,
                    lpfnWndProc: Some(Self::wnd_proc),
                    hInstance: hinstance,
                    hCursor: unsafe { LoadCursorW(None, IDC_ARROW)? },
                    hbrBackground: unsafe { HBRUSH(GetStockObject(BLACK_BRUSH).0) },
                    lpszClassName: Self::CLASS_NAME,
                    ..Default::default()
                };
                unsafe { RegisterClassExW(&wc) };
                Ok(())
            })
            .copied()
    }

    /// Show a PiP overlay of `selection` and pump messages until the user
    /// closes it or asks for another source.
    pub fn run(selection: SourceSelection, config: PipConfig) -> OverlayResult<SessionEnd> {
        unsafe {
            let hmodule = GetModuleHandleW(None)?;
            let hinstance = HINSTANCE(hmodule.0);
            Self::register_class(hinstance)?;

            let (left, top) = config.initial_position;
            let initial = config.min_size;

            PIP_STATE.with(|s| {
                *s.borrow_mut() = Some(Box::new(PipState::new(config)));
            });

            let hwnd = match CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
                Self::CLASS_NAME,
                w!("PiP"),
                WS_POPUP | WS_THICKFRAME,
                left,
                top,
                initial,
                initial,
                None,
                None,
                hinstance,
                None,
            ) {
                Ok(hwnd) => hwnd,
                Err(e) => {
                    PIP_STATE.with(|s| *s.borrow_mut() = None);
                    return Err(e.into());
                }
            };
            let target = WindowHandle(hwnd.0 as isize);

            let bound = with_state(|state| {
                state.controller.on_loaded(target);
                let frame = state
                    .controller
                    .init(selection, target, primary_display_size());
                (frame, state.gate.clone())
            });

            match bound {
                Some((Ok(frame), gate)) => apply_frame(hwnd, &frame, &gate),
                Some((Err(e), _)) => {
                    let _ = Self::teardown(hwnd);
                    return Err(e.into());
                }
                None => {}
            }

            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);

            let mut msg = MSG::default();
            loop {
                let ret = GetMessageW(&mut msg, None, 0, 0);
                if !ret.as_bool() {
                    break;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);

                let done = with_state(|state| state.outcome.is_some()).unwrap_or(true);
                if done {
                    break;
                }
            }

            let outcome = Self::teardown(hwnd).unwrap_or(SessionEnd::Closed);
            Ok(outcome)
        }
    }

    unsafe fn teardown(hwnd: HWND) -> Option<SessionEnd> {
        let mut state = PIP_STATE.with(|s| s.borrow_mut().take());
        if let Some(state) = state.as_mut() {
            state.controller.close();
        }
        let _ = KillTimer(hwnd, LEAVE_TIMER_ID);
        let _ = DestroyWindow(hwnd);

        state?.outcome
    }

    unsafe extern "system" fn wnd_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            // Client area covers the whole window
            WM_NCCALCSIZE if wparam.0 != 0 => LRESULT(0),

            WM_NCHITTEST => LRESULT(Self::hit_test(hwnd, lparam) as isize),

            WM_GETMINMAXINFO => {
                let info = lparam.0 as *mut MINMAXINFO;
                if let Some((min_width, min_height)) = with_state(|state| {
                    let g = state.controller.geometry();
                    (g.min_width, g.min_height)
                }) {
                    if let Some(info) = info.as_mut() {
                        info.ptMinTrackSize.x = min_width;
                        info.ptMinTrackSize.y = min_height;
                    }
                }
                LRESULT(0)
            }

            WM_SIZE => {
                if wparam.0 as u32 != SIZE_MINIMIZED {
                    let (width, height) = loword_hiword(lparam);
                    Self::handle_size(hwnd, width, height);
                }
                LRESULT(0)
            }

            WM_MOVE => {
                let (left, top) = signed_point(lparam);
                with_state(|state| state.controller.on_moved(left, top));
                LRESULT(0)
            }

            WM_MOUSEMOVE => {
                Self::handle_pointer_enter(hwnd, false);
                LRESULT(0)
            }

            WM_NCMOUSEMOVE => {
                Self::handle_pointer_enter(hwnd, true);
                DefWindowProcW(hwnd, msg, wparam, lparam)
            }

            WM_MOUSELEAVE | WM_NCMOUSELEAVE => {
                Self::handle_pointer_leave(hwnd, msg == WM_NCMOUSELEAVE);
                LRESULT(0)
            }

            WM_TIMER if wparam.0 == LEAVE_TIMER_ID => {
                let _ = KillTimer(hwnd, LEAVE_TIMER_ID);
                let hidden = with_state(|state| {
                    let check = state.pending_leave.take()?;
                    let frame = state.controller.run_leave_check(check)?;
                    Some((frame, state.gate.clone()))
                })
                .flatten();
                if let Some((frame, gate)) = hidden {
                    apply_frame(hwnd, &frame, &gate);
                }
                LRESULT(0)
            }

            WM_LBUTTONDOWN => {
                let (x, y) = signed_point(lparam);
                let on_button = with_state(|state| state.button_at(x, y).is_some());
                if on_button == Some(false) {
                    // DragMove
                    let _ = ReleaseCapture();
                    let _ = SendMessageW(
                        hwnd,
                        WM_NCLBUTTONDOWN,
                        WPARAM(HTCAPTION as usize),
                        LPARAM(0),
                    );
                }
                LRESULT(0)
            }

            WM_LBUTTONUP => {
                let (x, y) = signed_point(lparam);
                with_state(|state| match state.button_at(x, y) {
                    Some(ChromeButton::Close) => state.finish(SessionEnd::Closed),
                    Some(ChromeButton::ChangeSource) => {
                        state.finish(SessionEnd::SourceChangeRequested)
                    }
                    None => {}
                });
                LRESULT(0)
            }

            WM_KEYDOWN => {
                const VK_ESCAPE: usize = 0x1B;
                if wparam.0 == VK_ESCAPE {
                    with_state(|state| state.finish(SessionEnd::Closed));
                }
                LRESULT(0)
            }

            WM_PAINT => {
                let chrome_height =
                    with_state(|state| state.controller.content_offset()).unwrap_or(0);
                paint::paint(hwnd, chrome_height);
                LRESULT(0)
            }

            WM_CLOSE => {
                with_state(|state| state.finish(SessionEnd::Closed));
                LRESULT(0)
            }

            WM_DESTROY => LRESULT(0),

            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }

    unsafe fn hit_test(hwnd: HWND, lparam: LPARAM) -> u32 {
        let (x, y) = signed_point(lparam);
        let mut rect = RECT::default();
        if GetWindowRect(hwnd, &mut rect).is_err() {
            return HTCLIENT;
        }
        let chrome_height = with_state(|state| state.controller.content_offset()).unwrap_or(0);

        hit_zone(
            x - rect.left,
            y - rect.top,
            rect.right - rect.left,
            rect.bottom - rect.top,
            chrome_height,
        )
    }

    unsafe fn handle_size(hwnd: HWND, width: i32, height: i32) {
        let corrected = with_state(|state| {
            let current = state.controller.geometry();
            // Width wins when both changed (corner drag)
            let axis = if width != current.width {
                Axis::Width
            } else if height != current.height {
                Axis::Height
            } else {
                return None;
            };
            let frame = state
                .controller
                .on_size_changed(SizeChange { axis, width, height })?;
            Some((frame, state.gate.clone()))
        })
        .flatten();

        if let Some((frame, gate)) = corrected {
            apply_frame(hwnd, &frame, &gate);
        }
    }

    unsafe fn handle_pointer_enter(hwnd: HWND, nonclient: bool) {
        let entered = with_state(|state| {
            let tracking = if nonclient {
                &mut state.tracking_nc
            } else {
                &mut state.tracking
            };
            if *tracking {
                return None;
            }
            *tracking = true;
            state.pending_leave = None;
            let frame = state.controller.on_pointer_enter();
            Some((frame, state.gate.clone()))
        })
        .flatten();

        let Some((frame, gate)) = entered else {
            return;
        };

        let mut tme = TRACKMOUSEEVENT {
            cbSize: std::mem::size_of::<TRACKMOUSEEVENT>() as u32,
            dwFlags: if nonclient {
                TME_LEAVE | TME_NONCLIENT
            } else {
                TME_LEAVE
            },
            hwndTrack: hwnd,
            dwHoverTime: 0,
        };
        let _ = TrackMouseEvent(&mut tme);

        if let Some(frame) = frame {
            apply_frame(hwnd, &frame, &gate);
        }
    }

    unsafe fn handle_pointer_leave(hwnd: HWND, nonclient: bool) {
        let check = with_state(|state| {
            if nonclient {
                state.tracking_nc = false;
            } else {
                state.tracking = false;
            }
            let check = state.controller.on_pointer_leave()?;
            state.pending_leave = Some(check);
            Some(check)
        })
        .flatten();

        if let Some(check) = check {
            let delay = check.delay().as_millis().min(u32::MAX as u128) as u32;
            let _ = SetTimer(hwnd, LEAVE_TIMER_ID, delay, None);
        }
    }
}

/// Move and resize the native window to `frame`.
///
/// Size and move notifications caused by this call are suppressed; the
/// session state must not be borrowed by the caller.
unsafe fn apply_frame(hwnd: HWND, frame: &OverlayFrame, gate: &NotificationGate) {
    debug!(?frame, "applying overlay frame");
    {
        let _scope = gate.suspend();
        let _ = SetWindowPos(
            hwnd,
            None,
            frame.left,
            frame.top,
            frame.width,
            frame.height,
            SWP_NOZORDER | SWP_NOACTIVATE,
        );
    }
    let _ = InvalidateRect(hwnd, None, true);
}

/// Hit-test code for a window-relative point.
///
/// Chrome buttons take precedence over the resize border they overlap.
fn hit_zone(x: i32, y: i32, width: i32, height: i32, chrome_height: i32) -> u32 {
    if paint::button_at(x, y, width, chrome_height).is_some() {
        return HTCLIENT;
    }

    let left = x < RESIZE_BORDER;
    let right = x >= width - RESIZE_BORDER;
    let top = y < RESIZE_BORDER;
    let bottom = y >= height - RESIZE_BORDER;

    match (top, bottom, left, right) {
        (true, _, true, _) => HTTOPLEFT,
        (true, _, _, true) => HTTOPRIGHT,
        (_, true, true, _) => HTBOTTOMLEFT,
        (_, true, _, true) => HTBOTTOMRIGHT,
        (true, _, _, _) => HTTOP,
        (_, true, _, _) => HTBOTTOM,
        (_, _, true, _) => HTLEFT,
        (_, _, _, true) => HTRIGHT,
        _ => HTCLIENT,
    }
}

fn loword_hiword(lparam: LPARAM) -> (i32, i32) {
    ((lparam.0 & 0xFFFF) as i32, ((lparam.0 >> 16) & 0xFFFF) as i32)
}

fn signed_point(lparam: LPARAM) -> (i32, i32) {
    (
        (lparam.0 & 0xFFFF) as i16 as i32,
        ((lparam.0 >> 16) & 0xFFFF) as i16 as i32,
    )
}
