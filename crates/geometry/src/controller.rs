//! Session orchestrator
//!
//! [`GeometryController`] owns the authoritative overlay rectangle. The
//! shell feeds it native events and applies the [`OverlayFrame`] it hands
//! back; after every geometry change the controller pushes exactly one
//! compositor update.

use crate::{
    chrome::{ChromeDelta, ChromeState, ChromeVisibilityController},
    compositor::{Compositor, ThumbnailBinding, ThumbnailProperties},
    config::PipConfig,
    notify::NotificationGate,
    selection::SourceSelection,
    solver::{self, Axis, Constraints},
    GeometryError, GeometryResult, Rect, Size, WindowHandle,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Bound,
    TornDown,
}

/// Overlay window rectangle and size floor, in screen pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayGeometry {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub min_width: i32,
    pub min_height: i32,
    /// Top of the content area below the chrome strip
    pub content_offset: i32,
}

impl OverlayGeometry {
    /// Bounding rectangle in screen coordinates
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.width.max(0) as u32,
            self.height.max(0) as u32,
        )
    }

    fn apply(&mut self, delta: &ChromeDelta) {
        self.content_offset = self.content_offset.saturating_add(delta.content_offset);
        self.top = self.top.saturating_add(delta.top);
        self.height = self.height.saturating_add(delta.height);
        self.min_height = self.min_height.saturating_add(delta.min_height);
    }
}

/// Frame the shell applies to the native overlay window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayFrame {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub chrome_visible: bool,
}

/// Size reported by the native window after a user resize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeChange {
    pub axis: Axis,
    pub width: i32,
    pub height: i32,
}

/// Deferred cursor re-check after a pointer leave.
///
/// The shell schedules it on its event loop after [`LeaveCheck::delay`] and
/// hands it back to [`GeometryController::run_leave_check`]. A later enter,
/// leave or close makes it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveCheck {
    generation: u64,
    delay: Duration,
}

impl LeaveCheck {
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Geometry state machine for one overlay session
#[derive(Debug)]
pub struct GeometryController<C: Compositor> {
    config: PipConfig,
    state: SessionState,
    selection: Option<SourceSelection>,
    target: WindowHandle,
    geometry: OverlayGeometry,
    chrome: ChromeVisibilityController,
    binding: ThumbnailBinding<C>,
    gate: NotificationGate,
    leave_generation: u64,
}

impl<C: Compositor> GeometryController<C> {
    pub fn new(config: PipConfig, compositor: C) -> Self {
        let min_size = config.min_size;
        let chrome = ChromeVisibilityController::new(config.chrome_height);
        Self {
            config,
            state: SessionState::Uninitialized,
            selection: None,
            target: WindowHandle::NULL,
            geometry: OverlayGeometry {
                min_width: min_size,
                min_height: min_size,
                ..Default::default()
            },
            chrome,
            binding: ThumbnailBinding::new(compositor),
            gate: NotificationGate::new(),
            leave_generation: 0,
        }
    }

    /// Bind the session to `selection` and size the overlay for `display`.
    ///
    /// A null `target` falls back to the handle from an earlier
    /// [`on_loaded`](Self::on_loaded). Compositor failures are logged and
    /// do not fail the call.
    pub fn init(
        &mut self,
        selection: SourceSelection,
        target: WindowHandle,
        display: Size,
    ) -> GeometryResult<OverlayFrame> {
        self.expect_state("init", SessionState::Uninitialized)?;

        if !target.is_null() {
            self.target = target;
        }

        {
            let _scope = self.gate.suspend();
            let region = selection.region().size();
            let ratio = selection.ratio();

            self.chrome.reset();
            let (min_width, min_height) = solver::min_size_for(region, ratio, self.config.min_size);
            let (width, height) = solver::default_size_for(
                region,
                display,
                ratio,
                self.config.default_size_percentage,
            );
            let (left, top) = self.config.initial_position;

            self.geometry = OverlayGeometry {
                left,
                top,
                width: width.max(min_width),
                height: height.max(min_height),
                min_width,
                min_height,
                content_offset: 0,
            };
            self.selection = Some(selection);
            self.state = SessionState::Bound;
        }

        info!(
            width = self.geometry.width,
            height = self.geometry.height,
            min_width = self.geometry.min_width,
            min_height = self.geometry.min_height,
            "overlay session bound"
        );

        self.register();
        Ok(self.frame())
    }

    /// Overlay window realized (or re-created) with `target`.
    ///
    /// Registers the thumbnail if the session is bound and no thumbnail is
    /// live for this target yet.
    pub fn on_loaded(&mut self, target: WindowHandle) {
        match self.state {
            SessionState::Uninitialized => self.target = target,
            SessionState::Bound => {
                let current = self.binding.pair().map(|(t, _)| t);
                if current != Some(target) {
                    self.target = target;
                    self.register();
                }
            }
            SessionState::TornDown => {}
        }
    }

    /// User resized the overlay.
    ///
    /// The changed axis is held at its floor and the other one follows the
    /// ratio. Returns the frame to apply, or `None` when the event is
    /// ignored (not bound, or feedback from a frame being applied).
    pub fn on_size_changed(&mut self, change: SizeChange) -> Option<OverlayFrame> {
        if self.state != SessionState::Bound || self.gate.is_suspended() {
            return None;
        }

        let constraints = self.constraints();
        let (width, height) = match change.axis {
            Axis::Width => {
                let width = change.width.max(constraints.min_width);
                (width, constraints.solve(Axis::Width, width))
            }
            Axis::Height => {
                let height = change.height.max(constraints.min_height);
                (constraints.solve(Axis::Height, height), height)
            }
        };

        debug!(axis = ?change.axis, width, height, "resize corrected");
        self.apply_geometry_change(|g| {
            g.width = width;
            g.height = height;
        });
        Some(self.frame())
    }

    /// User dragged the overlay to `(left, top)`.
    pub fn on_moved(&mut self, left: i32, top: i32) {
        if self.state != SessionState::Bound || self.gate.is_suspended() {
            return;
        }
        if self.geometry.left == left && self.geometry.top == top {
            return;
        }
        self.apply_geometry_change(|g| {
            g.left = left;
            g.top = top;
        });
    }

    /// Pointer entered the overlay: show the chrome.
    pub fn on_pointer_enter(&mut self) -> Option<OverlayFrame> {
        if self.state != SessionState::Bound {
            return None;
        }
        // A pending hide must not fire after this.
        self.leave_generation += 1;

        let delta = self.chrome.pointer_enter()?;
        debug!(?delta, "chrome shown");
        self.apply_geometry_change(|g| g.apply(&delta));
        Some(self.frame())
    }

    /// Pointer left the overlay: ask the shell to re-check shortly.
    ///
    /// `None` when there is nothing to hide.
    pub fn on_pointer_leave(&mut self) -> Option<LeaveCheck> {
        if self.state != SessionState::Bound || !self.chrome.is_visible() {
            return None;
        }
        self.leave_generation += 1;
        Some(LeaveCheck {
            generation: self.leave_generation,
            delay: self.config.hover_settle,
        })
    }

    /// Run a deferred leave check against the live cursor position.
    pub fn run_leave_check(&mut self, check: LeaveCheck) -> Option<OverlayFrame> {
        if self.state != SessionState::Bound || check.generation != self.leave_generation {
            debug!("stale leave check dropped");
            return None;
        }
        let Some(cursor) = self.binding.compositor().cursor_position() else {
            warn!("cursor position unavailable, chrome stays up until the next leave");
            return None;
        };
        self.on_pointer_left_at(cursor)
    }

    /// Hide the chrome if `cursor` is outside the overlay bounds.
    pub fn on_pointer_left_at(&mut self, cursor: (i32, i32)) -> Option<OverlayFrame> {
        if self.state != SessionState::Bound {
            return None;
        }
        let bounds = self.geometry.bounds();
        let delta = self.chrome.pointer_leave(cursor, &bounds)?;
        debug!(?delta, ?cursor, "chrome hidden");
        self.apply_geometry_change(|g| g.apply(&delta));
        Some(self.frame())
    }

    /// End the session and release the thumbnail. Returns `false` if the
    /// session had already ended.
    pub fn close(&mut self) -> bool {
        if self.state == SessionState::TornDown {
            return false;
        }
        self.binding.unregister();
        self.leave_generation += 1;
        self.state = SessionState::TornDown;
        info!("overlay session closed");
        true
    }

    /// Batch one geometry change and push a single compositor update.
    pub fn apply_geometry_change(&mut self, change: impl FnOnce(&mut OverlayGeometry)) {
        {
            let _scope = self.gate.suspend();
            change(&mut self.geometry);
        }
        debug_assert_eq!(self.geometry.content_offset, self.chrome.content_offset());
        self.push_update();
    }

    pub fn frame(&self) -> OverlayFrame {
        let g = &self.geometry;
        OverlayFrame {
            left: g.left,
            top: g.top,
            width: g.width,
            height: g.height,
            min_width: g.min_width,
            min_height: g.min_height,
            chrome_visible: self.chrome.is_visible(),
        }
    }

    /// Thumbnail properties for the current geometry; `None` before init.
    pub fn thumbnail_properties(&self) -> Option<ThumbnailProperties> {
        let selection = self.selection.as_ref()?;
        let g = &self.geometry;
        let offset = g.content_offset;
        Some(ThumbnailProperties {
            destination: Rect::new(
                0,
                offset,
                g.width.max(0) as u32,
                g.height.saturating_sub(offset).max(0) as u32,
            ),
            source: selection.region(),
            opacity: self.config.opacity,
            visible: true,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn geometry(&self) -> &OverlayGeometry {
        &self.geometry
    }

    pub fn chrome_state(&self) -> ChromeState {
        self.chrome.state()
    }

    pub fn content_offset(&self) -> i32 {
        self.geometry.content_offset
    }

    pub fn selection(&self) -> Option<&SourceSelection> {
        self.selection.as_ref()
    }

    /// Gate the shell holds while it applies a frame to the native window
    pub fn notifications(&self) -> NotificationGate {
        self.gate.clone()
    }

    pub fn is_thumbnail_registered(&self) -> bool {
        self.binding.is_registered()
    }

    pub fn compositor(&self) -> &C {
        self.binding.compositor()
    }

    pub fn compositor_mut(&mut self) -> &mut C {
        self.binding.compositor_mut()
    }

    fn constraints(&self) -> Constraints {
        Constraints {
            ratio: self.selection.as_ref().map_or(1.0, SourceSelection::ratio),
            min_width: self.geometry.min_width,
            min_height: self.geometry.min_height,
            chrome_offset: self.geometry.content_offset,
        }
    }

    fn register(&mut self) {
        let (Some(selection), Some(properties)) =
            (self.selection.as_ref(), self.thumbnail_properties())
        else {
            return;
        };
        let source = selection.source();
        if let Err(e) = self.binding.register(self.target, source, &properties) {
            warn!("thumbnail registration failed: {e}");
        }
    }

    fn push_update(&mut self) {
        let Some(properties) = self.thumbnail_properties() else {
            return;
        };
        if let Err(e) = self.binding.update(&properties) {
            warn!("thumbnail update failed: {e}");
        }
    }

    fn expect_state(&self, operation: &'static str, expected: SessionState) -> GeometryResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GeometryError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingCompositor};

    const TARGET: WindowHandle = WindowHandle(0x100);
    const SOURCE: WindowHandle = WindowHandle(0x200);
    const DISPLAY: Size = Size {
        width: 1920,
        height: 1080,
    };

    fn bound(width: u32, height: u32) -> GeometryController<RecordingCompositor> {
        let mut controller = GeometryController::new(PipConfig::default(), RecordingCompositor::new());
        let selection = SourceSelection::new(SOURCE, Rect::new(0, 0, width, height)).unwrap();
        controller.init(selection, TARGET, DISPLAY).unwrap();
        controller
    }

    fn resize(axis: Axis, width: i32, height: i32) -> SizeChange {
        SizeChange {
            axis,
            width,
            height,
        }
    }

    #[test]
    fn init_sizes_full_hd_to_a_quarter() {
        let controller = bound(1920, 1080);
        let g = controller.geometry();
        assert_eq!((g.width, g.height), (480, 270));
        assert_eq!((g.left, g.top), (200, 200));
        assert_eq!((g.min_width, g.min_height), (178, 100));
        assert_eq!(controller.state(), SessionState::Bound);
        assert!(controller.is_thumbnail_registered());
    }

    #[test]
    fn init_pushes_destination_and_fixed_source() {
        let controller = bound(1920, 1080);
        let props = controller.compositor().last_update().unwrap();
        assert_eq!(props.destination, Rect::new(0, 0, 480, 270));
        assert_eq!(props.source, Rect::new(0, 0, 1920, 1080));
        assert_eq!(props.opacity, 255);
        assert!(props.visible);
    }

    #[test]
    fn init_twice_is_rejected() {
        let mut controller = bound(1920, 1080);
        let selection = SourceSelection::new(SOURCE, Rect::new(0, 0, 10, 10)).unwrap();
        let err = controller.init(selection, TARGET, DISPLAY).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidState { operation: "init", .. }));
    }

    #[test]
    fn init_without_target_registers_on_load() {
        let mut controller = GeometryController::new(PipConfig::default(), RecordingCompositor::new());
        let selection = SourceSelection::new(SOURCE, Rect::new(0, 0, 800, 600)).unwrap();
        controller.init(selection, WindowHandle::NULL, DISPLAY).unwrap();
        assert!(!controller.is_thumbnail_registered());

        controller.on_loaded(TARGET);
        assert!(controller.is_thumbnail_registered());
        controller.on_loaded(TARGET);
        assert_eq!(controller.compositor().live(), 1);
    }

    #[test]
    fn load_before_init_supplies_target() {
        let mut controller = GeometryController::new(PipConfig::default(), RecordingCompositor::new());
        controller.on_loaded(TARGET);
        let selection = SourceSelection::new(SOURCE, Rect::new(0, 0, 800, 600)).unwrap();
        controller.init(selection, WindowHandle::NULL, DISPLAY).unwrap();
        assert!(matches!(
            controller.compositor().calls()[0],
            Call::Register { target: TARGET, .. }
        ));
    }

    #[test]
    fn width_resize_derives_height() {
        let mut controller = bound(1920, 1080);
        let frame = controller.on_size_changed(resize(Axis::Width, 300, 270)).unwrap();
        assert_eq!((frame.width, frame.height), (300, 169));
        let props = controller.compositor().last_update().unwrap();
        assert_eq!(props.destination, Rect::new(0, 0, 300, 169));
    }

    #[test]
    fn height_resize_derives_width() {
        let mut controller = bound(1920, 1080);
        let frame = controller.on_size_changed(resize(Axis::Height, 480, 360)).unwrap();
        assert_eq!((frame.width, frame.height), (640, 360));
    }

    #[test]
    fn resize_below_floor_is_clamped() {
        let mut controller = bound(100, 400);
        let g = *controller.geometry();
        assert_eq!((g.min_width, g.min_height), (25, 100));

        let frame = controller.on_size_changed(resize(Axis::Width, 10, 400)).unwrap();
        assert_eq!(frame.width, 25);
        assert_eq!(frame.height, 100);
    }

    #[test]
    fn resize_is_ignored_while_suspended() {
        let mut controller = bound(1920, 1080);
        let gate = controller.notifications();
        let updates = controller.compositor().update_count();
        {
            let _scope = gate.suspend();
            assert_eq!(controller.on_size_changed(resize(Axis::Width, 300, 270)), None);
            controller.on_moved(0, 0);
        }
        assert_eq!(controller.geometry().width, 480);
        assert_eq!(controller.geometry().left, 200);
        assert_eq!(controller.compositor().update_count(), updates);
    }

    #[test]
    fn resize_before_init_is_ignored() {
        let mut controller = GeometryController::new(PipConfig::default(), RecordingCompositor::new());
        assert_eq!(controller.on_size_changed(resize(Axis::Width, 300, 200)), None);
    }

    #[test]
    fn each_change_pushes_exactly_one_update() {
        let mut controller = bound(1920, 1080);
        controller.compositor_mut().clear_calls();
        controller.on_size_changed(resize(Axis::Width, 300, 270));
        assert_eq!(controller.compositor().update_count(), 1);
        controller.on_pointer_enter();
        assert_eq!(controller.compositor().update_count(), 2);
        controller.on_moved(10, 20);
        assert_eq!(controller.compositor().update_count(), 3);
    }

    #[test]
    fn enter_shifts_content_below_chrome() {
        let mut controller = bound(1920, 1080);
        controller.on_size_changed(resize(Axis::Width, 300, 270));
        let frame = controller.on_pointer_enter().unwrap();
        assert_eq!(frame.height, 199);
        assert_eq!(frame.top, 170);
        assert_eq!(frame.min_height, 130);
        assert!(frame.chrome_visible);

        let props = controller.compositor().last_update().unwrap();
        assert_eq!(props.destination, Rect::new(0, 30, 300, 169));
    }

    #[test]
    fn resize_with_chrome_keeps_content_ratio() {
        let mut controller = bound(1920, 1080);
        controller.on_pointer_enter();
        let frame = controller.on_size_changed(resize(Axis::Width, 300, 300)).unwrap();
        assert_eq!(frame.height, 199);
        let frame = controller.on_size_changed(resize(Axis::Height, 300, 300)).unwrap();
        assert_eq!(frame.width, 480);
    }

    #[test]
    fn leave_check_hides_when_cursor_is_outside() {
        let mut controller = bound(1920, 1080);
        let before = *controller.geometry();
        controller.on_pointer_enter();

        let check = controller.on_pointer_leave().unwrap();
        assert_eq!(check.delay(), PipConfig::HOVER_SETTLE);
        controller.compositor_mut().set_cursor(5, 5);
        let frame = controller.run_leave_check(check).unwrap();
        assert!(!frame.chrome_visible);
        assert_eq!(*controller.geometry(), before);
    }

    #[test]
    fn leave_check_keeps_chrome_when_cursor_is_inside() {
        let mut controller = bound(1920, 1080);
        controller.on_pointer_enter();
        let shown = *controller.geometry();

        let check = controller.on_pointer_leave().unwrap();
        controller.compositor_mut().set_cursor(shown.left + 10, shown.top + 5);
        assert_eq!(controller.run_leave_check(check), None);
        assert_eq!(*controller.geometry(), shown);
        assert_eq!(controller.chrome_state(), ChromeState::Visible);
    }

    #[test]
    fn leave_check_without_cursor_keeps_chrome() {
        let mut controller = bound(1920, 1080);
        controller.on_pointer_enter();

        let check = controller.on_pointer_leave().unwrap();
        assert_eq!(controller.run_leave_check(check), None);
        assert_eq!(controller.chrome_state(), ChromeState::Visible);

        // The next leave recovers once the cursor can be read again
        let check = controller.on_pointer_leave().unwrap();
        controller.compositor_mut().set_cursor(5, 5);
        assert!(controller.run_leave_check(check).is_some());
        assert_eq!(controller.chrome_state(), ChromeState::Hidden);
    }

    #[test]
    fn extreme_portrait_selection_saturates_with_chrome() {
        let mut controller = bound(1, 100_000);
        let g = *controller.geometry();
        assert_eq!((g.min_width, g.min_height), (1, 100));
        assert_eq!((g.width, g.height), (1, 270));

        controller.on_pointer_enter();
        let frame = controller
            .on_size_changed(resize(Axis::Width, 30_000, 300))
            .unwrap();
        assert_eq!((frame.width, frame.height), (30_000, i32::MAX));
        assert_eq!(controller.content_offset(), 30);

        let check = controller.on_pointer_leave().unwrap();
        controller.compositor_mut().set_cursor(5, 5);
        let frame = controller.run_leave_check(check).unwrap();
        assert!(!frame.chrome_visible);
        assert!(frame.height >= frame.min_height);
        assert_eq!(controller.content_offset(), 0);
    }

    #[test]
    fn enter_supersedes_pending_leave_check() {
        let mut controller = bound(1920, 1080);
        controller.on_pointer_enter();
        let check = controller.on_pointer_leave().unwrap();
        controller.on_pointer_enter();

        controller.compositor_mut().set_cursor(5, 5);
        assert_eq!(controller.run_leave_check(check), None);
        assert_eq!(controller.chrome_state(), ChromeState::Visible);
    }

    #[test]
    fn leave_check_after_close_is_a_no_op() {
        let mut controller = bound(1920, 1080);
        controller.on_pointer_enter();
        let check = controller.on_pointer_leave().unwrap();
        assert!(controller.close());

        controller.compositor_mut().set_cursor(5, 5);
        assert_eq!(controller.run_leave_check(check), None);
    }

    #[test]
    fn leave_without_chrome_schedules_nothing() {
        let mut controller = bound(1920, 1080);
        assert_eq!(controller.on_pointer_leave(), None);
    }

    #[test]
    fn close_is_idempotent_and_releases_thumbnail() {
        let mut controller = bound(1920, 1080);
        assert!(controller.close());
        assert!(!controller.close());
        assert_eq!(controller.state(), SessionState::TornDown);
        assert_eq!(controller.compositor().live(), 0);
        assert_eq!(controller.on_pointer_enter(), None);
    }

    #[test]
    fn rejected_registration_keeps_session_alive() {
        let mut compositor = RecordingCompositor::new();
        compositor.reject_register(true);
        let mut controller = GeometryController::new(PipConfig::default(), compositor);
        let selection = SourceSelection::new(SOURCE, Rect::new(0, 0, 1920, 1080)).unwrap();
        controller.init(selection, TARGET, DISPLAY).unwrap();

        assert_eq!(controller.state(), SessionState::Bound);
        assert!(!controller.is_thumbnail_registered());
        assert!(controller.on_size_changed(resize(Axis::Width, 300, 270)).is_some());
        assert!(controller.compositor().calls().is_empty());
    }

    #[test]
    fn rejected_update_is_retried_by_next_event() {
        let mut controller = bound(1920, 1080);
        controller.compositor_mut().reject_update(true);
        controller.compositor_mut().clear_calls();
        assert!(controller.on_size_changed(resize(Axis::Width, 300, 270)).is_some());
        assert_eq!(controller.compositor().update_count(), 0);

        controller.compositor_mut().reject_update(false);
        controller.on_size_changed(resize(Axis::Width, 320, 180));
        assert_eq!(controller.compositor().update_count(), 1);
    }
}
