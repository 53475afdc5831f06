//! End-to-end overlay session scenarios against the recording compositor.

use geometry::testing::{Call, RecordingCompositor};
use geometry::{
    Axis, ChromeState, GeometryController, PipConfig, Rect, SessionState, Size, SizeChange,
    SourceSelection, WindowHandle,
};

const TARGET: WindowHandle = WindowHandle(0x1001);
const SOURCE: WindowHandle = WindowHandle(0x2002);
const PRIMARY: Size = Size {
    width: 1920,
    height: 1080,
};

fn start(width: u32, height: u32) -> GeometryController<RecordingCompositor> {
    let mut controller = GeometryController::new(PipConfig::default(), RecordingCompositor::new());
    let selection = SourceSelection::new(SOURCE, Rect::new(0, 0, width, height)).unwrap();
    controller.init(selection, TARGET, PRIMARY).unwrap();
    controller
}

#[test]
fn full_hd_session_walkthrough() {
    let mut controller = start(1920, 1080);

    let g = *controller.geometry();
    assert_eq!((g.width, g.height), (480, 270));

    let frame = controller
        .on_size_changed(SizeChange {
            axis: Axis::Width,
            width: 300,
            height: 270,
        })
        .unwrap();
    assert_eq!(frame.height, 169);
    let after_resize = *controller.geometry();

    let frame = controller.on_pointer_enter().unwrap();
    assert_eq!(frame.height, 169 + 30);
    assert_eq!(frame.top, after_resize.top - 30);
    assert_eq!(frame.min_height, after_resize.min_height + 30);

    let check = controller.on_pointer_leave().unwrap();
    controller
        .compositor_mut()
        .set_cursor(after_resize.left - 50, after_resize.top - 50);
    let frame = controller.run_leave_check(check).unwrap();
    assert_eq!(frame.height, 169);
    assert_eq!(frame.top, after_resize.top);
    assert_eq!(*controller.geometry(), after_resize);

    assert!(controller.close());
    assert_eq!(controller.state(), SessionState::TornDown);
    assert_eq!(controller.compositor().live(), 0);
}

#[test]
fn portrait_selection_floors() {
    let mut controller = start(100, 400);
    let g = *controller.geometry();
    assert_eq!(g.min_height, 100);
    assert_eq!(g.min_width, 25);

    for requested in [24, 10, 1, 0, -5] {
        let frame = controller
            .on_size_changed(SizeChange {
                axis: Axis::Width,
                width: requested,
                height: g.height,
            })
            .unwrap();
        assert_eq!(frame.width, 25);
        assert!(frame.height >= 100);
    }
}

#[test]
fn destination_tracks_chrome_and_source_never_changes() {
    let mut controller = start(1280, 720);
    let source = Rect::new(0, 0, 1280, 720);

    controller.on_pointer_enter();
    controller.on_size_changed(SizeChange {
        axis: Axis::Height,
        width: 0,
        height: 300,
    });

    let offset = controller.content_offset();
    assert_eq!(offset, 30);
    let g = *controller.geometry();
    let props = controller.compositor().last_update().unwrap();
    assert_eq!(
        props.destination,
        Rect::new(0, offset, g.width as u32, (g.height - offset) as u32)
    );

    for call in controller.compositor().calls() {
        if let Call::Update { properties, .. } = call {
            assert_eq!(properties.source, source);
        }
    }
}

#[test]
fn source_change_ends_session_and_next_session_binds_fresh() {
    let mut first = start(1920, 1080);
    first.on_pointer_enter();
    assert!(first.close());
    assert_eq!(first.compositor().live(), 0);

    let second = start(800, 600);
    assert_eq!(second.chrome_state(), ChromeState::Hidden);
    assert_eq!(second.compositor().live(), 1);
}

#[test]
fn sub_region_crop_is_pushed_as_source() {
    let mut controller = GeometryController::new(PipConfig::default(), RecordingCompositor::new());
    let region = Rect::new(120, 80, 640, 360);
    let selection = SourceSelection::new(SOURCE, region).unwrap();
    controller.init(selection, TARGET, PRIMARY).unwrap();

    let props = controller.compositor().last_update().unwrap();
    assert_eq!(props.source, region);
    assert_eq!(props.destination, Rect::new(0, 0, 480, 270));
}

#[test]
fn custom_config_flows_into_geometry() {
    let config = PipConfig {
        chrome_height: 24,
        initial_position: (40, 60),
        opacity: 200,
        ..Default::default()
    };
    let mut controller = GeometryController::new(config, RecordingCompositor::new());
    let selection = SourceSelection::new(SOURCE, Rect::new(0, 0, 400, 300)).unwrap();
    let frame = controller.init(selection, TARGET, PRIMARY).unwrap();
    assert_eq!((frame.left, frame.top), (40, 60));
    assert_eq!((frame.width, frame.height), (360, 270));

    let frame = controller.on_pointer_enter().unwrap();
    assert_eq!(frame.top, 36);
    assert_eq!(controller.compositor().last_update().unwrap().opacity, 200);
}
