// End-to-end picking through the frame loop

use glam::{Vec2, Vec3};
use kiwi_3d::input::{FrameInput, Key};
use kiwi_3d::mesh::{cube_template, sphere_template};
use kiwi_3d::{AppContext, Object, ObjectId, ViewerConfig};

const WIDTH: u32 = 120;
const HEIGHT: u32 = 70;
const DT_MS: f32 = 1000.0 / 60.0;

fn app_with_cube() -> (AppContext, ObjectId) {
    let config = ViewerConfig {
        width: WIDTH,
        height: HEIGHT,
        ..ViewerConfig::default()
    };
    let mut app = AppContext::new(config).unwrap();
    app.camera.position = Vec3::new(0.0, 0.0, -100.0);

    let cube = app.objects.push_back(
        Object::new()
            .with_mesh(cube_template())
            .scale_by(Vec3::splat(25.0))
            .with_color(0xFF2A_4D69),
    );
    (app, cube)
}

fn right_click(x: f32, y: f32) -> FrameInput {
    FrameInput {
        mouse_pos: Vec2::new(x, y),
        right_pressed: true,
        ..FrameInput::idle(DT_MS)
    }
}

fn press(key: Key) -> FrameInput {
    let mut input = FrameInput::idle(DT_MS);
    input.keys_pressed.insert(key);
    input
}

fn center() -> FrameInput {
    right_click(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0)
}

#[test]
fn pick_select_and_deselect_cube() {
    let (mut app, cube) = app_with_cube();

    app.do_frame(&center());
    // result exists after the draw pass but is not applied until next frame
    assert_eq!(app.selected(), None);
    assert_eq!(app.drawer.pixel_tracker.found_object(), Some(cube));

    app.do_frame(&FrameInput::idle(DT_MS));
    assert_eq!(app.selected(), Some(cube));
    assert_eq!(app.objects.get(cube).unwrap().opacity, 0.5);
    assert!(!app.drawer.pixel_tracker.is_armed());

    app.do_frame(&press(Key::Enter));
    assert_eq!(app.selected(), None);
    assert_eq!(app.objects.get(cube).unwrap().opacity, 1.0);
}

#[test]
fn picking_sky_keeps_selection() {
    let (mut app, cube) = app_with_cube();
    app.do_frame(&center());
    app.do_frame(&FrameInput::idle(DT_MS));
    assert_eq!(app.selected(), Some(cube));

    app.do_frame(&right_click(0.0, 0.0));
    assert_eq!(app.drawer.pixel_tracker.found_object(), None);
    app.do_frame(&FrameInput::idle(DT_MS));
    assert_eq!(app.selected(), Some(cube));
    assert_eq!(app.objects.get(cube).unwrap().opacity, 0.5);
}

#[test]
fn result_is_cleared_before_the_next_pass() {
    let (mut app, cube) = app_with_cube();
    app.do_frame(&center());

    // armed again on the consuming frame
    app.handle_input(&right_click(0.0, 0.0));
    assert_eq!(app.selected(), Some(cube));
    assert_eq!(app.drawer.pixel_tracker.found_object(), None);
    assert!(app.drawer.pixel_tracker.is_armed());

    app.render();
    assert_eq!(app.drawer.pixel_tracker.found_object(), None);
}

#[test]
fn front_object_wins_the_pick() {
    let (mut app, cube) = app_with_cube();
    // drawn after the cube but closer to the camera
    let sphere = app.objects.push_back(
        Object::new()
            .with_mesh(sphere_template())
            .scale_by(Vec3::splat(10.0))
            .move_by(Vec3::new(0.0, 0.0, -30.0)),
    );
    // drawn last but hidden behind the cube
    let hidden = app.objects.push_back(
        Object::new()
            .with_mesh(cube_template())
            .scale_by(Vec3::splat(10.0))
            .move_by(Vec3::new(0.0, 0.0, 40.0)),
    );

    app.do_frame(&center());
    app.do_frame(&FrameInput::idle(DT_MS));
    assert_eq!(app.selected(), Some(sphere));
    assert_ne!(app.selected(), Some(cube));
    assert_ne!(app.selected(), Some(hidden));
}

#[test]
fn falling_cube_leaves_the_pick() {
    let (mut app, cube) = app_with_cube();
    app.do_frame(&press(Key::G));
    assert_eq!(app.objects.get(cube).unwrap().gravity, -30.0);

    // two seconds of free fall moves the cube 60 units down, clear of the center pixel
    for _ in 0..120 {
        app.do_frame(&FrameInput::idle(DT_MS));
    }
    assert!(app.objects.get(cube).unwrap().transform.position.y < -50.0);

    app.do_frame(&center());
    app.do_frame(&FrameInput::idle(DT_MS));
    assert_eq!(app.selected(), None);
}
