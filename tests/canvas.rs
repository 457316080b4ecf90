//! Canvas frames and teardown against the recording device.

use rein_ui::core::{BufferHandle, ResourceHandle};
use rein_ui::glam::Vec2;
use rein_ui::gui::VertexBatch;
use rein_ui::{
    color, Canvas, CanvasSettings, ColorVertex, Command, CommandList, GpuError, QuadGrid,
    RecordingDevice, RenderDevice, ScriptedUi, UiContainer, UiMenu,
};
use std::cell::Cell;
use std::rc::Rc;

fn settings(capacity: usize) -> CanvasSettings {
    CanvasSettings::new().label("canvas").capacity(capacity)
}

fn vertex_uploads(commands: &CommandList, buffer: BufferHandle) -> Vec<Vec<ColorVertex>> {
    commands
        .uploads_to(buffer)
        .map(|upload| upload.read::<ColorVertex>())
        .collect()
}

fn nine_vertices(batch: &mut VertexBatch<'_>, _size: Vec2) {
    for i in 0..9 {
        batch.push(ColorVertex::new([i as f32, 0.0], color::WHITE));
    }
}

#[test]
fn test_nine_pushes_into_six_upload_six_then_three() {
    let mut device = RecordingDevice::new();
    let mut canvas = Canvas::new(&mut device, settings(6), || Vec2::new(320.0, 240.0))
        .unwrap()
        .with_producer(nine_vertices);

    let mut ui = ScriptedUi::new();
    canvas.draw(&mut device, &mut ui).unwrap();

    let frame = device.last_submission().unwrap();
    let uploads = vertex_uploads(frame, canvas.batch().buffer());
    let sizes: Vec<usize> = uploads.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![6, 3]);

    // Every vertex once, in push order.
    let xs: Vec<f32> = uploads.iter().flatten().map(|v| v.position[0]).collect();
    assert_eq!(xs, (0..9).map(|i| i as f32).collect::<Vec<_>>());

    let draws: Vec<&Command> = frame
        .commands()
        .iter()
        .filter(|command| matches!(command, Command::Draw(_)))
        .collect();
    assert_eq!(draws, vec![&Command::Draw(0..6), &Command::Draw(0..3)]);

    canvas.destroy(&mut device);
}

#[test]
fn test_frame_binds_before_drawing() {
    let mut device = RecordingDevice::new();
    let mut canvas = Canvas::new(&mut device, settings(64), || Vec2::new(100.0, 50.0))
        .unwrap()
        .with_producer(QuadGrid::new(2, 2));

    let mut commands = CommandList::new(Some("frame"));
    canvas
        .record_frame(&mut ScriptedUi::new(), &mut commands)
        .unwrap();

    let position = |wanted: fn(&Command) -> bool| {
        commands.commands().iter().position(wanted).unwrap()
    };
    let clear = position(|c| matches!(c, Command::Clear(_)));
    let pipeline = position(|c| matches!(c, Command::SetPipeline(_)));
    let set = position(|c| matches!(c, Command::SetResourceSet { .. }));
    let draw = position(|c| matches!(c, Command::Draw(_)));
    assert!(clear < pipeline && pipeline < set && set < draw);
    assert_eq!(commands.draw_count(), 1);

    device.submit(commands).unwrap();
    canvas.destroy(&mut device);
}

#[test]
fn test_size_is_queried_every_frame() {
    let mut device = RecordingDevice::new();
    let width = Rc::new(Cell::new(200.0f32));
    let size = {
        let width = Rc::clone(&width);
        move || Vec2::new(width.get(), 100.0)
    };
    let mut canvas = Canvas::new(&mut device, settings(16), size).unwrap();
    let mut ui = ScriptedUi::new();

    canvas.draw(&mut device, &mut ui).unwrap();
    width.set(400.0);
    canvas.draw(&mut device, &mut ui).unwrap();

    assert_eq!(device.target_size(canvas.target()), Some((400, 100)));
    let projections: Vec<Vec<[[f32; 4]; 4]>> = device
        .submitted()
        .iter()
        .map(|list| {
            list.uploads_to(canvas.projection_buffer())
                .map(|upload| upload.read::<[[f32; 4]; 4]>()[0])
                .collect()
        })
        .collect();
    assert_eq!(projections[0].len(), 1);
    assert_eq!(projections[1].len(), 1);
    // x scale is 2 / width
    assert_eq!(projections[0][0][0][0], 2.0 / 200.0);
    assert_eq!(projections[1][0][0][0], 2.0 / 400.0);

    canvas.destroy(&mut device);
}

#[test]
fn test_failed_construction_releases_everything() {
    // Canvas creation makes eight device objects; fail each one in turn.
    for failing in 1..=8 {
        let mut device = RecordingDevice::new();
        device.fail_on_creation(failing);

        let result = Canvas::new(&mut device, settings(16), || Vec2::new(64.0, 64.0));
        assert!(result.is_err(), "creation {failing} should fail");
        assert_eq!(
            device.live_count(),
            0,
            "leak after failing creation {failing}"
        );

        // Released newest first.
        let created: Vec<ResourceHandle> = device.created().to_vec();
        let mut destroyed: Vec<ResourceHandle> = device.destroyed().to_vec();
        destroyed.reverse();
        assert_eq!(created, destroyed);
    }
}

#[test]
fn test_zero_capacity_is_an_error() {
    let mut device = RecordingDevice::new();
    let result = Canvas::new(&mut device, settings(0), || Vec2::ONE);
    assert!(matches!(result, Err(GpuError::InvalidCapacity)));
}

#[test]
fn test_teardown_releases_in_reverse_creation_order() {
    let mut device = RecordingDevice::new();
    let canvas = Canvas::new(&mut device, settings(16), || Vec2::new(8.0, 8.0)).unwrap();
    let created = device.created().to_vec();
    assert_eq!(created.len(), 8);

    canvas.destroy(&mut device);

    let mut destroyed = device.destroyed().to_vec();
    destroyed.reverse();
    assert_eq!(destroyed, created);
    assert_eq!(device.live_count(), 0);
}

#[test]
fn test_tree_content_renders_inside_frame() {
    let mut device = RecordingDevice::new();
    let tree = UiContainer::new().with_child(UiMenu::new("Layers"));
    let mut canvas = Canvas::new(&mut device, settings(16), || Vec2::new(32.0, 32.0))
        .unwrap()
        .with_tree(tree);

    let mut ui = ScriptedUi::new();
    canvas.draw(&mut device, &mut ui).unwrap();

    assert_eq!(ui.opened_labels(), vec!["Layers"]);
    assert_eq!(ui.close_count(), 1);
    canvas.destroy(&mut device);
}
