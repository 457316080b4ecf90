//! Push/flush batching and grouped release.

use rein_ui::core::{BufferDesc, ResourceHandle};
use rein_ui::{
    ColorVertex, CommandList, RecordingDevice, RenderDevice, ResourceGroup, StreamingVertexBuffer,
};

fn vertex(i: usize) -> ColorVertex {
    ColorVertex::new([i as f32, -(i as f32)], [1.0, 0.5, 0.25, 1.0])
}

/// Push `n` vertices through a buffer of `capacity`, flush, and return the
/// uploaded batches.
fn stream(capacity: usize, n: usize) -> Vec<Vec<ColorVertex>> {
    let mut device = RecordingDevice::new();
    let mut buffer = StreamingVertexBuffer::new(&mut device, capacity, "stream").unwrap();
    let mut commands = CommandList::default();

    buffer.reset();
    for i in 0..n {
        buffer.push(&mut commands, vertex(i));
    }
    buffer.flush(&mut commands);
    assert_eq!(buffer.count(), 0);

    let batches: Vec<Vec<ColorVertex>> = commands.uploads().map(|upload| upload.read()).collect();
    device.submit(commands).unwrap();
    batches
}

#[test]
fn test_every_vertex_uploaded_once_in_order() {
    for capacity in [1, 3, 6, 16] {
        for n in [0, 1, capacity - 1, capacity, capacity + 1, 3 * capacity + 2] {
            let batches = stream(capacity, n);
            let flat: Vec<ColorVertex> = batches.iter().flatten().copied().collect();
            let expected: Vec<ColorVertex> = (0..n).map(vertex).collect();
            assert_eq!(flat, expected, "capacity {capacity}, n {n}");
            for batch in &batches {
                assert!(!batch.is_empty() && batch.len() <= capacity);
            }
            assert_eq!(batches.len(), n.div_ceil(capacity));
        }
    }
}

#[test]
fn test_exactly_capacity_leaves_nothing_pending() {
    let mut device = RecordingDevice::new();
    let mut buffer = StreamingVertexBuffer::new(&mut device, 6, "exact").unwrap();
    let mut commands = CommandList::default();

    buffer.extend(&mut commands, (0..6).map(vertex));
    assert_eq!(buffer.count(), 0);
    assert_eq!(buffer.flushes(), 1);

    let before = commands.len();
    buffer.flush(&mut commands);
    assert_eq!(commands.len(), before);
}

#[test]
fn test_missing_trailing_flush_drops_pending_vertices() {
    let mut device = RecordingDevice::new();
    let mut buffer = StreamingVertexBuffer::new(&mut device, 6, "pending").unwrap();
    let mut commands = CommandList::default();

    buffer.extend(&mut commands, (0..8).map(vertex));
    // Two vertices are still staged; only the full batch reached the list.
    assert_eq!(buffer.count(), 2);
    assert_eq!(commands.uploads().count(), 1);

    // Starting the next frame discards them.
    buffer.reset();
    buffer.flush(&mut commands);
    assert_eq!(commands.uploads().count(), 1);
}

#[test]
fn test_group_releases_each_handle_once() {
    let mut device = RecordingDevice::new();
    let mut group = ResourceGroup::new("frame");
    let handles: Vec<ResourceHandle> = (0..4)
        .map(|i| {
            let buffer = device
                .create_buffer(&BufferDesc::uniform(&format!("u{i}"), 16))
                .unwrap();
            group.add(buffer).into()
        })
        .collect();

    group.dispose(&mut device);

    let mut released = device.destroyed().to_vec();
    released.reverse();
    assert_eq!(released, handles);
    assert!(group.is_disposed());
}

#[test]
#[should_panic(expected = "disposed twice")]
fn test_group_double_dispose_panics() {
    let mut device = RecordingDevice::new();
    let mut group = ResourceGroup::new("twice");
    group.add(device.create_buffer(&BufferDesc::vertex("v", 24)).unwrap());
    group.dispose(&mut device);
    group.dispose(&mut device);
}
