//! Canvas frames replayed on a real wgpu device and read back.
//!
//! Each test returns early when no adapter is available.

use rein_ui::core::TargetHandle;
use rein_ui::glam::Vec2;
use rein_ui::{
    color, BlendState, Canvas, CanvasSettings, GeometryProducer, ScriptedUi, VertexBatch,
    WgpuContext, WgpuDevice,
};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn square() -> Vec2 {
    Vec2::splat(64.0)
}

fn gpu_device() -> Option<WgpuDevice> {
    match WgpuContext::new_blocking() {
        Ok(ctx) => Some(WgpuDevice::new(ctx)),
        Err(e) => {
            eprintln!("GPU test skipped: {e}");
            None
        }
    }
}

fn settings(capacity: usize) -> CanvasSettings {
    CanvasSettings::new()
        .label("readback")
        .capacity(capacity)
        .format(wgpu::TextureFormat::Rgba8Unorm)
        .blend(BlendState::Replace)
}

/// Red quad over the left half, blue quad over the right half.
struct Halves;

impl GeometryProducer for Halves {
    fn produce(&mut self, batch: &mut VertexBatch<'_>, size: Vec2) {
        let half = Vec2::new(size.x / 2.0, size.y);
        batch.quad(Vec2::ZERO, half, color::RED);
        batch.quad(Vec2::new(half.x, 0.0), half, color::BLUE);
    }
}

/// Copy a target to the CPU as rows of RGBA texels.
fn read_target(device: &WgpuDevice, target: TargetHandle) -> Vec<Vec<[u8; 4]>> {
    let ctx = device.context();
    let offscreen = device.target(target).expect("canvas target exists");
    let (width, height) = offscreen.size();
    let row_bytes = width * 4;
    let padded = row_bytes.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

    let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("target readback"),
        size: u64::from(padded * height),
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = ctx.create_encoder(Some("target readback"));
    encoder.copy_texture_to_buffer(
        offscreen.texture().as_image_copy(),
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        offscreen.texture().size(),
    );
    ctx.submit([encoder.finish()]);

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).unwrap();
    });
    let _ = ctx.device.poll(wgpu::PollType::wait_indefinitely());
    rx.recv().unwrap().expect("map readback buffer");

    let data = slice.get_mapped_range();
    let rows = data
        .chunks_exact(padded as usize)
        .map(|row| {
            row[..row_bytes as usize]
                .chunks_exact(4)
                .map(|texel| [texel[0], texel[1], texel[2], texel[3]])
                .collect()
        })
        .collect();
    drop(data);
    staging.unmap();
    rows
}

#[test]
fn test_two_flushes_keep_their_own_contents() {
    let Some(mut device) = gpu_device() else {
        return;
    };
    let mut canvas = Canvas::new(&mut device, settings(6), square)
        .unwrap()
        .with_producer(Halves);

    canvas.draw(&mut device, &mut ScriptedUi::new()).unwrap();
    // Both quads went through the same six-vertex buffer at offset 0.
    assert_eq!(canvas.batch().flushes(), 2);

    let rows = read_target(&device, canvas.target());
    assert_eq!(rows.len(), 64);
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), 64);
        for (x, texel) in row.iter().enumerate() {
            let expected = if x < 32 { RED } else { BLUE };
            assert_eq!(*texel, expected, "texel ({x}, {y})");
        }
    }

    canvas.destroy(&mut device);
}

#[test]
fn test_clear_lands_without_draws() {
    let Some(mut device) = gpu_device() else {
        return;
    };
    let green = settings(6).clear_color(color::GREEN);
    let mut canvas = Canvas::new(&mut device, green, square).unwrap();

    canvas.draw(&mut device, &mut ScriptedUi::new()).unwrap();
    assert_eq!(canvas.batch().flushes(), 0);

    let rows = read_target(&device, canvas.target());
    assert!(rows.iter().flatten().all(|texel| *texel == GREEN));

    canvas.destroy(&mut device);
}
