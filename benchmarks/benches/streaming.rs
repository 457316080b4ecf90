//! Streaming buffer and component tree benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench streaming
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench streaming -- tree

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rein_ui::glam::Vec2;
use rein_ui::{
    color, Canvas, CanvasSettings, ColorVertex, CommandList, MenuItem, QuadGrid, RecordingDevice,
    ScopeKind, ScopedContainer, ScriptedUi, StreamingVertexBuffer, UiComponent, UiContainer,
    UiMenu,
};

const VERTICES: usize = 65_536;

// ---------------------------------------------------------------------------
// Streaming
// ---------------------------------------------------------------------------

fn bench_push_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming/push_flush");
    group.throughput(Throughput::Elements(VERTICES as u64));

    let vertices: Vec<ColorVertex> = (0..VERTICES)
        .map(|i| ColorVertex::new([i as f32, (i % 480) as f32], color::WHITE))
        .collect();

    for &capacity in &[64, 1024, 16384] {
        let mut device = RecordingDevice::new();
        let mut buffer = StreamingVertexBuffer::new(&mut device, capacity, "bench").unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, _| {
            b.iter(|| {
                let mut commands = CommandList::default();
                buffer.reset();
                buffer.extend(&mut commands, vertices.iter().copied());
                buffer.flush(&mut commands);
                black_box(commands)
            });
        });
    }
    group.finish();
}

fn bench_canvas_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming/canvas_frame");

    for &side in &[4u32, 16, 64] {
        let mut device = RecordingDevice::new();
        let settings = CanvasSettings::new().label("bench").capacity(1024);
        let mut canvas = Canvas::new(&mut device, settings, || Vec2::new(1920.0, 1080.0))
            .unwrap()
            .with_producer(QuadGrid::new(side, side).cell(Vec2::splat(4.0)).gap(1.0));
        let mut ui = ScriptedUi::new();

        group.bench_with_input(BenchmarkId::from_parameter(side * side), &side, |b, _| {
            b.iter(|| {
                let mut commands = CommandList::default();
                canvas.record_frame(&mut ui, &mut commands).unwrap();
                black_box(commands)
            });
        });
        canvas.destroy(&mut device);
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Component tree
// ---------------------------------------------------------------------------

fn menu_tree(menus: usize, items: usize) -> UiContainer {
    let mut bar = ScopedContainer::new(ScopeKind::MenuBar, "main");
    for m in 0..menus {
        let mut menu = UiMenu::new(format!("menu {m}"));
        for i in 0..items {
            menu.add(MenuItem::new(format!("item {m}.{i}")));
        }
        bar.add(menu);
    }
    UiContainer::new().with_child(bar)
}

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree/render");

    for &width in &[4usize, 16, 64] {
        let mut root = menu_tree(width, width);
        let mut ui = ScriptedUi::new();
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| {
                ui.clear_events();
                let mut commands = CommandList::default();
                root.render(&mut ui, &mut commands).unwrap();
                black_box(ui.events().len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_push_flush, bench_canvas_frame, bench_tree);
criterion_main!(benches);
