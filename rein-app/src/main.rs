//! Headless demo: a menu bar and a quad-grid canvas rendered offscreen.

use rein_ui::glam::Vec2;
use rein_ui::{
    Canvas, CanvasSettings, CommandList, ImmediateUi, MenuItem, QuadGrid, RenderDevice, ScopeGuard,
    ScopeKind, ScopedContainer, UiComponent, UiMenu, WgpuContext, WgpuDevice,
};

const FRAMES: u32 = 3;

/// Immediate-mode UI that logs what it would draw.
struct LogUi {
    depth: usize,
    frame: u32,
}

impl ImmediateUi for LogUi {
    fn try_open(&mut self, kind: ScopeKind, label: &str) -> bool {
        // The help menu is collapsed in this demo.
        let opened = label != "Help";
        log::info!(
            "{:indent$}{:?} '{}' open={}",
            "",
            kind,
            label,
            opened,
            indent = self.depth * 2
        );
        if opened {
            self.depth += 1;
        }
        opened
    }

    fn close(&mut self, _kind: ScopeKind) {
        self.depth -= 1;
    }

    fn menu_item(&mut self, label: &str) -> bool {
        log::info!("{:indent$}item '{}'", "", label, indent = self.depth * 2);
        // Pretend the user clicks "Clear" on the last frame.
        label == "Clear" && self.frame == FRAMES - 1
    }

    fn show_target(&mut self, target: rein_ui::core::TargetHandle, size: [f32; 2]) {
        log::info!(
            "{:indent$}image {:?} {}x{}",
            "",
            target,
            size[0],
            size[1],
            indent = self.depth * 2
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let ctx = WgpuContext::new_blocking()?;
    let mut device = WgpuDevice::new(ctx);

    let settings = CanvasSettings::new()
        .label("quads")
        .capacity(36)
        .clear_color([0.1, 0.1, 0.12, 1.0]);
    let mut canvas = Canvas::new(&mut device, settings, || Vec2::new(640.0, 480.0))?
        .with_producer(QuadGrid::new(8, 6));

    let clear = MenuItem::new("Clear");
    let clear_clicks = clear.clicks();
    let mut menu_bar = ScopedContainer::new(ScopeKind::MenuBar, "main")
        .with_child(UiMenu::new("Canvas").with_child(clear))
        .with_child(UiMenu::new("Help").with_child(MenuItem::new("About")));

    let mut ui = LogUi { depth: 0, frame: 0 };
    for frame in 0..FRAMES {
        ui.frame = frame;
        let mut commands = CommandList::new(Some("frame"));

        menu_bar.render(&mut ui, &mut commands)?;
        if clear_clicks.get() > 0 {
            canvas.set_clear_color(rein_ui::color::BLACK);
        }
        if let Some(mut window) = ScopeGuard::open(&mut ui, ScopeKind::Window, "Canvas") {
            canvas.render(&mut *window, &mut commands)?;
        }

        log::info!("frame {}: {} commands", frame, commands.len());
        device.submit(commands)?;
    }

    log::info!(
        "'Clear' clicked {} time(s), canvas drew {} frames",
        clear_clicks.get(),
        canvas.frames()
    );
    canvas.destroy(&mut device);
    Ok(())
}
