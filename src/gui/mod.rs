//! GUI module
//!
//! The composition tree, the seam to the host immediate-mode library and the
//! [`Canvas`] surface that renders into an offscreen target.

pub mod canvas;
pub mod component;
pub mod container;
pub mod geometry;
pub mod projection;
pub mod scope;
pub mod settings;
pub mod ui;

pub use canvas::{Canvas, CanvasContent, CANVAS_SHADER};
pub use component::{FnComponent, MenuItem, RenderError, RenderResult, UiComponent};
pub use container::{ScopedContainer, UiContainer, UiMenu};
pub use geometry::{GeometryProducer, QuadGrid, VertexBatch};
pub use projection::{projection, ClipSpace};
pub use scope::ScopeGuard;
pub use settings::CanvasSettings;
pub use ui::{ImmediateUi, ScopeKind, ScriptedUi, UiEvent};
