//! Render tree components

use crate::core::{CommandList, GpuError};
use crate::gui::ui::ImmediateUi;
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

/// Error raised while rendering a component tree.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error("component '{component}' failed: {message}")]
    Component { component: String, message: String },
}

impl RenderError {
    pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Something that renders itself each frame.
///
/// Widget chrome goes through `ui`; GPU work is recorded into `commands`.
pub trait UiComponent {
    fn render(&mut self, ui: &mut dyn ImmediateUi, commands: &mut CommandList) -> RenderResult<()>;
}

/// A menu entry that counts its activations.
pub struct MenuItem {
    label: String,
    clicks: Rc<Cell<u32>>,
}

impl MenuItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            clicks: Rc::new(Cell::new(0)),
        }
    }

    /// Get the item label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Shared activation counter, readable after the item moved into a tree.
    pub fn clicks(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.clicks)
    }
}

impl UiComponent for MenuItem {
    fn render(
        &mut self,
        ui: &mut dyn ImmediateUi,
        _commands: &mut CommandList,
    ) -> RenderResult<()> {
        if ui.menu_item(&self.label) {
            self.clicks.set(self.clicks.get() + 1);
            tracing::debug!("menu item '{}' activated", self.label);
        }
        Ok(())
    }
}

/// Adapts a closure into a component.
pub struct FnComponent<F>(pub F);

impl<F> UiComponent for FnComponent<F>
where
    F: FnMut(&mut dyn ImmediateUi, &mut CommandList) -> RenderResult<()>,
{
    fn render(&mut self, ui: &mut dyn ImmediateUi, commands: &mut CommandList) -> RenderResult<()> {
        (self.0)(ui, commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::ui::ScriptedUi;

    #[test]
    fn test_menu_item_counts_clicks() {
        let mut item = MenuItem::new("Save");
        let clicks = item.clicks();
        let mut ui = ScriptedUi::new().activate("Save");
        let mut commands = CommandList::default();

        item.render(&mut ui, &mut commands).unwrap();
        item.render(&mut ui, &mut commands).unwrap();

        assert_eq!(clicks.get(), 2);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = RenderError::component("plot", "no data");
        assert_eq!(err.to_string(), "component 'plot' failed: no data");

        let err: RenderError = GpuError::InvalidCapacity.into();
        assert!(matches!(err, RenderError::Gpu(GpuError::InvalidCapacity)));
    }
}
