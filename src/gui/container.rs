//! Composite components
//!
//! [`UiContainer`] renders its children in insertion order. [`ScopedContainer`]
//! does the same inside a bracket, and renders nothing when the bracket stays
//! shut.

use crate::core::CommandList;
use crate::gui::component::{RenderResult, UiComponent};
use crate::gui::scope::ScopeGuard;
use crate::gui::ui::{ImmediateUi, ScopeKind};
use std::ops::{Deref, DerefMut};

/// Ordered list of child components. Insertion order is paint order.
#[derive(Default)]
pub struct UiContainer {
    children: Vec<Box<dyn UiComponent>>,
}

impl UiContainer {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container that owns `children`, first child painted first.
    pub fn from_children(children: Vec<Box<dyn UiComponent>>) -> Self {
        Self { children }
    }

    /// Append a child.
    pub fn add(&mut self, child: impl UiComponent + 'static) -> &mut Self {
        self.children.push(Box::new(child));
        self
    }

    /// Append a child, builder style.
    pub fn with_child(mut self, child: impl UiComponent + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    /// Get the children in paint order.
    pub fn children(&self) -> &[Box<dyn UiComponent>] {
        &self.children
    }

    /// Get the children for in-place editing.
    pub fn children_mut(&mut self) -> &mut Vec<Box<dyn UiComponent>> {
        &mut self.children
    }

    /// Get the number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check whether the container has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Render every child in order. Stops at the first failure.
    pub fn render_children(
        &mut self,
        ui: &mut dyn ImmediateUi,
        commands: &mut CommandList,
    ) -> RenderResult<()> {
        for child in &mut self.children {
            child.render(ui, commands)?;
        }
        Ok(())
    }
}

impl UiComponent for UiContainer {
    fn render(&mut self, ui: &mut dyn ImmediateUi, commands: &mut CommandList) -> RenderResult<()> {
        self.render_children(ui, commands)
    }
}

/// A labelled container whose children render inside a bracket.
pub struct ScopedContainer {
    kind: ScopeKind,
    label: String,
    container: UiContainer,
}

impl ScopedContainer {
    /// Create an empty scoped container.
    pub fn new(kind: ScopeKind, label: impl Into<String>) -> Self {
        Self::with_children(kind, label, Vec::new())
    }

    /// Create a scoped container that owns `children`.
    pub fn with_children(
        kind: ScopeKind,
        label: impl Into<String>,
        children: Vec<Box<dyn UiComponent>>,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            container: UiContainer::from_children(children),
        }
    }

    /// Get the kind of bracket the children render in.
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Get the label shown on the bracket.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set the label used from the next render on.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Get the inner container.
    pub fn container(&self) -> &UiContainer {
        &self.container
    }

    /// Get the inner container mutably.
    pub fn container_mut(&mut self) -> &mut UiContainer {
        &mut self.container
    }

    /// Append a child.
    pub fn add(&mut self, child: impl UiComponent + 'static) -> &mut Self {
        self.container.add(child);
        self
    }

    /// Append a child, builder style.
    pub fn with_child(mut self, child: impl UiComponent + 'static) -> Self {
        self.container.add(child);
        self
    }
}

impl UiComponent for ScopedContainer {
    fn render(&mut self, ui: &mut dyn ImmediateUi, commands: &mut CommandList) -> RenderResult<()> {
        let Some(mut scope) = ScopeGuard::open(ui, self.kind, &self.label) else {
            tracing::trace!("{:?} '{}' stayed shut", self.kind, self.label);
            return Ok(());
        };
        // A failing child returns through `?`; the guard still closes first.
        self.container.render_children(&mut *scope, commands)
    }
}

/// A drop-down menu.
pub struct UiMenu {
    scope: ScopedContainer,
}

impl UiMenu {
    /// Create an empty menu.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            scope: ScopedContainer::new(ScopeKind::Menu, label),
        }
    }

    /// Create a menu that owns `children`.
    pub fn with_children(label: impl Into<String>, children: Vec<Box<dyn UiComponent>>) -> Self {
        Self {
            scope: ScopedContainer::with_children(ScopeKind::Menu, label, children),
        }
    }

    /// Append a child, builder style.
    pub fn with_child(mut self, child: impl UiComponent + 'static) -> Self {
        self.scope.add(child);
        self
    }
}

impl Deref for UiMenu {
    type Target = ScopedContainer;

    fn deref(&self) -> &ScopedContainer {
        &self.scope
    }
}

impl DerefMut for UiMenu {
    fn deref_mut(&mut self) -> &mut ScopedContainer {
        &mut self.scope
    }
}

impl UiComponent for UiMenu {
    fn render(&mut self, ui: &mut dyn ImmediateUi, commands: &mut CommandList) -> RenderResult<()> {
        self.scope.render(ui, commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::component::{MenuItem, RenderError};
    use crate::gui::ui::{ScriptedUi, UiEvent};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    /// Child that appends its name to a shared log when rendered.
    struct Logged {
        name: &'static str,
        log: Log,
    }

    impl UiComponent for Logged {
        fn render(&mut self, _: &mut dyn ImmediateUi, _: &mut CommandList) -> RenderResult<()> {
            self.log.borrow_mut().push(self.name);
            Ok(())
        }
    }

    fn logged(name: &'static str, log: &Log) -> Logged {
        Logged {
            name,
            log: Rc::clone(log),
        }
    }

    struct Failing(&'static str);

    impl UiComponent for Failing {
        fn render(&mut self, _: &mut dyn ImmediateUi, _: &mut CommandList) -> RenderResult<()> {
            Err(RenderError::component(self.0, "boom"))
        }
    }

    fn failing(name: &'static str) -> Failing {
        Failing(name)
    }

    #[test]
    fn test_container_renders_in_order() {
        let log = Log::default();
        let mut root = UiContainer::new()
            .with_child(logged("a", &log))
            .with_child(logged("b", &log))
            .with_child(logged("c", &log));

        let mut ui = ScriptedUi::new();
        root.render(&mut ui, &mut CommandList::default()).unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert!(ui.events().is_empty());
    }

    #[test]
    fn test_container_stops_at_failure() {
        let log = Log::default();
        let mut root = UiContainer::new()
            .with_child(logged("a", &log))
            .with_child(failing("b"))
            .with_child(logged("c", &log));

        let result = root.render(&mut ScriptedUi::new(), &mut CommandList::default());
        assert!(matches!(result, Err(RenderError::Component { .. })));
        assert_eq!(*log.borrow(), vec!["a"]);
    }

    #[test]
    fn test_shut_menu_skips_children() {
        let log = Log::default();
        let mut menu = UiMenu::new("File").with_child(logged("open", &log));

        let mut ui = ScriptedUi::new().refuse("File");
        menu.render(&mut ui, &mut CommandList::default()).unwrap();

        assert!(log.borrow().is_empty());
        assert_eq!(ui.close_count(), 0);
    }

    #[test]
    fn test_open_menu_renders_then_closes() {
        let log = Log::default();
        let children: Vec<Box<dyn UiComponent>> =
            vec![Box::new(logged("open", &log)), Box::new(logged("save", &log))];
        let mut menu = UiMenu::with_children("File", children);

        let mut ui = ScriptedUi::new();
        menu.render(&mut ui, &mut CommandList::default()).unwrap();

        assert_eq!(*log.borrow(), vec!["open", "save"]);
        assert_eq!(ui.close_count(), 1);
        assert_eq!(ui.events().last(), Some(&UiEvent::Close(ScopeKind::Menu)));
    }

    #[test]
    fn test_failing_child_closes_before_propagating() {
        let mut menu = UiMenu::new("Edit").with_child(failing("undo"));
        let mut ui = ScriptedUi::new();

        let result = menu.render(&mut ui, &mut CommandList::default());
        assert!(result.is_err());
        assert_eq!(ui.close_count(), 1);
        assert!(ui.open_scopes().is_empty());
    }

    #[test]
    fn test_nested_scopes() {
        let mut bar = ScopedContainer::new(ScopeKind::MenuBar, "main")
            .with_child(UiMenu::new("File").with_child(MenuItem::new("Quit")))
            .with_child(UiMenu::new("View"));

        let mut ui = ScriptedUi::new().refuse("View");
        bar.render(&mut ui, &mut CommandList::default()).unwrap();

        assert_eq!(ui.opened_labels(), vec!["main", "File"]);
        assert_eq!(ui.close_count(), 2);
        assert!(ui.open_scopes().is_empty());
    }

    #[test]
    fn test_children_mut_removes_children() {
        let log = Log::default();
        let mut root = UiContainer::new()
            .with_child(logged("a", &log))
            .with_child(logged("b", &log));

        root.children_mut().truncate(1);
        root.render(&mut ScriptedUi::new(), &mut CommandList::default())
            .unwrap();

        assert_eq!(root.len(), 1);
        assert_eq!(*log.borrow(), vec!["a"]);
    }

    #[test]
    fn test_relabel() {
        let mut menu = UiMenu::new("Recent");
        menu.set_label("Recent (3)");
        let mut ui = ScriptedUi::new();
        menu.render(&mut ui, &mut CommandList::default()).unwrap();
        assert_eq!(ui.opened_labels(), vec!["Recent (3)"]);
        assert_eq!(menu.kind(), ScopeKind::Menu);
    }
}
