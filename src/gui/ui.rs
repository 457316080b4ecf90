//! Immediate-mode UI seam
//!
//! The composition tree never draws control chrome itself. It talks to the
//! host widget library through [`ImmediateUi`]: open/close brackets, leaf
//! widgets, and showing a rendered target on screen.

use crate::core::TargetHandle;

/// Kind of a scoped bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// A drop-down menu. Opens while the menu is expanded.
    Menu,
    /// The main menu bar of a window.
    MenuBar,
    /// A floating window. Opens while it is visible and not collapsed.
    Window,
}

/// Calls into a host immediate-mode widget library.
///
/// Every successful [`try_open`](ImmediateUi::try_open) must be paired with
/// exactly one [`close`](ImmediateUi::close) of the same kind. A failed open
/// must not be closed.
pub trait ImmediateUi {
    /// Try to open a bracket. Returns whether its body should be emitted.
    fn try_open(&mut self, kind: ScopeKind, label: &str) -> bool;

    /// Close a bracket opened by `try_open`.
    fn close(&mut self, kind: ScopeKind);

    /// Emit a menu item. Returns whether it was activated this frame.
    fn menu_item(&mut self, label: &str) -> bool;

    /// Show a rendered target as a screen-space rectangle of `size` points.
    fn show_target(&mut self, target: TargetHandle, size: [f32; 2]);
}

/// A call received by [`ScriptedUi`].
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Open {
        kind: ScopeKind,
        label: String,
        opened: bool,
    },
    Close(ScopeKind),
    MenuItem { label: String, activated: bool },
    ShowTarget {
        target: TargetHandle,
        size: [f32; 2],
    },
}

/// Headless [`ImmediateUi`] with scripted answers.
///
/// Brackets open unless their label was refused, items activate only when
/// listed. Every call is recorded, and the nesting of open brackets is checked.
#[derive(Debug, Default)]
pub struct ScriptedUi {
    refused: Vec<String>,
    activated: Vec<String>,
    open: Vec<ScopeKind>,
    events: Vec<UiEvent>,
}

impl ScriptedUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make brackets with this label fail to open.
    pub fn refuse(mut self, label: impl Into<String>) -> Self {
        self.refused.push(label.into());
        self
    }

    /// Make menu items with this label report activation.
    pub fn activate(mut self, label: impl Into<String>) -> Self {
        self.activated.push(label.into());
        self
    }

    /// Calls received so far.
    pub fn events(&self) -> &[UiEvent] {
        &self.events
    }

    /// Brackets currently open, innermost last.
    pub fn open_scopes(&self) -> &[ScopeKind] {
        &self.open
    }

    /// Labels of the brackets that opened, in order.
    pub fn opened_labels(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                UiEvent::Open {
                    label,
                    opened: true,
                    ..
                } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of close calls received.
    pub fn close_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, UiEvent::Close(_)))
            .count()
    }

    /// Forget recorded calls, keeping the script.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl ImmediateUi for ScriptedUi {
    fn try_open(&mut self, kind: ScopeKind, label: &str) -> bool {
        let opened = !self.refused.iter().any(|refused| refused == label);
        if opened {
            self.open.push(kind);
        }
        self.events.push(UiEvent::Open {
            kind,
            label: label.to_string(),
            opened,
        });
        opened
    }

    /// # Panics
    ///
    /// Panics when `kind` is not the innermost open bracket.
    fn close(&mut self, kind: ScopeKind) {
        let innermost = self.open.pop();
        assert_eq!(
            innermost,
            Some(kind),
            "closed {:?} while {:?} was innermost",
            kind,
            innermost
        );
        self.events.push(UiEvent::Close(kind));
    }

    fn menu_item(&mut self, label: &str) -> bool {
        let activated = self.activated.iter().any(|item| item == label);
        self.events.push(UiEvent::MenuItem {
            label: label.to_string(),
            activated,
        });
        activated
    }

    fn show_target(&mut self, target: TargetHandle, size: [f32; 2]) {
        self.events.push(UiEvent::ShowTarget { target, size });
    }
}
