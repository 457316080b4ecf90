//! Scoped brackets
//!
//! [`ScopeGuard`] pairs a successful open with exactly one close, on every
//! exit path including `?` returns and unwinding.

use crate::gui::ui::{ImmediateUi, ScopeKind};
use std::ops::{Deref, DerefMut};

/// An open bracket. Closes it when dropped.
///
/// Only [`ScopeGuard::open`] creates guards, and only when the open succeeded,
/// so a guard always owes exactly one close.
pub struct ScopeGuard<'a, U: ImmediateUi + ?Sized> {
    ui: &'a mut U,
    kind: ScopeKind,
}

impl<'a, U: ImmediateUi + ?Sized> ScopeGuard<'a, U> {
    /// Try to open a bracket. `None` when the library declined.
    pub fn open(ui: &'a mut U, kind: ScopeKind, label: &str) -> Option<Self> {
        if ui.try_open(kind, label) {
            Some(Self { ui, kind })
        } else {
            None
        }
    }

    /// Get the kind of scope this guard closes.
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }
}

impl<U: ImmediateUi + ?Sized> Deref for ScopeGuard<'_, U> {
    type Target = U;

    fn deref(&self) -> &U {
        self.ui
    }
}

impl<U: ImmediateUi + ?Sized> DerefMut for ScopeGuard<'_, U> {
    fn deref_mut(&mut self) -> &mut U {
        self.ui
    }
}

impl<U: ImmediateUi + ?Sized> Drop for ScopeGuard<'_, U> {
    fn drop(&mut self) {
        self.ui.close(self.kind);
    }
}
