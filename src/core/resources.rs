//! Ordered ownership of device objects
//!
//! A [`ResourceGroup`] collects every handle a surface creates and releases them
//! together, newest first, so that dependent objects (resource sets, pipelines)
//! go away before the layouts and buffers they reference.

use crate::core::device::{GpuResult, RenderDevice, ResourceHandle};

/// A set of device objects released together, in reverse order of insertion.
#[derive(Debug)]
pub struct ResourceGroup {
    label: String,
    handles: Vec<ResourceHandle>,
    disposed: bool,
}

impl ResourceGroup {
    /// Create an empty group.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            handles: Vec::new(),
            disposed: false,
        }
    }

    /// Build resources through `build`, releasing everything it added if it fails.
    ///
    /// On success the populated group is returned alongside the closure's value.
    pub fn try_build<D, T, F>(
        device: &mut D,
        label: impl Into<String>,
        build: F,
    ) -> GpuResult<(Self, T)>
    where
        D: RenderDevice + ?Sized,
        F: FnOnce(&mut D, &mut ResourceGroup) -> GpuResult<T>,
    {
        let mut group = Self::new(label);
        match build(device, &mut group) {
            Ok(value) => Ok((group, value)),
            Err(err) => {
                tracing::debug!(
                    "resource group '{}' failed to build, releasing {} handles: {}",
                    group.label,
                    group.len(),
                    err
                );
                group.dispose(device);
                Err(err)
            }
        }
    }

    /// Register a handle and hand it back.
    ///
    /// # Panics
    ///
    /// Panics if the handle is already registered or the group was disposed.
    pub fn add<H>(&mut self, handle: H) -> H
    where
        H: Into<ResourceHandle> + Copy,
    {
        assert!(
            !self.disposed,
            "resource group '{}' used after dispose",
            self.label
        );
        let resource = handle.into();
        assert!(
            !self.handles.contains(&resource),
            "{} {} added twice to resource group '{}'",
            resource.kind(),
            resource.id(),
            self.label
        );
        self.handles.push(resource);
        handle
    }

    /// Register several handles and hand them back in the same order.
    pub fn add_many<H, I>(&mut self, handles: I) -> Vec<H>
    where
        H: Into<ResourceHandle> + Copy,
        I: IntoIterator<Item = H>,
    {
        handles.into_iter().map(|handle| self.add(handle)).collect()
    }

    /// Swap a registered handle for a new one, keeping its release position.
    ///
    /// The old handle is released immediately.
    ///
    /// # Panics
    ///
    /// Panics if `old` is not part of the group.
    pub fn replace<D, H>(&mut self, device: &mut D, old: H, new: H) -> H
    where
        D: RenderDevice + ?Sized,
        H: Into<ResourceHandle> + Copy,
    {
        let old = old.into();
        let slot = self
            .handles
            .iter()
            .position(|handle| *handle == old)
            .unwrap_or_else(|| {
                panic!(
                    "{} {} is not part of resource group '{}'",
                    old.kind(),
                    old.id(),
                    self.label
                )
            });
        self.handles[slot] = new.into();
        device.destroy(old);
        new
    }

    /// Release every handle, newest first.
    ///
    /// # Panics
    ///
    /// Panics when called a second time.
    pub fn dispose<D>(&mut self, device: &mut D)
    where
        D: RenderDevice + ?Sized,
    {
        assert!(
            !self.disposed,
            "resource group '{}' disposed twice",
            self.label
        );
        self.disposed = true;

        tracing::debug!(
            "disposing resource group '{}' ({} handles)",
            self.label,
            self.handles.len()
        );
        while let Some(handle) = self.handles.pop() {
            device.destroy(handle);
        }
    }

    /// Check whether a handle is registered.
    pub fn contains<H: Into<ResourceHandle>>(&self, handle: H) -> bool {
        self.handles.contains(&handle.into())
    }

    /// Registered handles in insertion order.
    pub fn handles(&self) -> &[ResourceHandle] {
        &self.handles
    }

    /// Get the group label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the number of registered handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Check whether the group owns nothing.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Check whether the group has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for ResourceGroup {
    fn drop(&mut self) {
        if !self.disposed && !self.handles.is_empty() {
            tracing::warn!(
                "resource group '{}' dropped without dispose, leaking {} handles",
                self.label,
                self.handles.len()
            );
        }
    }
}
