//! Surface projection
//!
//! Maps surface pixels (origin top-left, y down) to normalized device
//! coordinates.

use glam::{Mat4, Vec2, Vec3};

/// Vertical orientation of the device's clip space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipSpace {
    /// +y points up in NDC (wgpu, Direct3D, Metal, OpenGL). The surface's
    /// y-down space is flipped.
    #[default]
    YUp,
    /// +y points down in NDC (raw Vulkan).
    YDown,
}

/// Projection for a surface of `size` pixels.
///
/// With [`ClipSpace::YUp`], `(0, 0)` maps to `(-1, 1)` and `size` maps to `(1, -1)`.
/// Sizes below one pixel are clamped.
pub fn projection(size: Vec2, clip: ClipSpace) -> Mat4 {
    let size = size.max(Vec2::ONE);
    match clip {
        ClipSpace::YUp => {
            Mat4::from_translation(Vec3::new(-1.0, 1.0, 0.0))
                * Mat4::from_scale(Vec3::new(2.0 / size.x, -2.0 / size.y, 1.0))
        }
        ClipSpace::YDown => {
            Mat4::from_translation(Vec3::new(-1.0, -1.0, 0.0))
                * Mat4::from_scale(Vec3::new(2.0 / size.x, 2.0 / size.y, 1.0))
        }
    }
}
