use glam::{Mat4, Vec3};

use crate::gpu;

/// Host-side camera state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Camera {
    pub fn new(position: Vec3, view: Mat4, projection: Mat4) -> Self {
        Self {
            position,
            view,
            projection,
        }
    }

    /// A perspective camera looking from `position` toward `target`.
    pub fn look_at(position: Vec3, target: Vec3, fov_y: f32, aspect: f32) -> Self {
        Self {
            position,
            view: Mat4::look_at_rh(position, target, Vec3::Y),
            projection: Mat4::perspective_rh(fov_y, aspect, 0.1, 1000.0),
        }
    }

    pub(crate) fn serialize(&self) -> gpu::Camera {
        gpu::Camera {
            view: self.view,
            projection: self.projection,
            position: self.position.extend(0.0),
        }
    }
}
