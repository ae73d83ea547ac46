use glam::Mat4;

use crate::{MaterialHandle, MeshHandle};

/// One entry of a per-frame draw list: a mesh, a material, and a model
/// transform. Instances are plain values; the rendering core never mutates
/// them (the voxel debug path builds its own transforms instead).
#[derive(Clone, Copy, Debug)]
pub struct Instance {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub model: Mat4,
}

impl Instance {
    pub fn new(mesh: MeshHandle, material: MaterialHandle, model: Mat4) -> Self {
        Self {
            mesh,
            material,
            model,
        }
    }
}
