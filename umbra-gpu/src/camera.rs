use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Per-pass camera uniform.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Camera {
    pub view: Mat4,
    pub projection: Mat4,

    /// Eye position; `w` is unused.
    pub position: Vec4,
}
