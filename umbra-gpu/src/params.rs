use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Per-object push constants shared by every raster pass that walks the
/// draw list: the model matrix plus the material scalars
/// (`material.x` = shininess, `material.y` = roughness).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct DrawParams {
    pub model: Mat4,
    pub material: Vec4,
}

/// Light-space transform for the plain directional shadow techniques.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct ShadowParams {
    pub light_space: Mat4,
}

/// Extra scalars for the cubemap shadow lighting passes; `data.x` is the
/// far plane used to normalize the stored light distance.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct PointShadowParams {
    pub data: Vec4,
}

/// One cubemap face of a point/spot depth pass: the face transform plus the
/// light position (`light_pos.w` is the far plane).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct CubeFaceParams {
    pub matrix: Mat4,
    pub light_pos: Vec4,
}

/// PCSS lighting uniforms. `data` packs
/// (light width, near plane, far plane, orthographic extent).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct PcssParams {
    pub light_space: Mat4,
    pub data: Vec4,
}

/// VSM/VSSM lighting uniforms; `data` as in [`PcssParams`], `kernel.x` is
/// the box-filter half-size in texels.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct VsmParams {
    pub light_space: Mat4,
    pub data: Vec4,
    pub kernel: Vec4,
}

/// ESM lighting uniforms; `data.x` is the exponential coefficient `c`.
/// The coefficient is deliberately not clamped anywhere on the host: an
/// excessively large `c` overflows in the shader and that risk belongs to
/// the caller.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct EsmParams {
    pub light_space: Mat4,
    pub data: Vec4,
}

/// RSM lighting uniforms; `data.x` is the kernel radius `r_max` in shadow-map
/// UV units, `data.y` the indirect-light intensity scale.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct RsmParams {
    pub light_space: Mat4,
    pub data: Vec4,
}

/// The 256-sample jittered kernel, packed two `vec2` samples per `vec4` to
/// satisfy uniform array strides.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct SampleKernel {
    pub samples: [Vec4; 128],
}

/// Voxelization uniforms: the three axis-aligned orthographic projections,
/// the RSM light-space transform, and the voxel box. `bounds_max.w` carries
/// the grid resolution.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct VoxelizeParams {
    pub proj_x: Mat4,
    pub proj_y: Mat4,
    pub proj_z: Mat4,
    pub light_space: Mat4,
    pub bounds_min: Vec4,
    pub bounds_max: Vec4,
}

/// Cone-trace lighting uniforms; bounds as in [`VoxelizeParams`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct ConeTraceParams {
    pub light_space: Mat4,
    pub bounds_min: Vec4,
    pub bounds_max: Vec4,
}

/// SAT build push constants: the radix, the pass index within the current
/// axis, and the axis selector (0 = horizontal, 1 = vertical).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct SatPassParams {
    pub radix: u32,
    pub pass_index: u32,
    pub axis: u32,
    pub pad: u32,
}

/// Separable blur push constants; `first` flags the pass that still reads
/// the unfiltered source, `last` the pass producing the final buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct BlurPassParams {
    pub horizontal: u32,
    pub first: u32,
    pub last: u32,
    pub pad: u32,
}

/// Precomputed Gaussian tap weights for the separable blurs, packed four per
/// `vec4`; `data.x` is the tap count (kernel half-size + 1) as a float.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct BlurKernel {
    pub weights: [Vec4; 8],
    pub data: Vec4,
}

/// ESM encode push constants; `data.x` is the coefficient `c`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct EsmEncodeParams {
    pub data: Vec4,
}

/// Push constants for the diagnostic voxel cube draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct DebugVoxelParams {
    pub model: Mat4,
    pub color: Vec4,
}

/// Tonemap push constants; `data.x` is the exposure.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct TonemapParams {
    pub data: Vec4,
}

impl std::fmt::Debug for SampleKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleKernel")
            .field("samples", &self.samples.len())
            .finish()
    }
}
