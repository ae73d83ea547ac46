use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// Directional light uniform.
///
/// Colors are split Phong-style (ambient / diffuse / specular), matching the
/// lighting shaders' `light` block; `w` lanes are padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DirectionalLight {
    pub direction: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
}

/// Point light uniform.
///
/// `attenuation` packs the constant/linear/quadratic falloff terms in
/// `x`/`y`/`z`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointLight {
    pub position: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub attenuation: Vec4,
}

/// Spot light uniform.
///
/// `cutoff.x`/`cutoff.y` hold the cosines of the inner and outer cone
/// angles.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpotLight {
    pub position: Vec4,
    pub direction: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub attenuation: Vec4,
    pub cutoff: Vec4,
}
