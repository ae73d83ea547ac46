//! The shadow-mapping techniques.
//!
//! Every technique follows the same two-phase per-frame protocol: a
//! visibility phase ([`ShadowTechnique::draw_shadow_maps`]) renders and
//! filters the technique's private buffers, and a lighting phase
//! ([`ShadowTechnique::draw_objects`]) shades the draw list into the HDR
//! target, sampling those buffers. The phases are a true data dependency
//! and must run in that order within a frame.
//!
//! All GPU resources are allocated at construction and reused every frame.

mod blur;
mod esm;
mod hard_dir;
mod hard_point;
mod hard_spot;
mod msm;
mod pcss;
mod sat;
mod vsm;
mod vssm;

pub use self::blur::*;
pub use self::esm::*;
pub use self::hard_dir::*;
pub use self::hard_point::*;
pub use self::hard_spot::*;
pub use self::msm::*;
pub use self::pcss::*;
pub use self::sat::*;
pub use self::vsm::*;
pub use self::vssm::*;

use crate::{FrameContext, Instance, Materials, Meshes};

/// Configuration of the plain directional shadow map. The orthographic
/// extent and depth range are deliberately explicit inputs, not derived
/// from scene bounds; receivers outside the box get border visibility.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirShadowConfig {
    pub resolution: u32,
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for DirShadowConfig {
    fn default() -> Self {
        Self {
            resolution: 1024,
            half_extent: 20.0,
            near: 0.1,
            far: 30.0,
        }
    }
}

/// Configuration of the cubemap shadow maps (point and spot).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeShadowConfig {
    pub resolution: u32,
    pub near: f32,
    pub far: f32,
}

impl Default for CubeShadowConfig {
    fn default() -> Self {
        Self {
            resolution: 1024,
            near: 0.1,
            far: 200.0,
        }
    }
}

/// Shared configuration of the soft-shadow techniques: a directional
/// capture through an orthographic box of `ortho_width`, plus the area
/// light's width driving penumbra estimation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoftShadowConfig {
    pub resolution: u32,
    pub ortho_width: f32,
    pub near: f32,
    pub far: f32,
    pub light_width: f32,
}

impl Default for SoftShadowConfig {
    fn default() -> Self {
        Self {
            resolution: 1024,
            ortho_width: 100.0,
            near: 0.1,
            far: 100.0,
            light_width: 1.0,
        }
    }
}

impl SoftShadowConfig {
    /// The narrower orthographic box the blur-based techniques (ESM/MSM)
    /// default to.
    pub fn narrow() -> Self {
        Self {
            ortho_width: 50.0,
            ..Self::default()
        }
    }
}

/// The closed set of shadow techniques; the variant set is fixed at design
/// time, so dispatch is a plain match rather than virtual calls.
#[derive(Debug)]
pub enum ShadowTechnique {
    HardDir(HardDirShadow),
    HardPoint(HardPointShadow),
    HardSpot(HardSpotShadow),
    Pcss(PcssShadow),
    Vssm(VssmShadow),
    Esm(EsmShadow),
    Msm(MsmShadow),
    Vsm(VsmShadow),
}

impl ShadowTechnique {
    /// Phase (a): renders this technique's visibility buffers (depth maps,
    /// moment maps, SATs, blurred maps).
    pub fn draw_shadow_maps(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        objects: &[Instance],
        meshes: &Meshes,
    ) {
        match self {
            Self::HardDir(t) => t.draw_shadow_map(encoder, objects, meshes),
            Self::HardPoint(t) => t.draw_shadow_map(encoder, objects, meshes),
            Self::HardSpot(t) => t.draw_shadow_map(encoder, objects, meshes),
            Self::Pcss(t) => t.draw_shadow_map(encoder, objects, meshes),
            Self::Vssm(t) => t.draw_maps(encoder, objects, meshes),
            Self::Esm(t) => t.draw_maps(encoder, objects, meshes),
            Self::Msm(t) => t.draw_maps(encoder, objects, meshes),
            Self::Vsm(t) => t.draw_maps(encoder, objects, meshes),
        }
    }

    /// Phase (b): shades the draw list into the frame's HDR target.
    pub fn draw_objects(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        frame: &FrameContext,
        objects: &[Instance],
        meshes: &Meshes,
        materials: &Materials,
    ) {
        match self {
            Self::HardDir(t) => {
                t.draw_objects(queue, encoder, frame, objects, meshes, materials)
            }
            Self::HardPoint(t) => {
                t.draw_objects(queue, encoder, frame, objects, meshes, materials)
            }
            Self::HardSpot(t) => {
                t.draw_objects(queue, encoder, frame, objects, meshes, materials)
            }
            Self::Pcss(t) => {
                t.draw_objects(queue, encoder, frame, objects, meshes, materials)
            }
            Self::Vssm(t) => {
                t.draw_objects(queue, encoder, frame, objects, meshes, materials)
            }
            Self::Esm(t) => {
                t.draw_objects(queue, encoder, frame, objects, meshes, materials)
            }
            Self::Msm(t) => {
                t.draw_objects(queue, encoder, frame, objects, meshes, materials)
            }
            Self::Vsm(t) => {
                t.draw_objects(queue, encoder, frame, objects, meshes, materials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configs_default_to_the_tuned_constants() {
        let dir = DirShadowConfig::default();
        assert_eq!((dir.resolution, dir.half_extent), (1024, 20.0));
        assert_eq!((dir.near, dir.far), (0.1, 30.0));

        let cube = CubeShadowConfig::default();
        assert_eq!((cube.near, cube.far), (0.1, 200.0));

        let soft = SoftShadowConfig::default();
        assert_eq!(soft.ortho_width, 100.0);
        assert_eq!(SoftShadowConfig::narrow().ortho_width, 50.0);
    }
}
