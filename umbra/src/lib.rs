//! Umbra: a real-time shadow and global-illumination playground.
//!
//! The crate implements seven shadow-mapping techniques (hard
//! directional/point/spot, PCSS, VSSM, ESM, MSM, VSM), reflective shadow
//! maps with one- and two-pass indirect gathering, and voxel cone-traced
//! GI, as fixed, compiled render-pass pipelines over `wgpu`. Window and
//! surface management stay outside; callers hand in a device, a queue and
//! an output view.
//!
//! Every technique allocates all of its GPU resources at construction and
//! reuses them each frame. A frame runs each technique's phases in order:
//! shadow/voxel passes first, lighting passes second — the later phases
//! read what the earlier ones wrote.
//!
//! Resource-setup failures (shader or pipeline validation) are reported
//! through the device's uncaptured-error hook as log lines and execution
//! continues with the broken resource producing wrong pixels; the
//! log-and-continue behavior is a deliberate choice, not an accident.

mod buffers;
mod camera;
mod frame;
mod images;
mod instance;
mod light;
mod materials;
mod mesh;
mod passes;
mod rsm;
mod shaders;
mod shadow;
mod tonemap;
mod vxgi;

pub use umbra_gpu as gpu;

pub use self::buffers::*;
pub use self::camera::*;
pub use self::frame::*;
pub use self::images::*;
pub use self::instance::*;
pub use self::light::*;
pub use self::materials::*;
pub use self::mesh::*;
pub use self::passes::*;
pub use self::rsm::*;
pub(crate) use self::shaders::*;
pub use self::shadow::*;
pub use self::tonemap::*;
pub use self::vxgi::*;

use log::{error, info};

/// The engine: compiled shaders plus the scene registries every technique
/// draws from. Techniques are constructed against it and own their private
/// buffers and pipelines.
pub struct Engine {
    shaders: Shaders,
    pub meshes: Meshes,
    pub images: Images,
    pub materials: Materials,
}

impl Engine {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        info!("Initializing engine");

        // Setup failures are diagnostics, not aborts: log and keep going.
        device.on_uncaptured_error(Box::new(|err| {
            error!("GPU error: {err}");
        }));

        let shaders = Shaders::new(device);
        let images = Images::new(device, queue);
        let materials = Materials::new(device, &images);

        Self {
            shaders,
            meshes: Meshes::default(),
            images,
            materials,
        }
    }

    /// Features the device must be created with.
    pub fn required_features() -> wgpu::Features {
        wgpu::Features::PUSH_CONSTANTS
    }

    /// Limits the device must be created with.
    pub fn required_limits() -> wgpu::Limits {
        wgpu::Limits {
            max_push_constant_size: 128,
            ..wgpu::Limits::default()
        }
    }

    pub fn add_mesh(
        &mut self,
        device: &wgpu::Device,
        data: &MeshData,
    ) -> MeshHandle {
        self.meshes.add(device, data)
    }

    pub fn add_image_from_memory(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
    ) -> Result<ImageHandle, image::ImageError> {
        self.images.add_from_memory(device, queue, bytes)
    }

    pub fn add_image_from_path(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<std::path::Path>,
    ) -> Result<ImageHandle, image::ImageError> {
        self.images.add_from_path(device, queue, path)
    }

    pub fn add_material(
        &mut self,
        device: &wgpu::Device,
        desc: MaterialDesc,
    ) -> MaterialHandle {
        self.materials.add(device, &self.images, desc)
    }

    pub(crate) fn shaders(&self) -> &Shaders {
        &self.shaders
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        info!("Releasing engine");
    }
}
