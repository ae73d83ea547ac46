use glam::{uvec2, vec4, Vec3};
use log::info;

use crate::{
    directional_light_space, gpu, tiles_8x8, BindGroup, DepthPass, Engine,
    FilterPass, FrameContext, Instance, Materials, Meshes, ObjectPass,
    ObjectPassTarget, PointLight, SatBuilder, SoftShadowConfig, Texture,
    UniformBuffer,
};

/// Variance shadow maps: depth and depth² re-encoded into a two-channel
/// buffer, prefix-summed into a SAT, and bounded with Chebyshev's
/// inequality over an O(1) box filter at shading time. Trades light
/// bleeding for filtering cost.
#[derive(Clone, Copy, Debug)]
pub struct VsmConfig {
    pub soft: SoftShadowConfig,
    pub kernel_size: u32,
    pub radix: u32,
}

impl Default for VsmConfig {
    fn default() -> Self {
        Self {
            soft: SoftShadowConfig::default(),
            kernel_size: 2,
            radix: 2,
        }
    }
}

#[derive(Debug)]
pub struct VsmShadow {
    resolution: u32,
    depth_map: Texture,
    depth_pass: DepthPass,
    encode: FilterPass,
    encode_bg: BindGroup,
    sat: SatBuilder,
    lighting: ObjectPass,
    camera: UniformBuffer<gpu::Camera>,
}

impl VsmShadow {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        light: PointLight,
        direction: Vec3,
        config: VsmConfig,
    ) -> Self {
        info!("Creating VSM shadow: {config:?}");

        let resolution = config.soft.resolution;

        let light_space = directional_light_space(
            light.position,
            direction,
            config.soft.ortho_width / 2.0,
            config.soft.near,
            config.soft.far,
        );

        let depth_map = Texture::builder("vsm_depth")
            .with_size(uvec2(resolution, resolution))
            .with_format(wgpu::TextureFormat::Depth32Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let moments = Texture::builder("vsm_moments")
            .with_size(uvec2(resolution, resolution))
            .with_format(wgpu::TextureFormat::Rg32Float)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .with_usage(wgpu::TextureUsages::STORAGE_BINDING)
            .build(device);

        let depth_pass = DepthPass::new(engine, device, "vsm", light_space);

        let encode_bg = BindGroup::builder("vsm_encode_bg")
            .add(&depth_map.bind_depth())
            .add(&moments.bind_storage(0))
            .build(device);

        let encode = FilterPass::new(
            device,
            "vsm_encode",
            &engine.shaders().depth_moments,
            "cs_main",
            &[encode_bg.layout()],
        );

        let sat = SatBuilder::new(
            engine,
            device,
            "vsm",
            &moments,
            resolution,
            config.radix,
        );

        let camera =
            UniformBuffer::new(device, "vsm_camera", &gpu::Camera::default());

        let light_buf =
            UniformBuffer::new(device, "vsm_light", &light.serialize());

        let params = UniformBuffer::new(
            device,
            "vsm_params",
            &gpu::VsmParams {
                light_space,
                data: vec4(
                    config.soft.light_width,
                    config.soft.near,
                    config.soft.far,
                    config.soft.ortho_width,
                ),
                kernel: vec4(config.kernel_size as f32, 0.0, 0.0, 0.0),
            },
        );

        let bg0 = BindGroup::builder("vsm_bg0")
            .add(&camera.bind_readable())
            .add(&light_buf.bind_readable())
            .add(&params.bind_readable())
            .add(&sat.result().bind_readable())
            .build(device);

        let lighting = ObjectPass::builder("vsm_lighting").build(
            device,
            &engine.shaders().lighting_vsm,
            bg0,
            engine.materials.layout(),
        );

        Self {
            resolution,
            depth_map,
            depth_pass,
            encode,
            encode_bg,
            sat,
            lighting,
            camera,
        }
    }

    /// Depth capture, depth/depth² encode, then the SAT schedule.
    pub fn draw_maps(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        objects: &[Instance],
        meshes: &Meshes,
    ) {
        self.depth_pass
            .run(encoder, self.depth_map.view(), objects, meshes);

        self.encode.run(
            encoder,
            &[self.encode_bg.as_ref()],
            tiles_8x8(self.resolution, self.resolution),
            (),
        );

        self.sat.run(encoder);
    }

    pub fn draw_objects(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        frame: &FrameContext,
        objects: &[Instance],
        meshes: &Meshes,
        materials: &Materials,
    ) {
        self.camera.write(queue, &frame.camera.serialize());

        self.lighting.run(
            encoder,
            ObjectPassTarget {
                colors: &[frame.target.color().view()],
                depth: Some(frame.target.depth().view()),
                clear: None,
            },
            objects,
            meshes,
            materials,
        );
    }

    pub fn sat(&self) -> &SatBuilder {
        &self.sat
    }
}
