use glam::{uvec2, vec4, Vec3};
use log::info;

use crate::{
    directional_light_space, gpu, tiles_8x8, BindGroup, DepthPass, Engine,
    FilterPass, FrameContext, Instance, Materials, Meshes, ObjectPass,
    ObjectPassTarget, PointLight, SatBuilder, SoftShadowConfig, Texture,
    UniformBuffer,
};

/// Variance soft shadow maps: the same moments + SAT construction as VSM,
/// but the lighting shader estimates a per-pixel penumbra from the SAT's
/// average-blocker query and widens its box filter up to the kernel-size
/// uniform, which stays adjustable between frames.
#[derive(Clone, Copy, Debug)]
pub struct VssmConfig {
    pub soft: SoftShadowConfig,
    pub kernel_size: u32,
    pub radix: u32,
}

impl Default for VssmConfig {
    fn default() -> Self {
        Self {
            soft: SoftShadowConfig::default(),
            kernel_size: 5,
            radix: 2,
        }
    }
}

#[derive(Debug)]
pub struct VssmShadow {
    resolution: u32,
    depth_map: Texture,
    depth_pass: DepthPass,
    encode: FilterPass,
    encode_bg: BindGroup,
    sat: SatBuilder,
    lighting: ObjectPass,
    camera: UniformBuffer<gpu::Camera>,
    params: UniformBuffer<gpu::VsmParams>,
    params_value: gpu::VsmParams,
}

impl VssmShadow {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        light: PointLight,
        direction: Vec3,
        config: VssmConfig,
    ) -> Self {
        info!("Creating VSSM shadow: {config:?}");

        let resolution = config.soft.resolution;

        let light_space = directional_light_space(
            light.position,
            direction,
            config.soft.ortho_width / 2.0,
            config.soft.near,
            config.soft.far,
        );

        let depth_map = Texture::builder("vssm_depth")
            .with_size(uvec2(resolution, resolution))
            .with_format(wgpu::TextureFormat::Depth32Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let moments = Texture::builder("vssm_moments")
            .with_size(uvec2(resolution, resolution))
            .with_format(wgpu::TextureFormat::Rg32Float)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .with_usage(wgpu::TextureUsages::STORAGE_BINDING)
            .build(device);

        let depth_pass = DepthPass::new(engine, device, "vssm", light_space);

        let encode_bg = BindGroup::builder("vssm_encode_bg")
            .add(&depth_map.bind_depth())
            .add(&moments.bind_storage(0))
            .build(device);

        let encode = FilterPass::new(
            device,
            "vssm_encode",
            &engine.shaders().depth_moments,
            "cs_main",
            &[encode_bg.layout()],
        );

        let sat = SatBuilder::new(
            engine,
            device,
            "vssm",
            &moments,
            resolution,
            config.radix,
        );

        let camera =
            UniformBuffer::new(device, "vssm_camera", &gpu::Camera::default());

        let light_buf =
            UniformBuffer::new(device, "vssm_light", &light.serialize());

        let params_value = gpu::VsmParams {
            light_space,
            data: vec4(
                config.soft.light_width,
                config.soft.near,
                config.soft.far,
                config.soft.ortho_width,
            ),
            kernel: vec4(config.kernel_size as f32, 0.0, 0.0, 0.0),
        };

        let params = UniformBuffer::new(device, "vssm_params", &params_value);

        let bg0 = BindGroup::builder("vssm_bg0")
            .add(&camera.bind_readable())
            .add(&light_buf.bind_readable())
            .add(&params.bind_readable())
            .add(&sat.result().bind_readable())
            .build(device);

        let lighting = ObjectPass::builder("vssm_lighting").build(
            device,
            &engine.shaders().lighting_vssm,
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
            params,
            params_value,
        }
    }

    /// Adjusts the maximum filter width between frames.
    pub fn set_kernel_size(&mut self, queue: &wgpu::Queue, kernel_size: u32) {
        self.params_value.kernel.x = kernel_size as f32;
        self.params.write(queue, &self.params_value);
    }

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
