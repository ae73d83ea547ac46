use glam::{uvec2, vec4, Vec3};
use log::info;

use crate::{
    directional_light_space, gpu, tiles_8x8, BindGroup, DepthPass, Engine,
    FilterPass, FrameContext, GaussianBlur, Instance, Materials, Meshes,
    ObjectPass, ObjectPassTarget, PointLight, SoftShadowConfig, Texture,
    UniformBuffer,
};

/// Exponential shadow maps: depth exponentiated by `c` into a
/// single-channel buffer, Gaussian-blurred, and recovered at shading time
/// via `exp(c·(d_receiver − d_blurred))`. `c` is taken as-is; very large
/// coefficients overflow the exponential and that is the caller's tradeoff
/// to make.
#[derive(Clone, Copy, Debug)]
pub struct EsmConfig {
    pub soft: SoftShadowConfig,
    pub c: f32,
    pub kernel_size: u32,
}

impl Default for EsmConfig {
    fn default() -> Self {
        Self {
            soft: SoftShadowConfig::narrow(),
            c: 80.0,
            kernel_size: 5,
        }
    }
}

#[derive(Debug)]
pub struct EsmShadow {
    resolution: u32,
    c: f32,
    depth_map: Texture,
    depth_pass: DepthPass,
    encode: FilterPass<gpu::EsmEncodeParams>,
    encode_bg: BindGroup,
    blur: GaussianBlur,
    lighting: ObjectPass,
    camera: UniformBuffer<gpu::Camera>,
}

impl EsmShadow {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        light: PointLight,
        direction: Vec3,
        config: EsmConfig,
    ) -> Self {
        info!("Creating ESM shadow: {config:?}");

        let resolution = config.soft.resolution;

        let light_space = directional_light_space(
            light.position,
            direction,
            config.soft.ortho_width / 2.0,
            config.soft.near,
            config.soft.far,
        );

        let depth_map = Texture::builder("esm_depth")
            .with_size(uvec2(resolution, resolution))
            .with_format(wgpu::TextureFormat::Depth32Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let exp_map = Texture::builder("esm_exp")
            .with_size(uvec2(resolution, resolution))
            .with_format(wgpu::TextureFormat::R32Float)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .with_usage(wgpu::TextureUsages::STORAGE_BINDING)
            .build(device);

        let depth_pass = DepthPass::new(engine, device, "esm", light_space);

        let encode_bg = BindGroup::builder("esm_encode_bg")
            .add(&depth_map.bind_depth())
            .add(&exp_map.bind_storage(0))
            .build(device);

        let encode = FilterPass::new(
            device,
            "esm_encode",
            &engine.shaders().esm_encode,
            "cs_main",
            &[encode_bg.layout()],
        );

        let blur = GaussianBlur::new(
            engine,
            device,
            "esm",
            &exp_map,
            resolution,
            config.kernel_size,
        );

        let camera =
            UniformBuffer::new(device, "esm_camera", &gpu::Camera::default());

        let light_buf =
            UniformBuffer::new(device, "esm_light", &light.serialize());

        let params = UniformBuffer::new(
            device,
            "esm_params",
            &gpu::EsmParams {
                light_space,
                data: vec4(config.c, 0.0, 0.0, 0.0),
            },
        );

        let bg0 = BindGroup::builder("esm_bg0")
            .add(&camera.bind_readable())
            .add(&light_buf.bind_readable())
            .add(&params.bind_readable())
            .add(&blur.result().bind_readable())
            .build(device);

        let lighting = ObjectPass::builder("esm_lighting").build(
            device,
            &engine.shaders().lighting_esm,
            bg0,
            engine.materials.layout(),
        );

        Self {
            resolution,
            c: config.c,
            depth_map,
            depth_pass,
            encode,
            encode_bg,
            blur,
            lighting,
            camera,
        }
    }

    /// Depth capture, exponential encode, then the two blur passes.
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
            gpu::EsmEncodeParams {
                data: vec4(self.c, 0.0, 0.0, 0.0),
            },
        );

        self.blur.run(encoder);
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
}
