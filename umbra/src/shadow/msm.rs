use glam::{uvec2, Vec3};
use log::info;
use umbra_gpu::BlurKernel;

use crate::{
    directional_light_space, gpu, tiles_8x8, BindGroup, DepthPass,
    DoubleBuffered, Engine, FilterPass, FrameContext, Instance, Materials,
    Meshes, ObjectPass, ObjectPassTarget, PointLight, SoftShadowConfig,
    Texture, UniformBuffer,
};

/// Moment shadow maps: four Hamburger power moments of depth encoded and
/// blurred in one fused separable pass (the first pass reads raw depth and
/// computes the moments per tap, the second blurs the moment buffer), then
/// reconstructed at shading time with the 4-moment Hausdorff bound.
/// Tighter than VSM at four 16-bit channels per texel.
#[derive(Clone, Copy, Debug)]
pub struct MsmConfig {
    pub soft: SoftShadowConfig,
    pub kernel_size: u32,
}

impl Default for MsmConfig {
    fn default() -> Self {
        Self {
            soft: SoftShadowConfig::narrow(),
            kernel_size: 5,
        }
    }
}

#[derive(Debug)]
pub struct MsmShadow {
    resolution: u32,
    depth_map: Texture,
    depth_pass: DepthPass,
    maps: DoubleBuffered<Texture>,
    moment_pass: FilterPass<gpu::BlurPassParams>,
    bg_first: BindGroup,
    bg_second: wgpu::BindGroup,
    lighting: ObjectPass,
    camera: UniformBuffer<gpu::Camera>,
}

impl MsmShadow {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        light: PointLight,
        direction: Vec3,
        config: MsmConfig,
    ) -> Self {
        info!("Creating MSM shadow: {config:?}");

        let resolution = config.soft.resolution;

        let light_space = directional_light_space(
            light.position,
            direction,
            config.soft.ortho_width / 2.0,
            config.soft.near,
            config.soft.far,
        );

        let depth_map = Texture::builder("msm_depth")
            .with_size(uvec2(resolution, resolution))
            .with_format(wgpu::TextureFormat::Depth32Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let depth_pass = DepthPass::new(engine, device, "msm", light_space);

        let map = |side: &str| {
            Texture::builder(format!("msm_moments_{side}"))
                .with_size(uvec2(resolution, resolution))
                .with_format(wgpu::TextureFormat::Rgba16Float)
                .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
                .with_usage(wgpu::TextureUsages::STORAGE_BINDING)
                .with_linear_filtering()
                .build(device)
        };

        let maps = DoubleBuffered::new(map("a"), map("b"));

        let kernel = UniformBuffer::new(
            device,
            "msm_blur_kernel",
            &BlurKernel::gaussian(config.kernel_size),
        );

        // The fused pass binds both the raw depth and the moment buffer;
        // the `first` flag selects which one the taps come from.
        let bg_first = BindGroup::builder("msm_moments_first")
            .add(&kernel.bind_readable())
            .add(&depth_map.bind_depth())
            .add(&maps.get(false).bind_readable())
            .add(&maps.get(true).bind_storage(0))
            .build(device);

        let bg_second = bg_first.rebind(
            device,
            "msm_moments_second",
            &[
                &kernel.bind_readable(),
                &depth_map.bind_depth(),
                &maps.get(true).bind_readable(),
                &maps.get(false).bind_storage(0),
            ],
        );

        let moment_pass = FilterPass::new(
            device,
            "msm_moments",
            &engine.shaders().msm_moments,
            "cs_main",
            &[bg_first.layout()],
        );

        let camera =
            UniformBuffer::new(device, "msm_camera", &gpu::Camera::default());

        let light_buf =
            UniformBuffer::new(device, "msm_light", &light.serialize());

        let params = UniformBuffer::new(
            device,
            "msm_params",
            &gpu::ShadowParams { light_space },
        );

        let bg0 = BindGroup::builder("msm_bg0")
            .add(&camera.bind_readable())
            .add(&light_buf.bind_readable())
            .add(&params.bind_readable())
            .add(&maps.get(false).bind_sampled())
            .build(device);

        let lighting = ObjectPass::builder("msm_lighting").build(
            device,
            &engine.shaders().lighting_msm,
            bg0,
            engine.materials.layout(),
        );

        Self {
            resolution,
            depth_map,
            depth_pass,
            maps,
            moment_pass,
            bg_first,
            bg_second,
            lighting,
            camera,
        }
    }

    /// Depth capture, then the fused moment-encode + separable blur; the
    /// final moment buffer lands in the first ping-pong side.
    pub fn draw_maps(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        objects: &[Instance],
        meshes: &Meshes,
    ) {
        self.depth_pass
            .run(encoder, self.depth_map.view(), objects, meshes);

        let groups = tiles_8x8(self.resolution, self.resolution);

        self.moment_pass.run(
            encoder,
            &[self.bg_first.as_ref()],
            groups,
            gpu::BlurPassParams {
                horizontal: 1,
                first: 1,
                last: 0,
                pad: 0,
            },
        );

        self.moment_pass.run(
            encoder,
            &[&self.bg_second],
            groups,
            gpu::BlurPassParams {
                horizontal: 0,
                first: 0,
                last: 1,
                pad: 0,
            },
        );
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

    pub fn moments(&self) -> &Texture {
        self.maps.get(false)
    }
}
