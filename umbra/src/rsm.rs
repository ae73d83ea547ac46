use derivative::Derivative;
use glam::{uvec2, vec4, Mat4, UVec2, Vec2, Vec3};
use log::info;
use umbra_gpu::{jittered_kernel, SampleKernel};

use crate::{
    directional_light_space, gpu, BindGroup, DirLight, Engine, FrameContext,
    Instance, Materials, Meshes, ObjectPass, ObjectPassTarget, Texture,
    UniformBuffer,
};

/// Kernel radius in shadow-map UV units for the indirect gather.
const R_MAX: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RsmConfig {
    pub resolution: u32,
    pub pass1_size: UVec2,
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RsmConfig {
    fn default() -> Self {
        Self {
            resolution: 512,
            pass1_size: uvec2(400, 300),
            half_extent: 10.0,
            near: 0.1,
            far: 30.0,
        }
    }
}

/// Reflective shadow map for a directional light: the depth capture is
/// extended with a world-position+depth / normal / flux G-buffer, and the
/// lighting pass gathers one-bounce indirect light through a 256-sample
/// jittered kernel built once at construction (the pattern is static for
/// the whole session).
///
/// The default mode evaluates all 256 samples per full-resolution pixel;
/// [`Self::set_two_pass`] switches to a reduced-resolution indirect pass
/// whose output the full-resolution pass reuses as a cheap proxy.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct DirRsm {
    light: DirLight,
    light_space: Mat4,
    two_pass: bool,
    pass1_size: UVec2,

    #[derivative(Debug = "ignore")]
    samples: Vec<Vec2>,

    depth: Texture,
    position_depth: Texture,
    normal: Texture,
    flux: Texture,
    gbuffer_pass: ObjectPass,

    pass1_color: Texture,
    pass1_pos: Texture,
    pass1_norm: Texture,
    pass1_depth: Texture,
    pass1: ObjectPass,
    pass2: ObjectPass,

    lighting: ObjectPass,
    camera: UniformBuffer<gpu::Camera>,
}

impl DirRsm {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        light: DirLight,
        anchor: Vec3,
        config: RsmConfig,
    ) -> Self {
        info!("Creating directional RSM: {config:?}");

        let light_space = directional_light_space(
            anchor,
            light.direction,
            config.half_extent,
            config.near,
            config.far,
        );

        let samples = jittered_kernel(&mut rand::thread_rng());

        let size = uvec2(config.resolution, config.resolution);

        let depth = Texture::builder("rsm_depth")
            .with_size(size)
            .with_format(wgpu::TextureFormat::Depth32Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let position_depth = Texture::builder("rsm_position_depth")
            .with_size(size)
            .with_format(wgpu::TextureFormat::Rgba16Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let normal = Texture::builder("rsm_normal")
            .with_size(size)
            .with_format(wgpu::TextureFormat::Rgba16Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let flux = Texture::builder("rsm_flux")
            .with_size(size)
            .with_format(wgpu::TextureFormat::Rgba8Unorm)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let light_buf =
            UniformBuffer::new(device, "rsm_light", &light.serialize());

        let params = UniformBuffer::new(
            device,
            "rsm_params",
            &gpu::RsmParams {
                light_space,
                data: vec4(R_MAX, 1.0, 0.0, 0.0),
            },
        );

        let gbuffer_bg0 = BindGroup::builder("rsm_gbuffer_bg0")
            .add(&params.bind_readable())
            .add(&light_buf.bind_readable())
            .build(device);

        let gbuffer_pass = ObjectPass::builder("rsm_gbuffer")
            .with_color_formats(&[
                wgpu::TextureFormat::Rgba16Float,
                wgpu::TextureFormat::Rgba16Float,
                wgpu::TextureFormat::Rgba8Unorm,
            ])
            .build(
                device,
                &engine.shaders().rsm_gbuffer,
                gbuffer_bg0,
                engine.materials.layout(),
            );

        let pass1_target = |name: &str| {
            Texture::builder(name)
                .with_size(config.pass1_size)
                .with_format(wgpu::TextureFormat::Rgba16Float)
                .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
                .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
                .build(device)
        };

        let pass1_color = pass1_target("rsm_pass1_color");
        let pass1_pos = pass1_target("rsm_pass1_pos");
        let pass1_norm = pass1_target("rsm_pass1_norm");

        let pass1_depth = Texture::builder("rsm_pass1_depth")
            .with_size(config.pass1_size)
            .with_format(wgpu::TextureFormat::Depth32Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .build(device);

        let camera =
            UniformBuffer::new(device, "rsm_camera", &gpu::Camera::default());

        let kernel = UniformBuffer::new(
            device,
            "rsm_kernel",
            &SampleKernel::pack(&samples),
        );

        let lighting_bg0 = |label: &str| {
            BindGroup::builder(label)
                .add(&camera.bind_readable())
                .add(&light_buf.bind_readable())
                .add(&params.bind_readable())
                .add(&kernel.bind_readable())
                .add(&position_depth.bind_sampled())
                .add(&normal.bind_sampled())
                .add(&flux.bind_sampled())
                .build(device)
        };

        let lighting = ObjectPass::builder("rsm_lighting").build(
            device,
            &engine.shaders().rsm_lighting,
            lighting_bg0("rsm_lighting_bg0"),
            engine.materials.layout(),
        );

        let pass1 = ObjectPass::builder("rsm_pass1")
            .with_color_formats(&[
                wgpu::TextureFormat::Rgba16Float,
                wgpu::TextureFormat::Rgba16Float,
                wgpu::TextureFormat::Rgba16Float,
            ])
            .with_fragment_entry("fs_pass1")
            .build(
                device,
                &engine.shaders().rsm_lighting,
                lighting_bg0("rsm_pass1_bg0"),
                engine.materials.layout(),
            );

        let pass2_bg0 = BindGroup::builder("rsm_pass2_bg0")
            .add(&camera.bind_readable())
            .add(&light_buf.bind_readable())
            .add(&params.bind_readable())
            .add(&kernel.bind_readable())
            .add(&position_depth.bind_sampled())
            .add(&normal.bind_sampled())
            .add(&flux.bind_sampled())
            .add(&pass1_color.bind_sampled())
            .add(&pass1_pos.bind_sampled())
            .add(&pass1_norm.bind_sampled())
            .build(device);

        let pass2 = ObjectPass::builder("rsm_pass2").build(
            device,
            &engine.shaders().rsm_lighting_pass2,
            pass2_bg0,
            engine.materials.layout(),
        );

        Self {
            light,
            light_space,
            two_pass: false,
            pass1_size: config.pass1_size,
            samples,
            depth,
            position_depth,
            normal,
            flux,
            gbuffer_pass,
            pass1_color,
            pass1_pos,
            pass1_norm,
            pass1_depth,
            pass1,
            pass2,
            lighting,
            camera,
        }
    }

    /// Switches indirect lighting to the reduced-resolution two-pass mode.
    pub fn set_two_pass(&mut self) {
        self.two_pass = true;
    }

    pub fn light(&self) -> &DirLight {
        &self.light
    }

    pub fn light_space_matrix(&self) -> Mat4 {
        self.light_space
    }

    /// The static jittered kernel, in stratified-cell order.
    pub fn samples(&self) -> &[Vec2] {
        &self.samples
    }

    pub fn pass1_size(&self) -> UVec2 {
        self.pass1_size
    }

    pub fn position_depth(&self) -> &Texture {
        &self.position_depth
    }

    pub fn normal(&self) -> &Texture {
        &self.normal
    }

    pub fn flux(&self) -> &Texture {
        &self.flux
    }

    /// Renders the RSM G-buffer (position+depth, normal, flux) from the
    /// light's point of view.
    pub fn draw_rsm(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        objects: &[Instance],
        meshes: &Meshes,
        materials: &Materials,
    ) {
        self.gbuffer_pass.run(
            encoder,
            ObjectPassTarget {
                colors: &[
                    self.position_depth.view(),
                    self.normal.view(),
                    self.flux.view(),
                ],
                depth: Some(self.depth.view()),
                clear: Some(wgpu::Color::TRANSPARENT),
            },
            objects,
            meshes,
            materials,
        );
    }

    /// Shades the draw list with direct light plus one-bounce indirect
    /// light gathered from the RSM.
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

        if !self.two_pass {
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

            return;
        }

        self.pass1.run(
            encoder,
            ObjectPassTarget {
                colors: &[
                    self.pass1_color.view(),
                    self.pass1_pos.view(),
                    self.pass1_norm.view(),
                ],
                depth: Some(self.pass1_depth.view()),
                clear: Some(wgpu::Color::TRANSPARENT),
            },
            objects,
            meshes,
            materials,
        );

        self.pass2.run(
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
