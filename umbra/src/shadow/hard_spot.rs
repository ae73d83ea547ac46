use glam::{vec4, Vec3};
use log::info;

use crate::{
    gpu, BindGroup, CubeDepthPass, CubeShadowConfig, Engine, FrameContext,
    Instance, Materials, Meshes, ObjectPass, ObjectPassTarget, SpotLight,
    Texture, UniformBuffer,
};

/// Hard shadows from a spot light: the cubemap capture of the point
/// variant plus cone attenuation, and a light whose position/direction may
/// move between frames.
#[derive(Debug)]
pub struct HardSpotShadow {
    light: SpotLight,
    config: CubeShadowConfig,
    cube_map: Texture,
    depth_pass: CubeDepthPass,
    lighting: ObjectPass,
    camera: UniformBuffer<gpu::Camera>,
    light_buf: UniformBuffer<gpu::SpotLight>,
}

impl HardSpotShadow {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        light: SpotLight,
        config: CubeShadowConfig,
    ) -> Self {
        info!("Creating hard spot shadow: {config:?}");

        let cube_map = Texture::builder("hard_spot_depth")
            .with_cube_size(config.resolution)
            .with_format(wgpu::TextureFormat::Depth32Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let depth_pass = CubeDepthPass::new(
            engine,
            device,
            "hard_spot",
            light.position,
            config.near,
            config.far,
        );

        let camera = UniformBuffer::new(
            device,
            "hard_spot_camera",
            &gpu::Camera::default(),
        );

        let light_buf =
            UniformBuffer::new(device, "hard_spot_light", &light.serialize());

        let params = UniformBuffer::new(
            device,
            "hard_spot_params",
            &gpu::PointShadowParams {
                data: vec4(config.far, 0.0, 0.0, 0.0),
            },
        );

        let bg0 = BindGroup::builder("hard_spot_bg0")
            .add(&camera.bind_readable())
            .add(&light_buf.bind_readable())
            .add(&params.bind_readable())
            .add(&cube_map.bind_depth())
            .build(device);

        let lighting = ObjectPass::builder("hard_spot_lighting").build(
            device,
            &engine.shaders().lighting_hard_spot,
            bg0,
            engine.materials.layout(),
        );

        Self {
            light,
            config,
            cube_map,
            depth_pass,
            lighting,
            camera,
            light_buf,
        }
    }

    /// Moves the light; the face transforms and the light uniform follow.
    pub fn set_light(
        &mut self,
        queue: &wgpu::Queue,
        position: Vec3,
        direction: Vec3,
    ) {
        self.light.position = position;
        self.light.direction = direction;

        self.depth_pass.set_light(
            queue,
            position,
            self.config.near,
            self.config.far,
        );

        self.light_buf.write(queue, &self.light.serialize());
    }

    pub fn light(&self) -> &SpotLight {
        &self.light
    }

    pub fn draw_shadow_map(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        objects: &[Instance],
        meshes: &Meshes,
    ) {
        self.depth_pass
            .run(encoder, &self.cube_map, objects, meshes);
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
