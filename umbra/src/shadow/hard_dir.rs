use glam::{uvec2, Vec3};
use log::info;

use crate::{
    directional_light_space, gpu, BindGroup, Camera, DepthPass, DirLight,
    DirShadowConfig, Engine, FrameContext, Instance, Materials, Meshes,
    ObjectPass, ObjectPassTarget, Texture, UniformBuffer,
};

/// Hard shadows from a directional light: a single depth capture and a
/// binary depth comparison in the lighting pass.
#[derive(Debug)]
pub struct HardDirShadow {
    depth_map: Texture,
    depth_pass: DepthPass,
    lighting: ObjectPass,
    camera: UniformBuffer<gpu::Camera>,
}

impl HardDirShadow {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        light: DirLight,
        anchor: Vec3,
        config: DirShadowConfig,
    ) -> Self {
        info!("Creating hard directional shadow: {config:?}");

        let light_space = directional_light_space(
            anchor,
            light.direction,
            config.half_extent,
            config.near,
            config.far,
        );

        let depth_map = Texture::builder("hard_dir_depth")
            .with_size(uvec2(config.resolution, config.resolution))
            .with_format(wgpu::TextureFormat::Depth32Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let depth_pass =
            DepthPass::new(engine, device, "hard_dir", light_space);

        let camera = UniformBuffer::new(
            device,
            "hard_dir_camera",
            &gpu::Camera::default(),
        );

        let light_buf =
            UniformBuffer::new(device, "hard_dir_light", &light.serialize());

        let params = UniformBuffer::new(
            device,
            "hard_dir_params",
            &gpu::ShadowParams { light_space },
        );

        let bg0 = BindGroup::builder("hard_dir_bg0")
            .add(&camera.bind_readable())
            .add(&light_buf.bind_readable())
            .add(&params.bind_readable())
            .add(&depth_map.bind_depth())
            .build(device);

        let lighting = ObjectPass::builder("hard_dir_lighting").build(
            device,
            &engine.shaders().lighting_hard_dir,
            bg0,
            engine.materials.layout(),
        );

        Self {
            depth_map,
            depth_pass,
            lighting,
            camera,
        }
    }

    pub fn draw_shadow_map(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        objects: &[Instance],
        meshes: &Meshes,
    ) {
        self.depth_pass
            .run(encoder, self.depth_map.view(), objects, meshes);
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
        self.write_camera(queue, &frame.camera);

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

    fn write_camera(&self, queue: &wgpu::Queue, camera: &Camera) {
        self.camera.write(queue, &camera.serialize());
    }
}
