use glam::vec4;
use log::info;

use crate::{
    gpu, BindGroup, CubeDepthPass, CubeShadowConfig, Engine, FrameContext,
    Instance, Materials, Meshes, ObjectPass, ObjectPassTarget, PointLight,
    Texture, UniformBuffer,
};

/// Hard shadows from a point light: six-face distance-encoded cubemap
/// capture, attenuated omnidirectional lighting.
#[derive(Debug)]
pub struct HardPointShadow {
    cube_map: Texture,
    depth_pass: CubeDepthPass,
    lighting: ObjectPass,
    camera: UniformBuffer<gpu::Camera>,
}

impl HardPointShadow {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        light: PointLight,
        config: CubeShadowConfig,
    ) -> Self {
        info!("Creating hard point shadow: {config:?}");

        let cube_map = Texture::builder("hard_point_depth")
            .with_cube_size(config.resolution)
            .with_format(wgpu::TextureFormat::Depth32Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let depth_pass = CubeDepthPass::new(
            engine,
            device,
            "hard_point",
            light.position,
            config.near,
            config.far,
        );

        let camera = UniformBuffer::new(
            device,
            "hard_point_camera",
            &gpu::Camera::default(),
        );

        let light_buf =
            UniformBuffer::new(device, "hard_point_light", &light.serialize());

        let params = UniformBuffer::new(
            device,
            "hard_point_params",
            &gpu::PointShadowParams {
                data: vec4(config.far, 0.0, 0.0, 0.0),
            },
        );

        let bg0 = BindGroup::builder("hard_point_bg0")
            .add(&camera.bind_readable())
            .add(&light_buf.bind_readable())
            .add(&params.bind_readable())
            .add(&cube_map.bind_depth())
            .build(device);

        let lighting = ObjectPass::builder("hard_point_lighting").build(
            device,
            &engine.shaders().lighting_hard_point,
            bg0,
            engine.materials.layout(),
        );

        Self {
            cube_map,
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
