use glam::{uvec2, vec4, Vec3};
use log::info;

use crate::{
    directional_light_space, gpu, BindGroup, DepthPass, Engine, FrameContext,
    Instance, Materials, Meshes, ObjectPass, ObjectPassTarget, PointLight,
    SoftShadowConfig, Texture, UniformBuffer,
};

/// Percentage-closer soft shadows. The capture is the same hard depth map;
/// all penumbra estimation happens in the lighting shader from the raw
/// depth plus the light width, depth range and orthographic extent
/// supplied here.
#[derive(Debug)]
pub struct PcssShadow {
    depth_map: Texture,
    depth_pass: DepthPass,
    lighting: ObjectPass,
    camera: UniformBuffer<gpu::Camera>,
}

impl PcssShadow {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        light: PointLight,
        direction: Vec3,
        config: SoftShadowConfig,
    ) -> Self {
        info!("Creating PCSS shadow: {config:?}");

        let light_space = directional_light_space(
            light.position,
            direction,
            config.ortho_width / 2.0,
            config.near,
            config.far,
        );

        let depth_map = Texture::builder("pcss_depth")
            .with_size(uvec2(config.resolution, config.resolution))
            .with_format(wgpu::TextureFormat::Depth32Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let depth_pass = DepthPass::new(engine, device, "pcss", light_space);

        let camera =
            UniformBuffer::new(device, "pcss_camera", &gpu::Camera::default());

        let light_buf =
            UniformBuffer::new(device, "pcss_light", &light.serialize());

        let params = UniformBuffer::new(
            device,
            "pcss_params",
            &gpu::PcssParams {
                light_space,
                data: vec4(
                    config.light_width,
                    config.near,
                    config.far,
                    config.ortho_width,
                ),
            },
        );

        let bg0 = BindGroup::builder("pcss_bg0")
            .add(&camera.bind_readable())
            .add(&light_buf.bind_readable())
            .add(&params.bind_readable())
            .add(&depth_map.bind_depth())
            .build(device);

        let lighting = ObjectPass::builder("pcss_lighting").build(
            device,
            &engine.shaders().lighting_pcss,
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
