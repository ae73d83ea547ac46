use std::mem;
use std::ops::Range;

use glam::{Mat4, Vec3};
use log::debug;

use crate::{
    cube_face_transforms, gpu, BindGroup, Engine, Instance, Meshes, Texture,
    UniformBuffer, Vertex,
};

/// Distance-encoded depth capture into a cubemap, one render pass per face
/// in the fixed {+X, −X, +Y, −Y, +Z, −Z} order. The fragment stage stores
/// `length(fragment − light) / far`, so the lighting passes compare plain
/// normalized distances.
#[derive(Debug)]
pub struct CubeDepthPass {
    pipeline: wgpu::RenderPipeline,
    faces: [CubeFace; 6],
}

#[derive(Debug)]
struct CubeFace {
    params: UniformBuffer<gpu::CubeFaceParams>,
    bg: wgpu::BindGroup,
}

impl CubeDepthPass {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        label: &str,
        position: Vec3,
        near: f32,
        far: f32,
    ) -> Self {
        debug!("Initializing cube depth pass: {label}");

        let transforms = cube_face_transforms(position, near, far);

        let face_params: [_; 6] = std::array::from_fn(|i| {
            UniformBuffer::new(
                device,
                format!("{label}_face{i}_params"),
                &gpu::CubeFaceParams {
                    matrix: transforms[i],
                    light_pos: position.extend(far),
                },
            )
        });

        // One layout shared by all six face bind groups.
        let layout = BindGroup::builder(format!("{label}_face_bg"))
            .add(&face_params[0].bind_readable())
            .build(device);

        let mut face_params = face_params.into_iter();

        let faces = std::array::from_fn(|i| {
            let params = face_params.next().unwrap();

            let bg = layout.rebind(
                device,
                format!("{label}_face{i}_bg"),
                &[&params.bind_readable()],
            );

            CubeFace { params, bg }
        });

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("umbra_{label}_pipeline_layout")),
                bind_group_layouts: &[layout.layout()],
                push_constant_ranges: &[wgpu::PushConstantRange {
                    stages: wgpu::ShaderStages::VERTEX,
                    range: Range {
                        start: 0,
                        end: mem::size_of::<Mat4>() as u32,
                    },
                }],
            });

        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("umbra_{label}_pipeline")),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &engine.shaders().cube_depth,
                    entry_point: "vs_main",
                    buffers: &[Vertex::layout()],
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: wgpu::TextureFormat::Depth32Float,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &engine.shaders().cube_depth,
                    entry_point: "fs_main",
                    targets: &[],
                }),
                multiview: None,
            });

        Self { pipeline, faces }
    }

    /// Re-derives the six face transforms; used by spot lights whose
    /// position moves between frames.
    pub fn set_light(
        &self,
        queue: &wgpu::Queue,
        position: Vec3,
        near: f32,
        far: f32,
    ) {
        let transforms = cube_face_transforms(position, near, far);

        for (face, matrix) in self.faces.iter().zip(transforms) {
            face.params.write(
                queue,
                &gpu::CubeFaceParams {
                    matrix,
                    light_pos: position.extend(far),
                },
            );
        }
    }

    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        cube: &Texture,
        objects: &[Instance],
        meshes: &Meshes,
    ) {
        for (i, face) in self.faces.iter().enumerate() {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("umbra_cube_depth_pass"),
                    color_attachments: &[],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: cube.layer_view(i as u32),
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: true,
                            }),
                            stencil_ops: None,
                        },
                    ),
                });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &face.bg, &[]);

            for object in objects {
                let Some(mesh) = meshes.get(object.mesh) else { continue };

                pass.set_push_constants(
                    wgpu::ShaderStages::VERTEX,
                    0,
                    bytemuck::bytes_of(&object.model),
                );

                pass.set_vertex_buffer(0, mesh.vertex_buffer().slice(..));
                pass.set_index_buffer(
                    mesh.index_buffer().slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..mesh.index_count(), 0, 0..1);
            }
        }
    }
}
