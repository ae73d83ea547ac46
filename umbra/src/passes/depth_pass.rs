use std::mem;
use std::ops::Range;

use glam::Mat4;
use log::debug;

use crate::{gpu, BindGroup, Engine, Instance, Meshes, UniformBuffer, Vertex};

/// Depth-only capture of the draw list from the light's point of view; the
/// first phase of every 2D-map shadow technique. The light-space transform
/// lives in a uniform written at construction (or rewritten if the light
/// moves); the per-object model matrix goes through push constants.
#[derive(Debug)]
pub struct DepthPass {
    pipeline: wgpu::RenderPipeline,
    bg0: BindGroup,
    params: UniformBuffer<gpu::ShadowParams>,
}

impl DepthPass {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        label: &str,
        light_space: Mat4,
    ) -> Self {
        debug!("Initializing depth pass: {label}");

        let params = UniformBuffer::new(
            device,
            format!("{label}_params"),
            &gpu::ShadowParams { light_space },
        );

        let bg0 = BindGroup::builder(format!("{label}_bg0"))
            .add(&params.bind_readable())
            .build(device);

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("umbra_{label}_pipeline_layout")),
                bind_group_layouts: &[bg0.layout()],
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
                    module: &engine.shaders().shadow_depth,
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
                fragment: None,
                multiview: None,
            });

        Self {
            pipeline,
            bg0,
            params,
        }
    }

    pub fn set_light_space(&self, queue: &wgpu::Queue, light_space: Mat4) {
        self.params
            .write(queue, &gpu::ShadowParams { light_space });
    }

    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        depth_view: &wgpu::TextureView,
        objects: &[Instance],
        meshes: &Meshes,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("umbra_depth_pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                },
            ),
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.bg0.as_ref(), &[]);

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
