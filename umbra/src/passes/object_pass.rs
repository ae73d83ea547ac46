use std::mem;
use std::ops::Range;

use glam::vec4;
use log::debug;

use crate::{gpu, BindGroup, Instance, Materials, Meshes, Vertex};

/// A render pass over the draw list: technique resources at group 0,
/// the per-object material at group 1, model matrix and material scalars
/// through push constants. This is the lighting phase shared by every
/// technique, and doubles as the MRT G-buffer pass for the RSM.
#[derive(Debug)]
pub struct ObjectPass {
    label: String,
    pipeline: wgpu::RenderPipeline,
    bg0: BindGroup,
}

/// Where an [`ObjectPass`] renders to for one run.
#[derive(Clone, Copy, Debug)]
pub struct ObjectPassTarget<'a> {
    pub colors: &'a [&'a wgpu::TextureView],
    pub depth: Option<&'a wgpu::TextureView>,

    /// `Some` clears the attachments first; `None` accumulates over the
    /// frame's existing contents.
    pub clear: Option<wgpu::Color>,
}

impl ObjectPass {
    pub fn builder(label: impl ToString) -> ObjectPassBuilder {
        ObjectPassBuilder {
            label: label.to_string(),
            color_formats: vec![wgpu::TextureFormat::Rgba16Float],
            depth: true,
            cull_mode: Some(wgpu::Face::Back),
            fragment_entry: "fs_main".to_string(),
        }
    }

    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: ObjectPassTarget,
        objects: &[Instance],
        meshes: &Meshes,
        materials: &Materials,
    ) {
        let label = format!("umbra_{}_pass", self.label);

        let color_attachments: Vec<_> = target
            .colors
            .iter()
            .map(|&view| {
                Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: match target.clear {
                            Some(color) => wgpu::LoadOp::Clear(color),
                            None => wgpu::LoadOp::Load,
                        },
                        store: true,
                    },
                })
            })
            .collect();

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&label),
            color_attachments: &color_attachments,
            depth_stencil_attachment: target.depth.map(|view| {
                wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: if target.clear.is_some() {
                            wgpu::LoadOp::Clear(1.0)
                        } else {
                            wgpu::LoadOp::Load
                        },
                        store: true,
                    }),
                    stencil_ops: None,
                }
            }),
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.bg0.as_ref(), &[]);

        for object in objects {
            let Some(mesh) = meshes.get(object.mesh) else { continue };

            let material = materials.get_or_default(object.material);

            pass.set_bind_group(1, material.bind_group(), &[]);

            let params = gpu::DrawParams {
                model: object.model,
                material: vec4(
                    material.shininess(),
                    material.roughness(),
                    0.0,
                    0.0,
                ),
            };

            pass.set_push_constants(
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                0,
                bytemuck::bytes_of(&params),
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

pub struct ObjectPassBuilder {
    label: String,
    color_formats: Vec<wgpu::TextureFormat>,
    depth: bool,
    cull_mode: Option<wgpu::Face>,
    fragment_entry: String,
}

impl ObjectPassBuilder {
    pub fn with_fragment_entry(mut self, entry: impl ToString) -> Self {
        self.fragment_entry = entry.to_string();
        self
    }

    /// Replaces the default single-HDR-target layout (used by the RSM
    /// G-buffer pass and the reduced-resolution indirect pass).
    pub fn with_color_formats(
        mut self,
        formats: &[wgpu::TextureFormat],
    ) -> Self {
        self.color_formats = formats.to_vec();
        self
    }

    pub fn without_depth(mut self) -> Self {
        self.depth = false;
        self
    }

    pub fn without_culling(mut self) -> Self {
        self.cull_mode = None;
        self
    }

    pub fn build(
        self,
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        bg0: BindGroup,
        material_layout: &wgpu::BindGroupLayout,
    ) -> ObjectPass {
        debug!("Initializing object pass: {}", self.label);

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("umbra_{}_pipeline_layout", self.label)),
                bind_group_layouts: &[bg0.layout(), material_layout],
                push_constant_ranges: &[wgpu::PushConstantRange {
                    stages: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    range: Range {
                        start: 0,
                        end: mem::size_of::<gpu::DrawParams>() as u32,
                    },
                }],
            });

        let targets: Vec<_> = self
            .color_formats
            .iter()
            .map(|format| {
                Some(wgpu::ColorTargetState {
                    format: *format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect();

        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("umbra_{}_pipeline", self.label)),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: "vs_main",
                    buffers: &[Vertex::layout()],
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: self.cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: self.depth.then(|| wgpu::DepthStencilState {
                    format: wgpu::TextureFormat::Depth32Float,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: &self.fragment_entry,
                    targets: &targets,
                }),
                multiview: None,
            });

        ObjectPass {
            label: self.label,
            pipeline,
            bg0,
        }
    }
}
