use std::mem;
use std::ops::Range;

use glam::vec4;
use log::debug;

use crate::{gpu, BindGroup, Engine, HdrTarget};

/// Exposure tone mapping from the HDR scene target to the presentation
/// surface: a fullscreen triangle, `1 − exp(−hdr · exposure)`.
#[derive(Debug)]
pub struct Tonemapper {
    pipeline: wgpu::RenderPipeline,
    bg0: BindGroup,
}

impl Tonemapper {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        hdr: &HdrTarget,
        output_format: wgpu::TextureFormat,
    ) -> Self {
        debug!("Initializing tonemapper: {output_format:?}");

        let bg0 = BindGroup::builder("tonemap_bg0")
            .add(&hdr.color().bind_sampled())
            .build(device);

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("umbra_tonemap_pipeline_layout"),
                bind_group_layouts: &[bg0.layout()],
                push_constant_ranges: &[wgpu::PushConstantRange {
                    stages: wgpu::ShaderStages::FRAGMENT,
                    range: Range {
                        start: 0,
                        end: mem::size_of::<gpu::TonemapParams>() as u32,
                    },
                }],
            });

        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("umbra_tonemap_pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &engine.shaders().tonemap,
                    entry_point: "vs_main",
                    buffers: &[],
                },
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &engine.shaders().tonemap,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: output_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
            });

        Self { pipeline, bg0 }
    }

    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        exposure: f32,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("umbra_tonemap_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: true,
                },
            })],
            depth_stencil_attachment: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.bg0.as_ref(), &[]);

        pass.set_push_constants(
            wgpu::ShaderStages::FRAGMENT,
            0,
            bytemuck::bytes_of(&gpu::TonemapParams {
                data: vec4(exposure, 0.0, 0.0, 0.0),
            }),
        );

        pass.draw(0..3, 0..1);
    }
}
