use std::marker::PhantomData;
use std::mem;
use std::ops::Range;

use bytemuck::Pod;
use glam::UVec3;
use log::debug;

/// A fullscreen compute pass: one entry point, prebuilt bind groups chosen
/// per run (which is how the ping-pong filters alternate read/write pairs),
/// and a Pod push-constant block.
#[derive(Debug)]
pub struct FilterPass<P = ()> {
    label: String,
    pipeline: wgpu::ComputePipeline,
    _params: PhantomData<P>,
}

impl<P> FilterPass<P>
where
    P: Pod,
{
    pub fn new(
        device: &wgpu::Device,
        label: impl ToString,
        module: &wgpu::ShaderModule,
        entry_point: &str,
        layouts: &[&wgpu::BindGroupLayout],
    ) -> Self {
        let label = label.to_string();

        debug!("Initializing filter pass: {label}");

        let bind_group_layouts: Vec<_> = layouts.to_vec();

        let push_constant_ranges = if mem::size_of::<P>() > 0 {
            vec![wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::COMPUTE,
                range: Range {
                    start: 0,
                    end: mem::size_of::<P>() as u32,
                },
            }]
        } else {
            vec![]
        };

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("umbra_{label}_pipeline_layout")),
                bind_group_layouts: &bind_group_layouts,
                push_constant_ranges: &push_constant_ranges,
            });

        let pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(&format!("umbra_{label}_pipeline")),
                layout: Some(&pipeline_layout),
                module,
                entry_point,
            });

        Self {
            label,
            pipeline,
            _params: PhantomData,
        }
    }

    /// Dispatches `groups` workgroups with the given bind groups (which
    /// must match the layouts the pass was built with).
    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        bind_groups: &[&wgpu::BindGroup],
        groups: UVec3,
        params: P,
    ) {
        let label = format!("umbra_{}_pass", self.label);

        let mut pass =
            encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(&label),
            });

        pass.set_pipeline(&self.pipeline);

        if mem::size_of::<P>() > 0 {
            pass.set_push_constants(0, bytemuck::bytes_of(&params));
        }

        for (idx, &bind_group) in bind_groups.iter().enumerate() {
            pass.set_bind_group(idx as u32, bind_group, &[]);
        }

        pass.dispatch_workgroups(groups.x, groups.y, groups.z);
    }
}

/// Workgroup count for an 8×8 image tiling.
pub fn tiles_8x8(width: u32, height: u32) -> UVec3 {
    UVec3::new((width + 7) / 8, (height + 7) / 8, 1)
}
