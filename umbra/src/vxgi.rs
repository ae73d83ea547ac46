use std::mem;
use std::ops::Range;

use glam::{uvec3, vec3, Mat4, UVec3, Vec3};
use log::info;
use umbra_gpu::VoxelGrid;

use crate::{
    gpu, BindGroup, DirRsm, Engine, FrameContext, Instance, Materials, Meshes,
    ObjectPass, ObjectPassTarget, Texture, UniformBuffer, Vertex,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VxgiConfig {
    pub step: u32,
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for VxgiConfig {
    fn default() -> Self {
        Self {
            step: 128,
            min: Vec3::splat(-12.0),
            max: Vec3::splat(12.0),
        }
    }
}

/// One surviving voxel from a diagnostic readback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugVoxel {
    pub position: Vec3,
    pub color: Vec3,
}

/// Voxel cone-traced GI over a directional RSM.
///
/// Every frame the whole scene is re-rasterized through three axis-aligned
/// orthographic projections into an RGBA8 3D radiance texture, lit by the
/// RSM, and the full mip chain is rebuilt; the lighting pass then cone
/// traces the mipped volume for one-bounce indirect light. There is no
/// incremental update or dirty tracking; the full rebuild is the dominant
/// per-frame cost of the technique.
#[derive(Debug)]
pub struct DirVxgi {
    grid: VoxelGrid,
    voxels: Texture,
    dummy_target: Texture,
    voxelize_pass: ObjectPass,
    mip_pass: crate::FilterPass,
    mip_bg_first: BindGroup,
    mip_bgs: Vec<wgpu::BindGroup>,
    cone_pass: ObjectPass,
    camera: UniformBuffer<gpu::Camera>,
    debug_pipeline: wgpu::RenderPipeline,
    debug_bg: BindGroup,
}

impl DirVxgi {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        rsm: &DirRsm,
        config: VxgiConfig,
    ) -> Self {
        info!("Creating VXGI: {config:?}");

        let grid = VoxelGrid::new(config.step, config.min, config.max);

        let voxels = Texture::builder("vxgi_voxels")
            .with_size_3d(UVec3::splat(grid.step))
            .with_format(wgpu::TextureFormat::Rgba8Unorm)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .with_usage(wgpu::TextureUsages::STORAGE_BINDING)
            .with_usage(wgpu::TextureUsages::COPY_SRC)
            .with_mips(grid.mip_levels())
            .with_linear_filtering()
            .build(device);

        // Voxelization rasterizes at grid resolution with no depth test;
        // the render pass still needs an attachment to size itself.
        let dummy_target = Texture::builder("vxgi_dummy")
            .with_size(glam::uvec2(grid.step, grid.step))
            .with_format(wgpu::TextureFormat::Rgba8Unorm)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .build(device);

        let range = config.max - config.min;
        let center = (config.max + config.min) / 2.0;

        let proj = Mat4::orthographic_rh(
            -range.x / 2.0,
            range.x / 2.0,
            -range.y / 2.0,
            range.y / 2.0,
            0.2,
            0.2 + range.z,
        );

        let proj_x = proj
            * Mat4::look_at_rh(
                vec3(config.max.x + 0.2, center.y, center.z),
                center,
                Vec3::Y,
            );

        let proj_y = proj
            * Mat4::look_at_rh(
                vec3(center.x, config.max.y + 0.2, center.z),
                center,
                Vec3::NEG_Z,
            );

        let proj_z = proj
            * Mat4::look_at_rh(
                vec3(center.x, center.y, config.max.z + 0.2),
                center,
                Vec3::Y,
            );

        let voxelize_params = UniformBuffer::new(
            device,
            "vxgi_voxelize_params",
            &gpu::VoxelizeParams {
                proj_x,
                proj_y,
                proj_z,
                light_space: rsm.light_space_matrix(),
                bounds_min: config.min.extend(0.0),
                bounds_max: config.max.extend(grid.step as f32),
            },
        );

        let light_buf = UniformBuffer::new(
            device,
            "vxgi_light",
            &rsm.light().serialize(),
        );

        let voxelize_bg0 = BindGroup::builder("vxgi_voxelize_bg0")
            .add(&voxelize_params.bind_readable())
            .add(&light_buf.bind_readable())
            .add(&rsm.position_depth().bind_sampled())
            .add(&voxels.bind_storage(0))
            .build(device);

        let voxelize_pass = ObjectPass::builder("vxgi_voxelize")
            .with_color_formats(&[wgpu::TextureFormat::Rgba8Unorm])
            .without_depth()
            .without_culling()
            .build(
                device,
                &engine.shaders().voxelize,
                voxelize_bg0,
                engine.materials.layout(),
            );

        // Mip chain: level n-1 read, level n written, one dispatch per
        // level, rebuilt after every voxelization.
        let mip_bg_first = BindGroup::builder("vxgi_mip_bg1")
            .add(&voxels.bind_readable_mip(0))
            .add(&voxels.bind_storage(1))
            .build(device);

        let mip_bgs = (2..grid.mip_levels())
            .map(|mip| {
                mip_bg_first.rebind(
                    device,
                    format!("vxgi_mip_bg{mip}"),
                    &[
                        &voxels.bind_readable_mip(mip - 1),
                        &voxels.bind_storage(mip),
                    ],
                )
            })
            .collect();

        let mip_pass = crate::FilterPass::new(
            device,
            "vxgi_mip",
            &engine.shaders().voxel_mipmap,
            "cs_main",
            &[mip_bg_first.layout()],
        );

        let camera =
            UniformBuffer::new(device, "vxgi_camera", &gpu::Camera::default());

        let cone_params = UniformBuffer::new(
            device,
            "vxgi_cone_params",
            &gpu::ConeTraceParams {
                light_space: rsm.light_space_matrix(),
                bounds_min: config.min.extend(0.0),
                bounds_max: config.max.extend(grid.step as f32),
            },
        );

        let cone_bg0 = BindGroup::builder("vxgi_cone_bg0")
            .add(&camera.bind_readable())
            .add(&light_buf.bind_readable())
            .add(&cone_params.bind_readable())
            .add(&voxels.bind_sampled())
            .add(&rsm.position_depth().bind_sampled())
            .build(device);

        let cone_pass = ObjectPass::builder("vxgi_cone").build(
            device,
            &engine.shaders().cone_trace,
            cone_bg0,
            engine.materials.layout(),
        );

        let debug_bg = BindGroup::builder("vxgi_debug_bg")
            .add(&camera.bind_readable())
            .build(device);

        let debug_pipeline = Self::build_debug_pipeline(engine, device, &debug_bg);

        Self {
            grid,
            voxels,
            dummy_target,
            voxelize_pass,
            mip_pass,
            mip_bg_first,
            mip_bgs,
            cone_pass,
            camera,
            debug_pipeline,
            debug_bg,
        }
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn voxels(&self) -> &Texture {
        &self.voxels
    }

    /// Rebuilds the radiance volume: RSM G-buffer first (the voxel shader
    /// lights every fragment through it), then the triple-projection
    /// rasterization, then the full mip chain.
    pub fn voxelize(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        rsm: &DirRsm,
        objects: &[Instance],
        meshes: &Meshes,
        materials: &Materials,
    ) {
        rsm.draw_rsm(encoder, objects, meshes, materials);

        self.voxelize_pass.run(
            encoder,
            ObjectPassTarget {
                colors: &[self.dummy_target.view()],
                depth: None,
                clear: Some(wgpu::Color::TRANSPARENT),
            },
            objects,
            meshes,
            materials,
        );

        for (i, bind_group) in std::iter::once(self.mip_bg_first.as_ref())
            .chain(self.mip_bgs.iter())
            .enumerate()
        {
            let level = i as u32 + 1;
            let extent = (self.grid.mip_step(level)).max(1);
            let groups = UVec3::splat((extent + 3) / 4);

            self.mip_pass.run(encoder, &[bind_group], groups, ());
        }
    }

    /// Cone-traced lighting over the draw list; per-object roughness and
    /// shininess modulate the cone apertures.
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

        self.cone_pass.run(
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

    /// Reads back one mip of the voxel volume and returns the voxels with
    /// non-zero coverage. Synchronous GPU→host transfer; diagnostic use
    /// only, never part of the per-frame pass chain.
    pub fn read_voxels(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mip: u32,
    ) -> Result<Vec<DebugVoxel>, wgpu::BufferAsyncError> {
        let step = self.grid.mip_step(mip);

        let unpadded_row = step as usize * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
        let padded_row = (unpadded_row + align - 1) / align * align;

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("umbra_vxgi_readback"),
            size: (padded_row * (step * step) as usize) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("umbra_vxgi_readback"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: self.voxels.tex(),
                mip_level: mip,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row as u32),
                    rows_per_image: Some(step),
                },
            },
            wgpu::Extent3d {
                width: step,
                height: step,
                depth_or_array_layers: step,
            },
        );

        queue.submit([encoder.finish()]);

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();

        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        device.poll(wgpu::Maintain::Wait);

        rx.recv().expect("map_async callback dropped")?;

        let data = slice.get_mapped_range();
        let mut voxels = Vec::new();

        for z in 0..step {
            for y in 0..step {
                let row = &data[((z * step + y) as usize * padded_row)..];

                for x in 0..step {
                    let texel = &row[x as usize * 4..x as usize * 4 + 4];

                    if texel[3] == 0 {
                        continue;
                    }

                    let n = VoxelGrid::encode(uvec3(x, y, z), step);

                    voxels.push(DebugVoxel {
                        position: self.grid.voxel_position(n, mip),
                        color: vec3(
                            texel[0] as f32 / 255.0,
                            texel[1] as f32 / 255.0,
                            texel[2] as f32 / 255.0,
                        ),
                    });
                }
            }
        }

        drop(data);
        staging.unmap();

        Ok(voxels)
    }

    /// Diagnostic visualization: reads the chosen mip back and draws one
    /// scaled cube per surviving voxel into the frame target (clearing it
    /// first). Not interactive-rate.
    pub fn draw_voxels(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &FrameContext,
        meshes: &Meshes,
        cube: crate::MeshHandle,
        mip: u32,
    ) -> Result<usize, wgpu::BufferAsyncError> {
        let voxels = self.read_voxels(device, queue, mip)?;

        self.camera.write(queue, &frame.camera.serialize());

        let Some(mesh) = meshes.get(cube) else { return Ok(0) };

        let scale = 0.5 * self.grid.voxel_extent(mip);

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("umbra_vxgi_debug"),
            });

        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("umbra_vxgi_debug_pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: frame.target.color().view(),
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color {
                                    r: 0.1,
                                    g: 0.1,
                                    b: 0.1,
                                    a: 1.0,
                                }),
                                store: true,
                            },
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: frame.target.depth().view(),
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: true,
                            }),
                            stencil_ops: None,
                        },
                    ),
                });

            pass.set_pipeline(&self.debug_pipeline);
            pass.set_bind_group(0, self.debug_bg.as_ref(), &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer().slice(..));
            pass.set_index_buffer(
                mesh.index_buffer().slice(..),
                wgpu::IndexFormat::Uint32,
            );

            for voxel in &voxels {
                let model = Mat4::from_translation(
                    voxel.position - Vec3::splat(0.5 * scale),
                ) * Mat4::from_scale(Vec3::splat(scale));

                let params = gpu::DebugVoxelParams {
                    model,
                    color: voxel.color.extend(1.0),
                };

                pass.set_push_constants(
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                    0,
                    bytemuck::bytes_of(&params),
                );

                pass.draw_indexed(0..mesh.index_count(), 0, 0..1);
            }
        }

        queue.submit([encoder.finish()]);

        Ok(voxels.len())
    }

    fn build_debug_pipeline(
        engine: &Engine,
        device: &wgpu::Device,
        bg: &BindGroup,
    ) -> wgpu::RenderPipeline {
        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("umbra_vxgi_debug_pipeline_layout"),
                bind_group_layouts: &[bg.layout()],
                push_constant_ranges: &[wgpu::PushConstantRange {
                    stages: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    range: Range {
                        start: 0,
                        end: mem::size_of::<gpu::DebugVoxelParams>() as u32,
                    },
                }],
            });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("umbra_vxgi_debug_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &engine.shaders().voxel_debug,
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
                module: &engine.shaders().voxel_debug,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba16Float,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        })
    }
}
