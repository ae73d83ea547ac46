use glam::uvec2;

use crate::{Camera, Texture};

/// The HDR scene target every lighting pass renders into: an Rgba16Float
/// color buffer plus a shared depth buffer, tone-mapped at presentation.
#[derive(Debug)]
pub struct HdrTarget {
    color: Texture,
    depth: Texture,
    size: glam::UVec2,
}

impl HdrTarget {
    pub fn new(device: &wgpu::Device, size: glam::UVec2) -> Self {
        let color = Texture::builder("hdr_color")
            .with_size(size)
            .with_format(wgpu::TextureFormat::Rgba16Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(device);

        let depth = Texture::builder("hdr_depth")
            .with_size(size)
            .with_format(wgpu::TextureFormat::Depth32Float)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .build(device);

        Self { color, depth, size }
    }

    pub fn color(&self) -> &Texture {
        &self.color
    }

    pub fn depth(&self) -> &Texture {
        &self.depth
    }

    pub fn size(&self) -> glam::UVec2 {
        self.size
    }

    /// Clears color and depth at the top of a frame; lighting passes then
    /// accumulate with load.
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder, color: wgpu::Color) {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("umbra_hdr_clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color.view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: true,
                },
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                },
            ),
        });
    }
}

/// Everything a technique needs for one frame's lighting phase. Built by
/// the caller per frame and passed down; nothing in here outlives the
/// frame.
#[derive(Debug)]
pub struct FrameContext<'a> {
    pub camera: Camera,
    pub target: &'a HdrTarget,
}

impl<'a> FrameContext<'a> {
    pub fn new(camera: Camera, target: &'a HdrTarget) -> Self {
        Self { camera, target }
    }

    pub fn viewport(&self) -> glam::UVec2 {
        uvec2(self.target.size().x, self.target.size().y)
    }
}
