use glam::uvec2;
use log::debug;
use umbra_gpu::BlurKernel;

use crate::{
    gpu, tiles_8x8, BindGroup, DoubleBuffered, Engine, FilterPass, Texture,
};

/// Two-pass separable Gaussian blur over a single-channel map: horizontal
/// from the source into one ping-pong side, vertical back into the other.
/// Tap weights are computed host-side once and uploaded as a uniform.
#[derive(Debug)]
pub struct GaussianBlur {
    resolution: u32,
    maps: DoubleBuffered<Texture>,
    pass: FilterPass<gpu::BlurPassParams>,
    bg_first: BindGroup,
    bg_second: wgpu::BindGroup,
}

impl GaussianBlur {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        label: &str,
        source: &Texture,
        resolution: u32,
        kernel_size: u32,
    ) -> Self {
        debug!("Initializing Gaussian blur `{label}`: kernel {kernel_size}");

        let map = |side: &str| {
            Texture::builder(format!("{label}_gauss_{side}"))
                .with_size(uvec2(resolution, resolution))
                .with_format(wgpu::TextureFormat::R32Float)
                .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
                .with_usage(wgpu::TextureUsages::STORAGE_BINDING)
                .build(device)
        };

        let maps = DoubleBuffered::new(map("a"), map("b"));

        // The bind groups keep the kernel buffer alive.
        let kernel = crate::UniformBuffer::new(
            device,
            format!("{label}_blur_kernel"),
            &BlurKernel::gaussian(kernel_size),
        );

        let bg_first = BindGroup::builder(format!("{label}_gauss_first"))
            .add(&kernel.bind_readable())
            .add(&source.bind_readable())
            .add(&maps.get(true).bind_storage(0))
            .build(device);

        let bg_second = bg_first.rebind(
            device,
            format!("{label}_gauss_second"),
            &[
                &kernel.bind_readable(),
                &maps.get(true).bind_readable(),
                &maps.get(false).bind_storage(0),
            ],
        );

        let pass = FilterPass::new(
            device,
            format!("{label}_gauss"),
            &engine.shaders().gaussian_blur,
            "cs_main",
            &[bg_first.layout()],
        );

        Self {
            resolution,
            maps,
            pass,
            bg_first,
            bg_second,
        }
    }

    /// Horizontal then vertical; the final result lands in the first side.
    pub fn run(&self, encoder: &mut wgpu::CommandEncoder) {
        let groups = tiles_8x8(self.resolution, self.resolution);

        self.pass.run(
            encoder,
            &[self.bg_first.as_ref()],
            groups,
            gpu::BlurPassParams {
                horizontal: 1,
                first: 1,
                last: 0,
                pad: 0,
            },
        );

        self.pass.run(
            encoder,
            &[&self.bg_second],
            groups,
            gpu::BlurPassParams {
                horizontal: 0,
                first: 0,
                last: 1,
                pad: 0,
            },
        );
    }

    pub fn result(&self) -> &Texture {
        self.maps.get(false)
    }
}
