use glam::uvec2;
use log::debug;
use umbra_gpu::sat_passes_per_axis;

use crate::{
    gpu, BindGroup, DoubleBuffered, Engine, FilterPass, Texture, tiles_8x8,
};

/// Builds a summed-area table over a two-channel moments texture with
/// radix-`r` prefix-sum passes: `⌈log_r S⌉` horizontal passes, then the
/// same number of vertical passes, ping-ponging between two RG32Float
/// buffers. The valid table after a run is whichever buffer the fixed
/// schedule wrote last, so the lighting bind group can reference it at
/// construction time.
#[derive(Debug)]
pub struct SatBuilder {
    resolution: u32,
    radix: u32,
    passes_per_axis: u32,
    maps: DoubleBuffered<Texture>,
    pass: FilterPass<gpu::SatPassParams>,
    bg_init: BindGroup,
    bg_ab: wgpu::BindGroup,
    bg_ba: wgpu::BindGroup,
}

impl SatBuilder {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        label: &str,
        source: &Texture,
        resolution: u32,
        radix: u32,
    ) -> Self {
        assert!(resolution >= 2);

        let passes_per_axis = sat_passes_per_axis(resolution, radix);

        debug!(
            "Initializing SAT builder `{label}`: {resolution}^2, radix {radix}, \
             {passes_per_axis} passes per axis",
        );

        let map = |side: &str| {
            Texture::builder(format!("{label}_sat_{side}"))
                .with_size(uvec2(resolution, resolution))
                .with_format(wgpu::TextureFormat::Rg32Float)
                .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
                .with_usage(wgpu::TextureUsages::STORAGE_BINDING)
                .build(device)
        };

        let maps = DoubleBuffered::new(map("a"), map("b"));

        let bg_init = BindGroup::builder(format!("{label}_sat_init"))
            .add(&source.bind_readable())
            .add(&maps.get(false).bind_storage(0))
            .build(device);

        let bg_ab = bg_init.rebind(
            device,
            format!("{label}_sat_ab"),
            &[
                &maps.get(false).bind_readable(),
                &maps.get(true).bind_storage(0),
            ],
        );

        let bg_ba = bg_init.rebind(
            device,
            format!("{label}_sat_ba"),
            &[
                &maps.get(true).bind_readable(),
                &maps.get(false).bind_storage(0),
            ],
        );

        let pass = FilterPass::new(
            device,
            format!("{label}_sat"),
            &engine.shaders().sat,
            "cs_main",
            &[bg_init.layout()],
        );

        Self {
            resolution,
            radix,
            passes_per_axis,
            maps,
            pass,
            bg_init,
            bg_ab,
            bg_ba,
        }
    }

    /// Runs the full horizontal-then-vertical schedule.
    pub fn run(&self, encoder: &mut wgpu::CommandEncoder) {
        let groups = tiles_8x8(self.resolution, self.resolution);

        let mut pass_no = 0u32;

        for axis in 0..2u32 {
            for pass_index in 0..self.passes_per_axis {
                // Pass k writes side k % 2; the first pass still reads the
                // raw moments texture.
                let bind_group = if pass_no == 0 {
                    self.bg_init.as_ref()
                } else if pass_no % 2 == 1 {
                    &self.bg_ab
                } else {
                    &self.bg_ba
                };

                self.pass.run(
                    encoder,
                    &[bind_group],
                    groups,
                    gpu::SatPassParams {
                        radix: self.radix,
                        pass_index,
                        axis,
                        pad: 0,
                    },
                );

                pass_no += 1;
            }
        }
    }

    /// The buffer holding the finished table (the side the fixed schedule
    /// writes last).
    pub fn result(&self) -> &Texture {
        self.maps.written_last(2 * self.passes_per_axis)
    }

    pub fn passes_per_axis(&self) -> u32 {
        self.passes_per_axis
    }
}
