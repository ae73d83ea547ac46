use glam::{vec2, vec4, Vec2};
use rand::Rng;

use crate::{BlurKernel, SampleKernel};

/// Cells per side of the stratified RSM kernel.
pub const KERNEL_CELLS: usize = 16;

/// Total RSM sample count.
pub const KERNEL_SAMPLES: usize = KERNEL_CELLS * KERNEL_CELLS;

/// Maximum half-size of the separable Gaussian blurs (bounded by the
/// packed uniform layout).
pub const MAX_BLUR_KERNEL: u32 = 31;

/// Builds the 16×16 stratified jittered sample kernel: one uniform jitter
/// per cell, drawn once. Callers keep the result for the whole session, so
/// the pattern is static across frames.
pub fn jittered_kernel(rng: &mut impl Rng) -> Vec<Vec2> {
    let mut samples = Vec::with_capacity(KERNEL_SAMPLES);

    for i in 0..KERNEL_CELLS {
        for j in 0..KERNEL_CELLS {
            let x1 = (i as f32 + rng.gen_range(0.0f32..1.0)) / KERNEL_CELLS as f32;
            let x2 = (j as f32 + rng.gen_range(0.0f32..1.0)) / KERNEL_CELLS as f32;

            samples.push(vec2(x1, x2));
        }
    }

    samples
}

impl SampleKernel {
    /// Packs 256 `vec2` samples two-per-`vec4` for the uniform array.
    pub fn pack(samples: &[Vec2]) -> Self {
        assert_eq!(samples.len(), KERNEL_SAMPLES);

        let mut packed = [vec4(0.0, 0.0, 0.0, 0.0); KERNEL_SAMPLES / 2];

        for (i, pair) in samples.chunks_exact(2).enumerate() {
            packed[i] = vec4(pair[0].x, pair[0].y, pair[1].x, pair[1].y);
        }

        Self { samples: packed }
    }
}

/// Normalized one-sided Gaussian tap weights for a blur of half-size
/// `kernel_size`; index 0 is the center tap. The full filter is symmetric,
/// so the normalization counts every non-center tap twice.
pub fn gaussian_weights(kernel_size: u32) -> Vec<f32> {
    let kernel_size = kernel_size.min(MAX_BLUR_KERNEL);
    let sigma = (kernel_size as f32 / 2.0).max(1.0);

    let mut weights: Vec<f32> = (0..=kernel_size)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();

    let total = weights[0] + 2.0 * weights[1..].iter().sum::<f32>();

    for w in &mut weights {
        *w /= total;
    }

    weights
}

impl BlurKernel {
    pub fn gaussian(kernel_size: u32) -> Self {
        let weights = gaussian_weights(kernel_size);

        let mut packed = [vec4(0.0, 0.0, 0.0, 0.0); 8];

        for (i, w) in weights.iter().enumerate() {
            packed[i / 4][i % 4] = *w;
        }

        Self {
            weights: packed,
            data: vec4(weights.len() as f32, 0.0, 0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn kernel_is_stratified() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = jittered_kernel(&mut rng);

        assert_eq!(samples.len(), KERNEL_SAMPLES);

        for (n, sample) in samples.iter().enumerate() {
            let i = n / KERNEL_CELLS;
            let j = n % KERNEL_CELLS;

            let cell = 1.0 / KERNEL_CELLS as f32;
            let x0 = i as f32 * cell;
            let y0 = j as f32 * cell;

            assert!(sample.x >= x0 && sample.x < x0 + cell);
            assert!(sample.y >= y0 && sample.y < y0 + cell);
        }
    }

    #[test]
    fn kernel_packs_in_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = jittered_kernel(&mut rng);
        let packed = SampleKernel::pack(&samples);

        assert_relative_eq!(packed.samples[0].x, samples[0].x);
        assert_relative_eq!(packed.samples[0].w, samples[1].y);
        assert_relative_eq!(packed.samples[127].z, samples[255].x);
    }

    #[test]
    fn gaussian_weights_normalize() {
        for kernel_size in [1, 2, 5, 16, 31] {
            let weights = gaussian_weights(kernel_size);

            assert_eq!(weights.len(), kernel_size as usize + 1);

            let total = weights[0] + 2.0 * weights[1..].iter().sum::<f32>();

            assert_relative_eq!(total, 1.0, epsilon = 1.0e-5);
        }

        let weights = gaussian_weights(5);

        for pair in weights.windows(2) {
            assert!(pair[0] > pair[1], "weights must decay from the center");
        }
    }
}
