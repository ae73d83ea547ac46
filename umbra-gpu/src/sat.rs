//! Summed-area-table scheduling.
//!
//! A SAT over an `S`-wide axis is built with radix-`r` passes: pass `i`
//! adds `r` taps spaced `r^i` texels apart, so after `⌈log_r S⌉` passes
//! every texel holds the inclusive prefix sum along that axis. The compute
//! shader runs the per-pass recurrence; the host runs this schedule once
//! per axis, horizontal then vertical.

/// Number of passes needed per axis: the smallest `n` with `radix^n >= size`.
pub fn sat_passes_per_axis(size: u32, radix: u32) -> u32 {
    assert!(radix >= 2, "SAT radix must be at least 2");
    assert!(size >= 1);

    let mut passes = 0;
    let mut span = 1u64;

    while span < u64::from(size) {
        span *= u64::from(radix);
        passes += 1;
    }

    passes
}

/// Tap stride of pass `pass_index`: `radix^pass_index` texels.
pub fn sat_pass_stride(radix: u32, pass_index: u32) -> u32 {
    radix.pow(pass_index)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn pass_counts() {
        assert_eq!(sat_passes_per_axis(1024, 2), 10);
        assert_eq!(sat_passes_per_axis(1024, 4), 5);
        assert_eq!(sat_passes_per_axis(1024, 3), 7);
        assert_eq!(sat_passes_per_axis(512, 2), 9);
        assert_eq!(sat_passes_per_axis(1, 2), 0);
        assert_eq!(sat_passes_per_axis(2, 2), 1);
        assert_eq!(sat_passes_per_axis(3, 2), 2);
    }

    #[test]
    fn stride_grows_by_radix() {
        assert_eq!(sat_pass_stride(2, 0), 1);
        assert_eq!(sat_pass_stride(2, 3), 8);
        assert_eq!(sat_pass_stride(4, 2), 16);
    }

    /// One axis pass of the shader recurrence on the CPU.
    fn run_pass(src: &[f32], size: usize, radix: u32, pass_index: u32, axis: usize) -> Vec<f32> {
        let stride = sat_pass_stride(radix, pass_index) as isize;
        let mut dst = vec![0.0; src.len()];

        for y in 0..size {
            for x in 0..size {
                let mut sum = 0.0;

                for k in 0..radix as isize {
                    let (qx, qy) = if axis == 0 {
                        (x as isize - k * stride, y as isize)
                    } else {
                        (x as isize, y as isize - k * stride)
                    };

                    if qx >= 0 && qy >= 0 {
                        sum += src[qy as usize * size + qx as usize];
                    }
                }

                dst[y * size + x] = sum;
            }
        }

        dst
    }

    fn build_sat(data: &[f32], size: usize, radix: u32) -> Vec<f32> {
        let passes = sat_passes_per_axis(size as u32, radix);
        let mut buf = data.to_vec();

        for axis in 0..2 {
            for i in 0..passes {
                buf = run_pass(&buf, size, radix, i, axis);
            }
        }

        buf
    }

    #[test]
    fn full_rect_query_equals_total_sum() {
        for radix in [2, 3, 4] {
            let size = 16;
            let data: Vec<f32> = (0..size * size)
                .map(|i| ((i * 37 + 11) % 97) as f32 * 0.25)
                .collect();

            let sat = build_sat(&data, size, radix);
            let total: f32 = data.iter().sum();

            assert_relative_eq!(
                sat[size * size - 1],
                total,
                epsilon = total * 1.0e-5
            );
        }
    }

    #[test]
    fn rect_queries_match_direct_sums() {
        let size = 32;
        let data: Vec<f32> = (0..size * size)
            .map(|i| ((i * 13 + 5) % 41) as f32)
            .collect();

        let sat = build_sat(&data, size, 2);

        let corner = |x: isize, y: isize| -> f32 {
            if x < 0 || y < 0 {
                0.0
            } else {
                sat[y as usize * size + x as usize]
            }
        };

        for &(x0, y0, x1, y1) in &[(0, 0, 7, 7), (3, 5, 20, 11), (31, 0, 31, 31), (8, 8, 8, 8)] {
            let direct: f32 = (y0..=y1)
                .flat_map(|y| {
                    let data = &data;
                    (x0..=x1).map(move |x| data[y * size + x])
                })
                .sum();

            let query = corner(x1 as isize, y1 as isize)
                - corner(x0 as isize - 1, y1 as isize)
                - corner(x1 as isize, y0 as isize - 1)
                + corner(x0 as isize - 1, y0 as isize - 1);

            assert_relative_eq!(query, direct, epsilon = 0.5);
        }
    }
}
