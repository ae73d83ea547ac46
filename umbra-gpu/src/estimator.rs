//! Canonical occlusion estimators.
//!
//! These are the formulas the lighting shaders transcribe; keeping them
//! here, on the host, is what makes the filtering math testable without a
//! device. Each function returns a lit fraction in `[0, 1]`.

use glam::{vec2, Vec4};

/// Minimum variance floor used by the Chebyshev bound to absorb float
/// cancellation in `E[x²] − E[x]²`.
pub const MIN_VARIANCE: f32 = 1.0e-6;

/// Hard shadow test: fully lit or fully shadowed, nothing in between.
pub fn hard_visibility(receiver: f32, occluder: f32, bias: f32) -> f32 {
    if receiver - bias > occluder {
        0.0
    } else {
        1.0
    }
}

/// Chebyshev upper bound on the lit fraction from the first two depth
/// moments (VSM/VSSM). A receiver at or in front of the mean is exactly
/// fully lit, which covers the zero-variance flat-receiver case with no
/// false self-shadowing.
pub fn chebyshev_visibility(mean: f32, mean_sq: f32, receiver: f32) -> f32 {
    if receiver <= mean {
        return 1.0;
    }

    let variance = (mean_sq - mean * mean).max(MIN_VARIANCE);
    let delta = receiver - mean;

    variance / (variance + delta * delta)
}

/// ESM occlusion: `exp(c·d_occluder)` is prefiltered into the shadow map,
/// the receiver contributes `exp(−c·d_receiver)`, and the product clamps to
/// 1. With `c = 0` the ratio is identically 1 regardless of depth ordering.
pub fn esm_visibility(c: f32, receiver: f32, filtered_exp: f32) -> f32 {
    (filtered_exp * (-c * receiver).exp()).clamp(0.0, 1.0)
}

/// Prefilters a depth sample for ESM.
pub fn esm_moment(c: f32, depth: f32) -> f32 {
    (c * depth).exp()
}

/// The four power moments stored by MSM.
pub fn msm_moments(depth: f32) -> Vec4 {
    let d2 = depth * depth;

    Vec4::new(depth, d2, d2 * depth, d2 * d2)
}

/// Lit fraction from four power moments via the Hamburger 4MSM
/// reconstruction (Cholesky solve of the Hankel system, then the weight of
/// the support below the receiver depth).
///
/// A fully concentrated distribution (zero variance) at or behind the
/// receiver is exactly fully lit; the general path regularizes the moments
/// with `moment_bias` before solving.
pub fn msm_visibility(moments: Vec4, receiver: f32, moment_bias: f32) -> f32 {
    let variance = moments.y - moments.x * moments.x;

    if receiver <= moments.x && variance <= MIN_VARIANCE {
        return 1.0;
    }

    let b = moments.lerp(Vec4::new(0.0, 0.63, 0.0, 0.63), moment_bias);
    let z0 = receiver;

    // Cholesky factorization of the moment Hankel matrix.
    let l32_d22 = -b.x * b.y + b.z;
    let d22 = -b.x * b.x + b.y;
    let squared_depth_variance = -b.y * b.y + b.w;
    let d33_d22 = vec2(squared_depth_variance, -l32_d22).dot(vec2(d22, l32_d22));
    let inv_d22 = 1.0 / d22;
    let l32 = l32_d22 * inv_d22;

    // Solve the scaled inverse image of (1, z0, z0²).
    let mut c = [1.0, z0, z0 * z0];

    c[1] -= b.x;
    c[2] -= b.y + l32 * c[1];

    c[1] *= inv_d22;
    c[2] *= d22 / d33_d22;

    c[1] -= l32 * c[2];
    c[0] -= c[1] * b.x + c[2] * b.y;

    // Roots of c0 + c1·z + c2·z².
    let p = c[1] / c[2];
    let q = c[0] / c[2];
    let d = (p * p * 0.25 - q).max(0.0);
    let r = d.sqrt();
    let z1 = -p * 0.5 - r;
    let z2 = -p * 0.5 + r;

    let shadow = if z2 < z0 {
        // Receiver behind both roots: weight of the whole support.
        let quotient = (z1 * z2 - b.x * (z1 + z2) + b.y) / ((z0 - z1) * (z0 - z2));

        1.0 - quotient
    } else if z1 < z0 {
        // Receiver between the roots.
        (z0 * z2 - b.x * (z0 + z2) + b.y) / ((z2 - z1) * (z0 - z1))
    } else {
        0.0
    };

    1.0 - shadow.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec3, Mat4, Vec3};

    use super::*;

    #[test]
    fn hard_visibility_is_binary() {
        for receiver in [0.0, 0.25, 0.5, 0.75, 1.0] {
            for occluder in [0.0, 0.3, 0.6, 1.0] {
                let lit = hard_visibility(receiver, occluder, 0.005);

                assert!(lit == 0.0 || lit == 1.0);
            }
        }

        assert_eq!(hard_visibility(0.8, 0.5, 0.005), 0.0);
        assert_eq!(hard_visibility(0.5, 0.8, 0.005), 1.0);
        assert_eq!(hard_visibility(0.5, 0.5, 0.005), 1.0);
    }

    #[test]
    fn chebyshev_zero_variance_receiver_is_fully_lit() {
        // Flat, unoccluded receiver: every sample in the footprint is the
        // receiver's own depth.
        let depth = 0.42;

        assert_eq!(chebyshev_visibility(depth, depth * depth, depth), 1.0);
    }

    #[test]
    fn chebyshev_darkens_behind_occluders() {
        // Footprint fully covered by an occluder at 0.2, receiver at 0.8.
        let lit = chebyshev_visibility(0.2, 0.2 * 0.2, 0.8);

        assert!(lit < 0.05, "expected deep shadow, got {lit}");

        // Half-covered footprint bounds the penumbra from above.
        let mean = 0.5 * 0.2 + 0.5 * 0.8;
        let mean_sq = 0.5 * 0.2 * 0.2 + 0.5 * 0.8 * 0.8;
        let lit = chebyshev_visibility(mean, mean_sq, 0.8);

        assert!(lit >= 0.5 && lit < 1.0);
    }

    #[test]
    fn esm_with_zero_coefficient_is_fully_lit() {
        for receiver in [0.0, 0.3, 0.9] {
            for occluder in [0.1, 0.5, 1.0] {
                let filtered = esm_moment(0.0, occluder);

                assert_eq!(esm_visibility(0.0, receiver, filtered), 1.0);
            }
        }
    }

    #[test]
    fn esm_approaches_hard_shadows_for_large_c() {
        let c = 80.0;
        let occluder = 0.3;
        let filtered = esm_moment(c, occluder);

        assert!(esm_visibility(c, 0.8, filtered) < 1.0e-6);
        assert_relative_eq!(esm_visibility(c, 0.3, filtered), 1.0, epsilon = 1.0e-4);
    }

    #[test]
    fn msm_zero_variance_receiver_is_fully_lit() {
        let depth = 0.42;

        assert_eq!(msm_visibility(msm_moments(depth), depth, 3.0e-5), 1.0);
    }

    #[test]
    fn msm_darkens_behind_occluders() {
        let lit = msm_visibility(msm_moments(0.2), 0.8, 3.0e-5);

        assert!(lit < 0.05, "expected deep shadow, got {lit}");

        // Mixed footprint: half occluder at 0.2, half backdrop at 0.8, with
        // the receiver just in front of the backdrop.
        let mixed = 0.5 * msm_moments(0.2) + 0.5 * msm_moments(0.8);
        let lit = msm_visibility(mixed, 0.79, 3.0e-5);

        assert!(lit > 0.3 && lit < 0.7, "expected penumbra, got {lit}");
    }

    #[test]
    fn msm_bounds_tighter_than_chebyshev_on_mixed_footprints() {
        let mixed = 0.5 * msm_moments(0.2) + 0.5 * msm_moments(0.8);

        let msm = msm_visibility(mixed, 0.79, 3.0e-5);
        let vsm = chebyshev_visibility(mixed.x, mixed.y, 0.79);

        assert!(msm <= vsm + 1.0e-3);
    }

    /// End-to-end scenario: a directional light at (10, 10, 10) pointing
    /// toward (−10, −7, −10), a unit cube resting on a floor plane.
    /// Rasterizes the shadow map on the CPU through the
    /// real light-space transform, then compares the lit fraction under the
    /// cube's projected footprint against the open floor.
    #[test]
    fn cube_footprint_is_darker_than_open_floor() {
        const MAP: usize = 256;

        let position = vec3(10.0, 10.0, 10.0);
        let direction = vec3(-10.0, -7.0, -10.0).normalize();

        let projection = Mat4::orthographic_rh(-20.0, 20.0, -20.0, 20.0, 0.1, 60.0);
        let view = Mat4::look_at_rh(position, position + direction, Vec3::Y);
        let light_space = projection * view;
        let inverse = light_space.inverse();

        // Cube spans [-0.5, 0.5] in x/z with its top face at y = 1.
        let cube_min = vec3(-0.5, 0.0, -0.5);
        let cube_max = vec3(0.5, 1.0, 0.5);

        let mut depth_map = vec![1.0f32; MAP * MAP];

        for ty in 0..MAP {
            for tx in 0..MAP {
                let ndc_x = (tx as f32 + 0.5) / MAP as f32 * 2.0 - 1.0;
                let ndc_y = 1.0 - (ty as f32 + 0.5) / MAP as f32 * 2.0;

                // March the light ray for this texel against the cube's top
                // face and the floor; keep the nearest hit's depth.
                let origin = inverse.project_point3(vec3(ndc_x, ndc_y, 0.0));

                let mut depth = 1.0;

                let t_floor = -origin.y / direction.y;
                if t_floor > 0.0 {
                    let hit = origin + direction * t_floor;
                    depth = light_space.project_point3(hit).z;
                }

                let t_top = (cube_max.y - origin.y) / direction.y;
                if t_top > 0.0 {
                    let hit = origin + direction * t_top;

                    if hit.x >= cube_min.x
                        && hit.x <= cube_max.x
                        && hit.z >= cube_min.z
                        && hit.z <= cube_max.z
                    {
                        let d = light_space.project_point3(hit).z;
                        depth = depth.min(d);
                    }
                }

                depth_map[ty * MAP + tx] = depth;
            }
        }

        let sample = |world: Vec3| -> f32 {
            let h = light_space.project_point3(world);
            let u = h.x * 0.5 + 0.5;
            let v = 0.5 - h.y * 0.5;

            let tx = ((u * MAP as f32) as usize).min(MAP - 1);
            let ty = ((v * MAP as f32) as usize).min(MAP - 1);

            hard_visibility(h.z, depth_map[ty * MAP + tx], 0.002)
        };

        // The cube's top face projects onto the floor along the light
        // direction; sample the floor near that footprint center.
        let offset = vec3(direction.x, 0.0, direction.z) / -direction.y;
        let footprint = vec3(0.0, 0.0, 0.0) + offset * cube_max.y;

        let mut lit_inside = 0.0;
        let mut lit_outside = 0.0;
        let mut count = 0.0;

        for i in -2..=2 {
            for j in -2..=2 {
                let d = vec3(i as f32 * 0.1, 0.0, j as f32 * 0.1);

                lit_inside += sample(footprint + d);
                lit_outside += sample(vec3(5.0, 0.0, -5.0) + d * 4.0);
                count += 1.0;
            }
        }

        lit_inside /= count;
        lit_outside /= count;

        assert!(
            lit_inside < lit_outside,
            "footprint {lit_inside} should be darker than open floor {lit_outside}",
        );
        assert!(lit_inside < 0.5);
        assert_relative_eq!(lit_outside, 1.0);
    }
}
