use glam::{vec3, Mat4, Vec3};

use crate::gpu;

/// Cubemap face order and orientation: {+X, −X, +Y, −Y, +Z, −Z}, with the
/// conventional per-face up vectors. Face `i` of every depth cubemap is
/// rendered through `cube_face_transforms()[i]`.
pub const CUBE_FACE_DIRECTIONS: [Vec3; 6] = [
    vec3(1.0, 0.0, 0.0),
    vec3(-1.0, 0.0, 0.0),
    vec3(0.0, 1.0, 0.0),
    vec3(0.0, -1.0, 0.0),
    vec3(0.0, 0.0, 1.0),
    vec3(0.0, 0.0, -1.0),
];

pub const CUBE_FACE_UPS: [Vec3; 6] = [
    vec3(0.0, -1.0, 0.0),
    vec3(0.0, -1.0, 0.0),
    vec3(0.0, 0.0, 1.0),
    vec3(0.0, 0.0, -1.0),
    vec3(0.0, -1.0, 0.0),
    vec3(0.0, -1.0, 0.0),
];

/// A directional light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl DirLight {
    pub(crate) fn serialize(&self) -> gpu::DirectionalLight {
        gpu::DirectionalLight {
            direction: self.direction.extend(0.0),
            ambient: self.ambient.extend(0.0),
            diffuse: self.diffuse.extend(0.0),
            specular: self.specular.extend(0.0),
        }
    }
}

/// A point light with quadratic distance attenuation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    pub fn new(position: Vec3, ambient: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        Self {
            position,
            ambient,
            diffuse,
            specular,
            constant: 1.0,
            linear: 0.022,
            quadratic: 0.019,
        }
    }

    pub(crate) fn serialize(&self) -> gpu::PointLight {
        gpu::PointLight {
            position: self.position.extend(0.0),
            ambient: self.ambient.extend(0.0),
            diffuse: self.diffuse.extend(0.0),
            specular: self.specular.extend(0.0),
            attenuation: glam::vec4(self.constant, self.linear, self.quadratic, 0.0),
        }
    }
}

/// A spot light; `cut_off`/`outer_cut_off` are cone-angle cosines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub cut_off: f32,
    pub outer_cut_off: f32,
}

impl SpotLight {
    pub fn new(
        position: Vec3,
        direction: Vec3,
        ambient: Vec3,
        diffuse: Vec3,
        specular: Vec3,
    ) -> Self {
        Self {
            position,
            direction,
            ambient,
            diffuse,
            specular,
            constant: 1.0,
            linear: 0.022,
            quadratic: 0.019,
            cut_off: 12.5f32.to_radians().cos(),
            outer_cut_off: 15.0f32.to_radians().cos(),
        }
    }

    pub(crate) fn serialize(&self) -> gpu::SpotLight {
        gpu::SpotLight {
            position: self.position.extend(0.0),
            direction: self.direction.extend(0.0),
            ambient: self.ambient.extend(0.0),
            diffuse: self.diffuse.extend(0.0),
            specular: self.specular.extend(0.0),
            attenuation: glam::vec4(self.constant, self.linear, self.quadratic, 0.0),
            cutoff: glam::vec4(self.cut_off, self.outer_cut_off, 0.0, 0.0),
        }
    }
}

/// Light-space transform for a directional light: a fixed orthographic box
/// looking from a world-space anchor along the light direction, world-up as
/// up. No frustum fitting happens here; receivers outside the configured
/// extent fall off the map and sample the border.
pub fn directional_light_space(
    anchor: Vec3,
    direction: Vec3,
    half_extent: f32,
    near: f32,
    far: f32,
) -> Mat4 {
    let projection = Mat4::orthographic_rh(
        -half_extent,
        half_extent,
        -half_extent,
        half_extent,
        near,
        far,
    );

    let view = Mat4::look_at_rh(anchor, anchor + direction, Vec3::Y);

    projection * view
}

/// The six cubemap face transforms for a point/spot light: 90° perspective
/// projections looking along [`CUBE_FACE_DIRECTIONS`].
pub fn cube_face_transforms(position: Vec3, near: f32, far: f32) -> [Mat4; 6] {
    let projection =
        Mat4::perspective_rh(90.0f32.to_radians(), 1.0, near, far);

    std::array::from_fn(|i| {
        projection
            * Mat4::look_at_rh(
                position,
                position + CUBE_FACE_DIRECTIONS[i],
                CUBE_FACE_UPS[i],
            )
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn directional_transform_maps_the_configured_box() {
        let anchor = vec3(10.0, 10.0, 10.0);
        let direction = vec3(-10.0, -7.0, -10.0).normalize();
        let matrix = directional_light_space(anchor, direction, 20.0, 0.1, 30.0);

        // The anchor itself projects to the center of the near plane.
        let h = matrix.project_point3(anchor);
        assert_relative_eq!(h.x, 0.0, epsilon = 1.0e-4);
        assert_relative_eq!(h.y, 0.0, epsilon = 1.0e-4);

        // A point along the view ray lands deeper but still centered, with
        // depth growing toward 1 at the far plane.
        let mid = matrix.project_point3(anchor + direction * 15.0);
        assert_relative_eq!(mid.x, 0.0, epsilon = 1.0e-4);
        assert_relative_eq!(mid.z, (15.0 - 0.1) / (30.0 - 0.1), epsilon = 1.0e-4);

        // Points at the extent edge reach |x| = 1.
        let view = Mat4::look_at_rh(anchor, anchor + direction, Vec3::Y);
        let right = view.inverse().transform_vector3(Vec3::X);
        let edge = matrix.project_point3(anchor + direction * 15.0 + right * 20.0);
        assert_relative_eq!(edge.x, 1.0, epsilon = 1.0e-4);
    }

    #[test]
    fn cube_faces_look_along_their_axes() {
        let position = vec3(1.0, 2.0, 3.0);
        let transforms = cube_face_transforms(position, 0.1, 200.0);

        for (i, transform) in transforms.iter().enumerate() {
            // A point straight ahead of face i projects to the face center.
            let ahead = position + CUBE_FACE_DIRECTIONS[i] * 10.0;
            let h = transform.project_point3(ahead);

            assert_relative_eq!(h.x, 0.0, epsilon = 1.0e-4);
            assert_relative_eq!(h.y, 0.0, epsilon = 1.0e-4);
            assert!(h.z > 0.0 && h.z < 1.0);

            // A point behind the face does not.
            let behind = position - CUBE_FACE_DIRECTIONS[i] * 10.0;
            let b = transform.project_point3(behind);

            assert!(b.z < 0.0 || b.z > 1.0 || b.x.abs() > 1.0 || b.y.abs() > 1.0);
        }
    }

    #[test]
    fn point_light_defaults_to_quadratic_falloff() {
        let light = PointLight::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE, Vec3::ONE);

        assert_relative_eq!(light.constant, 1.0);
        assert_relative_eq!(light.linear, 0.022);
        assert_relative_eq!(light.quadratic, 0.019);
    }

    #[test]
    fn spot_light_cutoffs_are_cosines() {
        let light =
            SpotLight::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::ZERO, Vec3::ONE, Vec3::ONE);

        assert!(light.cut_off > light.outer_cut_off);
        assert_relative_eq!(light.cut_off, 12.5f32.to_radians().cos());
        assert_relative_eq!(light.outer_cut_off, 15.0f32.to_radians().cos());
    }
}
