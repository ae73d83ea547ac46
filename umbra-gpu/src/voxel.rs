use glam::{uvec3, UVec3, Vec3};

/// The voxel volume: a `step³` grid covering the axis-aligned world-space
/// box `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelGrid {
    pub step: u32,
    pub min: Vec3,
    pub max: Vec3,
}

impl VoxelGrid {
    pub fn new(step: u32, min: Vec3, max: Vec3) -> Self {
        assert!(step.is_power_of_two(), "voxel resolution must be 2^n");

        Self { step, min, max }
    }

    /// Grid resolution at `mip` (halved per level).
    pub fn mip_step(&self, mip: u32) -> u32 {
        self.step >> mip
    }

    /// Number of levels in a full mip chain.
    pub fn mip_levels(&self) -> u32 {
        32 - self.step.leading_zeros()
    }

    /// Decomposes a linear voxel index into (px, py, pz) for a grid of the
    /// given (mip-reduced) resolution. The division/modulo order is the
    /// contract the debug visualization depends on.
    pub fn decode(n: u32, step: u32) -> UVec3 {
        let step2 = step * step;
        let pz = n / step2;
        let n = n % step2;
        let py = n / step;
        let px = n % step;

        uvec3(px, py, pz)
    }

    /// Inverse of [`Self::decode`].
    pub fn encode(p: UVec3, step: u32) -> u32 {
        p.z * step * step + p.y * step + p.x
    }

    /// World-space position of voxel `n` at `mip`: centered on the grid,
    /// normalized by the reduced resolution, scaled to the box extent and
    /// offset to the box center.
    pub fn voxel_position(&self, n: u32, mip: u32) -> Vec3 {
        let step = self.mip_step(mip);
        let p = Self::decode(n, step).as_vec3();

        let pos = (p - Vec3::splat((step / 2) as f32)) / step as f32;

        pos * (self.max - self.min) + (self.max + self.min) / 2.0
    }

    /// Edge length of one voxel at `mip`.
    pub fn voxel_extent(&self, mip: u32) -> f32 {
        (self.max.x - self.min.x) / self.step as f32 * (1 << mip) as f32
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;

    #[test]
    fn decode_encode_round_trips() {
        for mip in 0..3 {
            let step = 16u32 >> mip;

            for n in 0..step * step * step {
                let p = VoxelGrid::decode(n, step);

                assert!(p.x < step && p.y < step && p.z < step);
                assert_eq!(VoxelGrid::encode(p, step), n);
            }
        }
    }

    #[test]
    fn decode_order_is_z_major() {
        let step = 8;

        assert_eq!(VoxelGrid::decode(0, step), uvec3(0, 0, 0));
        assert_eq!(VoxelGrid::decode(1, step), uvec3(1, 0, 0));
        assert_eq!(VoxelGrid::decode(step, step), uvec3(0, 1, 0));
        assert_eq!(VoxelGrid::decode(step * step, step), uvec3(0, 0, 1));
        assert_eq!(
            VoxelGrid::decode(step * step * step - 1, step),
            uvec3(step - 1, step - 1, step - 1),
        );
    }

    #[test]
    fn positions_stay_inside_the_box() {
        let grid = VoxelGrid::new(16, vec3(-12.0, -12.0, -12.0), vec3(12.0, 12.0, 12.0));

        for mip in 0..3 {
            let step = grid.mip_step(mip);

            for n in 0..step * step * step {
                let pos = grid.voxel_position(n, mip);
                let margin = grid.voxel_extent(mip);

                assert!(pos.cmpge(grid.min - margin).all(), "{pos} below {mip}");
                assert!(pos.cmple(grid.max + margin).all(), "{pos} above {mip}");
            }
        }
    }

    #[test]
    fn grid_center_maps_to_box_center() {
        let grid = VoxelGrid::new(8, vec3(-4.0, -4.0, -4.0), vec3(4.0, 4.0, 4.0));

        let center = VoxelGrid::encode(uvec3(4, 4, 4), 8);

        assert_relative_eq!(grid.voxel_position(center, 0).x, 0.0);
        assert_relative_eq!(grid.voxel_position(center, 0).y, 0.0);
        assert_relative_eq!(grid.voxel_position(center, 0).z, 0.0);
    }

    #[test]
    fn mip_chain_is_full() {
        let grid = VoxelGrid::new(128, Vec3::splat(-12.0), Vec3::splat(12.0));

        assert_eq!(grid.mip_levels(), 8);
        assert_eq!(grid.mip_step(7), 1);
        assert_relative_eq!(grid.voxel_extent(0), 0.1875);
    }
}
