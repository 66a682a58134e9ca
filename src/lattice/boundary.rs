use super::LatticeField;
use crate::geometry::VoxelGeometry;
use crate::prelude_crate::*;

/// Fixed-density face normal to the flow direction.
///
/// Fluid cells of the face, except for its outer ring, are reset to the
/// equilibrium at the target density with the normal velocity of their
/// interior neighbour and no tangential velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureBoundary {
    face: BoundaryFace,
    density: Float,
}

impl PressureBoundary {
    pub fn new(face: BoundaryFace, density: Float) -> Self {
        PressureBoundary { face, density }
    }

    pub fn inlet() -> Self {
        PressureBoundary::new(BoundaryFace::West, LATTICE_DENSITY)
    }

    /// # Examples
    /// ```
    /// # use lbperm::lattice::boundary::PressureBoundary;
    /// # use lbperm::BoundaryFace;
    /// let outlet = PressureBoundary::outlet(1e-3);
    ///
    /// assert_eq!(outlet.get_face(), BoundaryFace::East);
    /// assert!((outlet.get_density() - 0.997).abs() < 1e-12);
    /// ```
    pub fn outlet(delta_p: Float) -> Self {
        PressureBoundary::new(BoundaryFace::East, LATTICE_DENSITY - delta_p * CS_2_INV)
    }

    pub fn get_face(&self) -> BoundaryFace {
        self.face
    }

    pub fn get_density(&self) -> Float {
        self.density
    }

    /// X-layers of the face and of its interior neighbour.
    fn get_layers(&self, nx: usize) -> (usize, usize) {
        let face_x = match self.face {
            BoundaryFace::West => 0,
            BoundaryFace::East => nx - 1,
        };
        let normal = C[velocity_set::get_face_normal_direction(&self.face)];
        let neighbor_x = (face_x as i64 + normal[0] as i64).clamp(0, nx as i64 - 1);
        (face_x, neighbor_x as usize)
    }

    pub fn apply(&self, field: &mut LatticeField, geometry: &VoxelGeometry) {
        let [nx, ny, nz] = field.get_n();
        if ny < 3 || nz < 3 {
            return;
        }
        let (face_x, neighbor_x) = self.get_layers(nx);
        let neighbor_velocities = (0..ny * nz)
            .into_par_iter()
            .map(|j| {
                let (y, z) = (j / nz, j % nz);
                match geometry.get_node_type(neighbor_x, y, z) {
                    Fluid => field.get_velocity(neighbor_x, y, z)[0],
                    Solid | Inactive => 0.0,
                }
            })
            .collect::<Vec<Float>>();
        let density = self.density;
        let slab_size = field.get_slab_size();
        let slab = &mut field.get_f_mut()[face_x * slab_size..(face_x + 1) * slab_size];
        slab.par_chunks_mut(Q)
            .enumerate()
            .filter(|(j, _)| {
                let (y, z) = (j / nz, j % nz);
                (1..ny - 1).contains(&y)
                    && (1..nz - 1).contains(&z)
                    && matches!(geometry.get_node_type(face_x, y, z), Fluid)
            })
            .for_each(|(j, f_node)| {
                let velocity = [neighbor_velocities[j], 0.0, 0.0];
                f_node.copy_from_slice(&kernel::equilibrium(density, &velocity));
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inlet_pins_density_on_face_interior() {
        let n = [4, 5, 5];
        let geometry = VoxelGeometry::only_fluid(n).unwrap();
        let mut field = LatticeField::at_equilibrium(n, |_, _, _| (0.9, [0.01, 0.0, 0.0]));

        PressureBoundary::inlet().apply(&mut field, &geometry);

        assert!((field.get_density(0, 2, 2) - 1.0).abs() < 1e-12);
        assert!((field.get_density(0, 1, 3) - 1.0).abs() < 1e-12);
        assert!((field.get_velocity(0, 2, 2)[0] - 0.01).abs() < 1e-12);
        assert!(field.get_velocity(0, 2, 2)[1].abs() < 1e-14);
    }

    #[test]
    fn test_outer_ring_is_untouched() {
        let n = [4, 5, 5];
        let geometry = VoxelGeometry::only_fluid(n).unwrap();
        let mut field = LatticeField::at_equilibrium(n, |_, _, _| (0.9, [0.0; D]));

        PressureBoundary::outlet(0.01).apply(&mut field, &geometry);

        assert!((field.get_density(3, 0, 2) - 0.9).abs() < 1e-12);
        assert!((field.get_density(3, 4, 4) - 0.9).abs() < 1e-12);
        assert!((field.get_density(3, 2, 2) - 0.97).abs() < 1e-12);
        assert!((field.get_density(0, 2, 2) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_non_fluid_cells_are_skipped() {
        let n = [3, 4, 4];
        let geometry = VoxelGeometry::from_fn(n, |x, y, z| {
            if x == 0 && y == 1 && z == 1 { Solid } else { Fluid }
        })
        .unwrap();
        let mut field = LatticeField::at_equilibrium(n, |_, _, _| (0.8, [0.0; D]));

        PressureBoundary::inlet().apply(&mut field, &geometry);

        assert!((field.get_density(0, 1, 1) - 0.8).abs() < 1e-12);
        assert!((field.get_density(0, 2, 2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_solid_neighbor_gives_zero_velocity() {
        let n = [3, 3, 3];
        let geometry =
            VoxelGeometry::from_fn(n, |x, _, _| if x == 1 { Solid } else { Fluid }).unwrap();
        let mut field = LatticeField::at_equilibrium(n, |_, _, _| (1.0, [0.05, 0.0, 0.0]));

        PressureBoundary::outlet(0.0).apply(&mut field, &geometry);

        assert!(field.get_velocity(2, 1, 1)[0].abs() < 1e-14);
    }
}
