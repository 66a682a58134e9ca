// ------------------------------------------------------------------------------- MODULES

pub mod boundary;
mod collision;

// ------------------------------------------------------------------------------- IMPORTS

use crate::geometry::VoxelGeometry;
use crate::prelude_crate::*;

pub use collision::CollisionStreamStep;

// ------------------------------------------------------------------ STRUCT: LatticeField

/// Populations of every cell, `Q` contiguous values per cell, cells stored
/// x-major like `VoxelGeometry`.
#[derive(Debug, Clone)]
pub struct LatticeField {
    n: [usize; 3],
    f: Vec<Float>,
    f_buffer: Vec<Float>,
}

impl LatticeField {
    /// Field at rest with the reference density.
    pub fn new(n: [usize; 3]) -> Self {
        LatticeField::at_equilibrium(n, |_, _, _| (LATTICE_DENSITY, [0.0; D]))
    }

    /// # Examples
    /// ```
    /// # use lbperm::lattice::LatticeField;
    /// let field = LatticeField::at_equilibrium([3, 2, 2], |x, _, _| (1.0 + x as f64, [0.0; 3]));
    ///
    /// assert!((field.get_density(0, 1, 1) - 1.0).abs() < 1e-12);
    /// assert!((field.get_density(2, 0, 1) - 3.0).abs() < 1e-12);
    /// ```
    pub fn at_equilibrium<F>(n: [usize; 3], state: F) -> Self
    where
        F: Fn(usize, usize, usize) -> (Float, [Float; D]) + Sync,
    {
        let [nx, ny, nz] = n;
        let num_nodes = nx * ny * nz;
        let mut f = vec![0.0; num_nodes * Q];
        f.par_chunks_mut(Q).enumerate().for_each(|(i, f_node)| {
            let z = i % nz;
            let y = (i / nz) % ny;
            let x = i / (ny * nz);
            let (density, velocity) = state(x, y, z);
            f_node.copy_from_slice(&kernel::equilibrium(density, &velocity));
        });
        LatticeField {
            n,
            f_buffer: f.clone(),
            f,
        }
    }

    /// Field at rest with the density decreasing linearly from 1 at the inlet
    /// to `1 - 3 delta_p` at the outlet.
    ///
    /// # Examples
    /// ```
    /// # use lbperm::lattice::LatticeField;
    /// let field = LatticeField::with_pressure_gradient([5, 3, 3], 1e-2);
    ///
    /// assert!((field.get_density(0, 1, 1) - 1.0).abs() < 1e-12);
    /// assert!((field.get_density(4, 1, 1) - 0.97).abs() < 1e-12);
    /// assert!((field.get_density(2, 0, 2) - 0.985).abs() < 1e-12);
    /// ```
    pub fn with_pressure_gradient(n: [usize; 3], delta_p: Float) -> Self {
        let gradient = delta_p * CS_2_INV / (n[0].max(2) - 1) as Float;
        LatticeField::at_equilibrium(n, |x, _, _| {
            (LATTICE_DENSITY - gradient * x as Float, [0.0; D])
        })
    }
}

impl LatticeField {
    pub fn get_n(&self) -> [usize; 3] {
        self.n
    }

    pub fn get_nx(&self) -> usize {
        self.n[0]
    }

    pub fn get_ny(&self) -> usize {
        self.n[1]
    }

    pub fn get_nz(&self) -> usize {
        self.n[2]
    }

    pub fn get_number_of_nodes(&self) -> usize {
        self.f.len() / Q
    }

    pub fn get_index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.n[1] + y) * self.n[2] + z
    }

    pub fn get_f(&self) -> &[Float] {
        &self.f
    }

    pub fn get_populations(&self, x: usize, y: usize, z: usize) -> &[Float] {
        let i = self.get_index(x, y, z);
        &self.f[i * Q..(i + 1) * Q]
    }

    pub fn set_populations(&mut self, x: usize, y: usize, z: usize, f_node: &[Float; Q]) {
        let i = self.get_index(x, y, z);
        self.f[i * Q..(i + 1) * Q].copy_from_slice(f_node);
    }

    pub fn get_density(&self, x: usize, y: usize, z: usize) -> Float {
        kernel::density(self.get_populations(x, y, z))
    }

    /// # Examples
    /// ```
    /// # use lbperm::lattice::LatticeField;
    /// let field = LatticeField::at_equilibrium([2, 2, 2], |_, _, _| (1.0, [0.02, 0.0, -0.01]));
    /// let velocity = field.get_velocity(1, 0, 1);
    ///
    /// assert!((velocity[0] - 0.02).abs() < 1e-12);
    /// assert!(velocity[1].abs() < 1e-12);
    /// assert!((velocity[2] + 0.01).abs() < 1e-12);
    /// ```
    pub fn get_velocity(&self, x: usize, y: usize, z: usize) -> [Float; D] {
        let f_node = self.get_populations(x, y, z);
        kernel::velocity(f_node, kernel::density(f_node))
    }

    pub(crate) fn get_slab_size(&self) -> usize {
        self.n[1] * self.n[2] * Q
    }

    pub(crate) fn get_f_mut(&mut self) -> &mut [Float] {
        &mut self.f
    }

    pub(crate) fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.f, &mut self.f_buffer);
    }
}

impl LatticeField {
    pub fn get_total_mass(&self) -> Float {
        self.f.par_iter().sum::<Float>()
    }

    /// Density and velocity of every cell. Cells that are not fluid report the
    /// reference density at rest.
    pub fn compute_macroscopic_fields(
        &self,
        geometry: &VoxelGeometry,
    ) -> (Vec<Float>, Vec<[Float; D]>) {
        self.f
            .par_chunks(Q)
            .zip(geometry.get_node_types().par_iter())
            .map(|(f_node, node_type)| match node_type {
                Fluid => {
                    let density = kernel::density(f_node);
                    (density, kernel::velocity(f_node, density))
                }
                Solid | Inactive => (LATTICE_DENSITY, [0.0; D]),
            })
            .unzip()
    }

    pub fn compute_velocity_field(&self, geometry: &VoxelGeometry) -> Vec<[Float; D]> {
        self.compute_macroscopic_fields(geometry).1
    }

    /// Velocity norm of the X-layer `x`, row-major in (y, z).
    pub fn compute_velocity_norm_slice(&self, geometry: &VoxelGeometry, x: usize) -> Vec<Float> {
        let [_, ny, nz] = self.n;
        (0..ny * nz)
            .map(|j| {
                let (y, z) = (j / nz, j % nz);
                match geometry.get_node_type(x, y, z) {
                    Fluid => {
                        let u = self.get_velocity(x, y, z);
                        u.iter().map(|u_x| u_x * u_x).sum::<Float>().sqrt()
                    }
                    Solid | Inactive => 0.0,
                }
            })
            .collect()
    }

    /// Mean kinetic energy `0.5 rho |u|^2` over the fluid cells.
    pub fn compute_average_energy(&self, geometry: &VoxelGeometry) -> Float {
        let (energy, count) = self
            .f
            .par_chunks(Q)
            .zip(geometry.get_node_types().par_iter())
            .filter(|(_, node_type)| matches!(node_type, Fluid))
            .map(|(f_node, _)| {
                let density = kernel::density(f_node);
                let velocity = kernel::velocity(f_node, density);
                (kernel::kinetic_energy(density, &velocity), 1_usize)
            })
            .reduce(|| (0.0, 0), |a, b| (a.0 + b.0, a.1 + b.1));
        if count == 0 {
            0.0
        } else {
            energy / count as Float
        }
    }

    /// Describes the first fluid cell with a non-finite or non-positive
    /// density or a negative population.
    pub fn check_stability(&self, geometry: &VoxelGeometry) -> Option<String> {
        self.f
            .par_chunks(Q)
            .zip(geometry.get_node_types().par_iter())
            .enumerate()
            .filter(|(_, (_, node_type))| matches!(node_type, Fluid))
            .find_map_first(|(i, (f_node, _))| {
                let density = kernel::density(f_node);
                let [x, y, z] = geometry.get_coordinates(i);
                if !density.is_finite() || density <= 0.0 {
                    Some(format!("density {density} at ({x}, {y}, {z})"))
                } else if let Some(f_i) = f_node.iter().find(|&&f_i| f_i < 0.0) {
                    Some(format!("negative population {f_i} at ({x}, {y}, {z})"))
                } else {
                    None
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_field_is_at_rest() {
        let field = LatticeField::new([3, 4, 5]);

        assert_eq!(field.get_number_of_nodes(), 60);
        assert!((field.get_total_mass() - 60.0).abs() < 1e-10);
        field
            .get_velocity(2, 3, 4)
            .iter()
            .for_each(|u_x| assert!(u_x.abs() < 1e-14));
    }

    #[test]
    fn test_set_populations() {
        let mut field = LatticeField::new([2, 2, 2]);
        let f_node = kernel::equilibrium(1.2, &[0.05, 0.0, 0.0]);

        field.set_populations(1, 0, 1, &f_node);

        assert!((field.get_density(1, 0, 1) - 1.2).abs() < 1e-12);
        assert!((field.get_velocity(1, 0, 1)[0] - 0.05).abs() < 1e-12);
        assert!((field.get_density(0, 0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_energy_ignores_non_fluid_cells() {
        let geometry =
            VoxelGeometry::from_fn([2, 1, 1], |x, _, _| if x == 0 { Fluid } else { Solid })
                .unwrap();
        let field = LatticeField::at_equilibrium([2, 1, 1], |x, _, _| {
            if x == 0 {
                (1.0, [0.1, 0.0, 0.0])
            } else {
                (1.0, [0.3, 0.0, 0.0])
            }
        });

        assert!((field.compute_average_energy(&geometry) - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_velocity_norm_slice() {
        let geometry =
            VoxelGeometry::from_fn([2, 2, 2], |_, y, _| if y == 0 { Fluid } else { Solid })
                .unwrap();
        let field = LatticeField::at_equilibrium([2, 2, 2], |_, _, _| (1.0, [0.03, 0.04, 0.0]));

        let slice = field.compute_velocity_norm_slice(&geometry, 1);

        assert_eq!(slice.len(), 4);
        assert!((slice[0] - 0.05).abs() < 1e-12);
        assert!((slice[1] - 0.05).abs() < 1e-12);
        assert_eq!(slice[2], 0.0);
        assert_eq!(slice[3], 0.0);
    }

    #[test]
    fn test_check_stability() {
        let geometry = VoxelGeometry::only_fluid([2, 2, 2]).unwrap();
        let mut field = LatticeField::new([2, 2, 2]);
        assert!(field.check_stability(&geometry).is_none());

        let mut f_node = kernel::equilibrium(1.0, &[0.0; D]);
        f_node[3] = -0.01;
        field.set_populations(1, 1, 0, &f_node);

        let reason = field.check_stability(&geometry).unwrap();
        assert!(reason.contains("(1, 1, 0)"));
    }

    #[test]
    fn test_check_stability_detects_nan_density() {
        let geometry = VoxelGeometry::only_fluid([2, 2, 2]).unwrap();
        let mut field = LatticeField::new([2, 2, 2]);
        field.set_populations(0, 1, 1, &[Float::NAN; Q]);

        let reason = field.check_stability(&geometry).unwrap();
        assert!(reason.contains("density"));
    }
}
