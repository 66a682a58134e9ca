use super::LatticeField;
use crate::geometry::VoxelGeometry;
use crate::prelude_crate::*;

/// One collision and streaming step with the BGK relaxation `omega`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionStreamStep {
    omega: Float,
}

impl CollisionStreamStep {
    pub fn new(omega: Float) -> Self {
        CollisionStreamStep { omega }
    }

    /// Kinematic viscosity in lattice units.
    ///
    /// # Examples
    /// ```
    /// # use lbperm::lattice::CollisionStreamStep;
    /// let step = CollisionStreamStep::new(1.0);
    ///
    /// assert!((step.get_viscosity() - 1.0 / 6.0).abs() < 1e-12);
    /// ```
    pub fn get_viscosity(&self) -> Float {
        (1.0 / self.omega - 0.5) / CS_2_INV
    }

    pub fn advance(&self, field: &mut LatticeField, geometry: &VoxelGeometry) {
        self.collision_step(field, geometry);
        self.streaming_step(field);
    }

    pub fn collision_step(&self, field: &mut LatticeField, geometry: &VoxelGeometry) {
        let omega = self.omega;
        field
            .get_f_mut()
            .par_chunks_mut(Q)
            .zip(geometry.get_node_types().par_iter())
            .for_each(|(f_node, node_type)| match node_type {
                Fluid => {
                    let density = kernel::density(f_node);
                    let velocity = kernel::velocity(f_node, density);
                    let f_eq = kernel::equilibrium(density, &velocity);
                    kernel::bgk_collision(f_node, &f_eq, omega);
                }
                Solid => kernel::bounce_back(f_node),
                Inactive => {}
            });
    }

    /// Pull streaming into the spare buffer, one X-layer per task. Populations
    /// that would come from outside the grid are reflected from the cell itself.
    pub fn streaming_step(&self, field: &mut LatticeField) {
        let [nx, ny, nz] = field.get_n();
        let slab_size = field.get_slab_size();
        let LatticeField { f, f_buffer, .. } = field;
        let f: &[Float] = f;
        f_buffer
            .par_chunks_mut(slab_size)
            .enumerate()
            .for_each(|(x, slab)| {
                slab.chunks_mut(Q).enumerate().for_each(|(j, f_node)| {
                    let (y, z) = (j / nz, j % nz);
                    let node = (x * ny + y) * nz + z;
                    f_node.iter_mut().enumerate().for_each(|(i, f_i)| {
                        *f_i = match source_node([x, y, z], [nx, ny, nz], &C[i]) {
                            Some(source) => f[source * Q + i],
                            None => f[node * Q + Q_BAR[i]],
                        };
                    });
                });
            });
        field.swap_buffers();
    }
}

fn source_node(index: [usize; 3], n: [usize; 3], c_i: &[i32; D]) -> Option<usize> {
    let mut source = [0; 3];
    for x in 0..D {
        let s_x = index[x] as i64 - c_i[x] as i64;
        if s_x < 0 || s_x >= n[x] as i64 {
            return None;
        }
        source[x] = s_x as usize;
    }
    Some((source[0] * n[1] + source[1]) * n[2] + source[2])
}
