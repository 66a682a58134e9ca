// ------------------------------------------------------------------------------- IMPORTS

use crate::geometry::{Domain, VoxelGeometry};
use crate::lattice::LatticeField;
use crate::prelude_crate::*;
use colored::*;

// ------------------------------------------------------------ STRUCT: PermeabilityReport

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PermeabilityReport {
    /// Superficial velocity along X, lattice units.
    pub mean_velocity: Float,
    pub lattice_permeability: Float,
    /// m^2
    pub physical_permeability: Float,
    /// m/s
    pub physical_mean_velocity: Float,
    /// m/s per lattice velocity unit.
    pub velocity_scale: Float,
}

impl PermeabilityReport {
    pub fn get_permeability_um2(&self) -> Float {
        self.physical_permeability * 1e12
    }

    pub fn get_mean_velocity_cm_s(&self) -> Float {
        self.physical_mean_velocity * 1e2
    }

    pub fn print(&self) {
        println!("{}", "Permeability".cyan().bold());
        println!(
            "  lattice units: {}",
            format!("{:.8e}", self.lattice_permeability).green().bold()
        );
        println!(
            "  physical units: {} m^2 ({} um^2)",
            format!("{:.8e}", self.physical_permeability).green().bold(),
            format!("{:.6}", self.get_permeability_um2()).green().bold()
        );
        println!(
            "  mean velocity: {} (lattice), {} cm/s",
            format!("{:.8e}", self.mean_velocity).green().bold(),
            format!("{:.8e}", self.get_mean_velocity_cm_s()).green().bold()
        );
        println!(
            "  velocity scale: {} m/s per lattice unit\n",
            format!("{:.8e}", self.velocity_scale).green().bold()
        );
    }
}

// ----------------------------------------------------------------------------- FUNCTIONS

/// Physical pressure drop, in Pa, for a lattice pressure drop at `resolution`
/// metres per cell.
pub fn physical_pressure(delta_p: Float, resolution: Float) -> Float {
    delta_p / (resolution * resolution)
}

/// Mean of `u_x` over every cell of `domain`, solid and inactive cells
/// counting as zero. `domain` must lie inside the grid.
pub fn mean_velocity(
    field: &LatticeField,
    geometry: &VoxelGeometry,
    domain: &Domain,
) -> LbResult<Float> {
    geometry.check_domain(domain)?;
    if field.get_n() != geometry.get_n() {
        return Err(LbError::InvalidArguments(format!(
            "Field of size {:?} does not match the {:?} grid",
            field.get_n(),
            geometry.get_n()
        )));
    }
    let sum = (domain.x0..=domain.x1)
        .into_par_iter()
        .map(|x| {
            let mut sum = 0.0;
            for y in domain.y0..=domain.y1 {
                for z in domain.z0..=domain.z1 {
                    if matches!(geometry.get_node_type(x, y, z), Fluid) {
                        sum += field.get_velocity(x, y, z)[0];
                    }
                }
            }
            sum
        })
        .sum::<Float>();
    Ok(sum / domain.get_number_of_cells() as Float)
}

/// Darcy's law in lattice units, converted with `resolution` and
/// `physical_pressure`. `nx` is the number of X-layers the pressure drop acts on.
///
/// The flow is considered absent when `|mean_velocity|` is below
/// `NO_FLOW_RATIO` times the lattice pressure gradient, or below the roundoff
/// of a unit density.
///
/// # Examples
/// ```
/// # use lbperm::permeability;
/// let report = permeability::darcy(0.01, 1.0 / 6.0, 5e-5, 10, 1e-4, 5e-5 / 1e-8).unwrap();
///
/// assert!((report.lattice_permeability - 300.0).abs() < 1e-9);
/// assert!((report.physical_permeability - 3e-6).abs() < 1e-15);
/// ```
pub fn darcy(
    mean_velocity: Float,
    viscosity: Float,
    delta_p: Float,
    nx: usize,
    resolution: Float,
    physical_pressure: Float,
) -> LbResult<PermeabilityReport> {
    let length = (nx.max(2) - 1) as Float;
    let gradient = delta_p / length;
    let threshold = (NO_FLOW_RATIO * gradient.abs()).max(Float::EPSILON * LATTICE_DENSITY);
    if delta_p == 0.0 || !mean_velocity.is_finite() || mean_velocity.abs() < threshold {
        return Err(LbError::NoFlow { mean_velocity });
    }
    let lattice_permeability = viscosity * mean_velocity / gradient;
    let physical_permeability = lattice_permeability * resolution * resolution;
    let physical_mean_velocity =
        physical_permeability / WATER_VISCOSITY * physical_pressure / length / resolution;
    Ok(PermeabilityReport {
        mean_velocity,
        lattice_permeability,
        physical_permeability,
        physical_mean_velocity,
        velocity_scale: physical_mean_velocity / mean_velocity,
    })
}

pub fn compute_permeability(
    field: &LatticeField,
    geometry: &VoxelGeometry,
    viscosity: Float,
    delta_p: Float,
    resolution: Float,
    physical_pressure: Float,
    domain: &Domain,
) -> LbResult<PermeabilityReport> {
    let mean_velocity = mean_velocity(field, geometry, domain)?;
    darcy(
        mean_velocity,
        viscosity,
        delta_p,
        geometry.get_nx(),
        resolution,
        physical_pressure,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_darcy_reference_values() {
        let pressure = physical_pressure(5e-5, 1e-4);
        let report = darcy(0.01, 1.0 / 6.0, 5e-5, 10, 1e-4, pressure).unwrap();

        assert!((pressure - 5e3).abs() < 1e-9);
        assert!((report.lattice_permeability - 300.0).abs() < 1e-9);
        assert!((report.physical_permeability - 3e-6).abs() < 1e-15);
        assert!((report.get_permeability_um2() - 3e6).abs() < 1e-3);
        // k / mu * (p / (nx - 1)) / res = 3e-6 / 1e-3 * 5e3 / 9 / 1e-4
        assert!((report.physical_mean_velocity - 3e-6 / 1e-3 * 5e3 / 9.0 / 1e-4).abs() < 1e-6);
        assert!(
            (report.velocity_scale - report.physical_mean_velocity / 0.01).abs()
                < 1e-9 * report.velocity_scale
        );
    }

    #[test]
    fn test_no_flow() {
        assert!(matches!(
            darcy(0.0, 1.0 / 6.0, 5e-5, 10, 1e-4, 5e3),
            Err(LbError::NoFlow { .. })
        ));
        assert!(matches!(
            darcy(0.01, 1.0 / 6.0, 0.0, 10, 1e-4, 0.0),
            Err(LbError::NoFlow { .. })
        ));
    }

    #[test]
    fn test_no_flow_threshold_follows_pressure_gradient() {
        // tiny gradient, tiny but real flow
        let report = darcy(5e-16, 1.0 / 6.0, 1e-13, 10, 1e-4, 1e-5).unwrap();
        assert!((report.lattice_permeability - 1.0 / 6.0 * 5e-16 * 9.0 / 1e-13).abs() < 1e-9);

        // roundoff of a blocked medium
        assert!(matches!(
            darcy(-5.2e-17, 1.0 / 6.0, 1e-3, 10, 1e-4, 1e5),
            Err(LbError::NoFlow { .. })
        ));
        // lattice permeability ~1e-11 under a strong gradient
        assert!(matches!(
            darcy(1e-14, 1.0 / 6.0, 1e-3, 10, 1e-4, 1e5),
            Err(LbError::NoFlow { .. })
        ));
        assert!(matches!(
            darcy(Float::NAN, 1.0 / 6.0, 1e-3, 10, 1e-4, 1e5),
            Err(LbError::NoFlow { .. })
        ));
    }

    #[test]
    fn test_domain_outside_grid_is_rejected() {
        let n = [4, 4, 4];
        let geometry = VoxelGeometry::only_fluid(n).unwrap();
        let field = LatticeField::at_equilibrium(n, |_, _, _| (1.0, [0.01, 0.0, 0.0]));

        let result = compute_permeability(
            &field,
            &geometry,
            1.0 / 6.0,
            1e-3,
            1e-4,
            1e5,
            &Domain::new(0, 4, 0, 3, 0, 3),
        );
        assert!(matches!(result, Err(LbError::InvalidArguments(_))));

        let result = mean_velocity(&field, &geometry, &Domain::new(3, 1, 0, 3, 0, 3));
        assert!(matches!(result, Err(LbError::InvalidArguments(_))));
    }

    #[test]
    fn test_mismatched_field_is_rejected() {
        let geometry = VoxelGeometry::only_fluid([4, 4, 4]).unwrap();
        let field = LatticeField::new([4, 4, 3]);

        let result = mean_velocity(&field, &geometry, &Domain::from_n([4, 4, 3]));

        assert!(matches!(result, Err(LbError::InvalidArguments(_))));
    }

    #[test]
    fn test_mean_velocity_counts_solid_cells_as_zero() {
        let n = [2, 2, 2];
        let geometry =
            VoxelGeometry::from_fn(n, |_, y, _| if y == 0 { Fluid } else { Solid }).unwrap();
        let field = LatticeField::at_equilibrium(n, |_, _, _| (1.0, [0.04, 0.0, 0.0]));

        let actual = mean_velocity(&field, &geometry, &geometry.get_bounding_box()).unwrap();

        assert!((actual - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_mean_velocity_over_sub_domain() {
        let n = [4, 3, 3];
        let geometry = VoxelGeometry::only_fluid(n).unwrap();
        let field =
            LatticeField::at_equilibrium(n, |x, _, _| (1.0, [0.01 * x as Float, 0.0, 0.0]));

        let domain = Domain::new(2, 3, 0, 2, 0, 2);
        let actual = mean_velocity(&field, &geometry, &domain).unwrap();

        assert!((actual - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_compute_permeability_matches_darcy() {
        let n = [10, 3, 3];
        let geometry = VoxelGeometry::only_fluid(n).unwrap();
        let field = LatticeField::at_equilibrium(n, |_, _, _| (1.0, [0.01, 0.0, 0.0]));

        let report = compute_permeability(
            &field,
            &geometry,
            1.0 / 6.0,
            5e-5,
            1e-4,
            5e3,
            &geometry.get_bounding_box(),
        )
        .unwrap();

        assert!((report.lattice_permeability - 300.0).abs() < 1e-6);
    }
}
