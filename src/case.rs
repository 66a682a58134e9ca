use crate::cli::Config;
use crate::geometry::{VoxelGeometry, iso_surface};
use crate::io::{self, CaseObserver, stl, vtk};
use crate::permeability::{self, PermeabilityReport};
use crate::prelude_crate::*;
use crate::simulation::{Simulation, SimulationState};
use colored::*;

/// Output spacing, in micrometres, of a cell of `resolution` metres.
fn get_spacing_um(resolution: Float) -> Float {
    resolution * 1e6
}

fn print_parameters(config: &Config, viscosity: Float, physical_pressure: Float) {
    let [nx, ny, nz] = config.n;
    println!("{}", "Parameters".cyan().bold());
    println!("  nu = {viscosity}");
    println!("  deltaP = {}", config.delta_p);
    println!("  omega = {}", config.omega);
    println!("  nx = {nx}, ny = {ny}, nz = {nz}");
    println!("  resolution [m] = {}", config.resolution);
    println!("  pressure [Pa] = {physical_pressure}\n");
}

fn write_geometry_artifacts(config: &Config, geometry: &VoxelGeometry) -> LbResult<()> {
    let vtk_path = config.output_dir.join(io::GEOMETRY_VTK_FILE);
    println!("Writing {}.", io::GEOMETRY_VTK_FILE.yellow().bold());
    vtk::write_tags_file(&vtk_path, geometry, get_spacing_um(config.resolution))?;

    let triangles = iso_surface::extract_interior(geometry);
    println!(
        "Writing {} ({} triangles).\n",
        io::GEOMETRY_STL_FILE.yellow().bold(),
        triangles.len()
    );
    stl::write_binary_file(config.output_dir.join(io::GEOMETRY_STL_FILE), &triangles)
}

/// Reads the geometry, runs the flow to convergence (or the iteration cap) and
/// derives the permeability, writing every artifact under the output directory.
pub fn run(config: &Config) -> LbResult<PermeabilityReport> {
    io::create_output_dir(&config.output_dir)?;

    println!(
        "Reading the geometry file {}.\n",
        config.input.display().to_string().yellow().bold()
    );
    let geometry = VoxelGeometry::from_path(&config.input, config.n)?;
    println!(
        "Fluid {}, solid {}, inactive {} (porosity {:.4}).\n",
        geometry.count(Fluid),
        geometry.count(Solid),
        geometry.count(Inactive),
        geometry.get_porosity()
    );
    write_geometry_artifacts(config, &geometry)?;

    let parameters = config.get_parameters();
    let viscosity = parameters.get_viscosity();
    let physical_pressure = permeability::physical_pressure(config.delta_p, config.resolution);
    print_parameters(config, viscosity, physical_pressure);

    let mut simulation = Simulation::new(&geometry, parameters)?;
    let mut observer = CaseObserver::new(&config.output_dir)?;
    println!("{}", "Simulation begins".cyan().bold());
    println!("{:>10} {:>18}", "iteration".cyan().bold(), "energy".cyan().bold());
    let outcome = simulation.run(&mut observer)?;
    observer.finish()?;
    match outcome.state {
        SimulationState::Converged => println!(
            "\nConverged at iteration {}.\n",
            outcome.iterations.to_string().green().bold()
        ),
        _ => println!(
            "\nIteration cap reached at iteration {}.\n",
            outcome.iterations.to_string().yellow().bold()
        ),
    }

    let report = permeability::compute_permeability(
        simulation.get_field(),
        &geometry,
        viscosity,
        config.delta_p,
        config.resolution,
        physical_pressure,
        &geometry.get_bounding_box(),
    )?;
    report.print();

    let file_name = io::get_step_file_name(io::VELOCITY_VTK_PREFIX, outcome.iterations, "vtk");
    println!("Writing {}.", file_name.yellow().bold());
    vtk::write_velocity_file(
        config.output_dir.join(&file_name),
        geometry.get_n(),
        &simulation.get_field().compute_velocity_field(&geometry),
        report.velocity_scale,
        get_spacing_um(config.resolution),
    )?;
    println!("{}", "Finished!".green().bold());
    Ok(report)
}
