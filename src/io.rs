// ------------------------------------------------------------------------------- MODULES

pub mod stl;
pub mod vtk;

// ------------------------------------------------------------------------------- IMPORTS

use crate::geometry::VoxelGeometry;
use crate::lattice::LatticeField;
use crate::prelude_crate::*;
use crate::simulation::{IterationReport, SimulationObserver};
use colored::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const GEOMETRY_VTK_FILE: &str = "porous_medium.vtk";
pub const GEOMETRY_STL_FILE: &str = "porous_medium.stl";
pub const ENERGY_FILE: &str = "energy.csv";
pub const INLET_SLICE_PREFIX: &str = "ux_inlet";
pub const HALF_SLICE_PREFIX: &str = "ux_half";
pub const VELOCITY_VTK_PREFIX: &str = "vtk";

// ----------------------------------------------------------------------------- FUNCTIONS

pub fn create_output_dir<P>(path: P) -> LbResult<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        println!(
            "Creating the {} path.\n",
            path.display().to_string().yellow().bold()
        );
        fs::create_dir_all(path)?;
    } else {
        println!(
            "The {} path already exists.\n",
            path.display().to_string().yellow().bold()
        );
    }
    Ok(())
}

pub fn get_step_file_name(prefix: &str, iteration: usize, extension: &str) -> String {
    format!("{prefix}_{iteration:06}.{extension}")
}

/// Writes a `ny x nz` slice as CSV, one row per `y`.
pub fn write_slice_csv<W>(mut sink: W, values: &[Float], nz: usize) -> std::io::Result<()>
where
    W: Write,
{
    for row in values.chunks(nz.max(1)) {
        let line = row
            .iter()
            .map(|value| format!("{value:.8e}"))
            .collect::<Vec<String>>()
            .join(",");
        writeln!(sink, "{line}")?;
    }
    Ok(())
}

fn write_slice_file(path: &Path, values: &[Float], nz: usize) -> LbResult<()> {
    let mut file = BufWriter::new(File::create(path)?);
    write_slice_csv(&mut file, values, nz)?;
    file.flush()?;
    Ok(())
}

// ------------------------------------------------------------------ STRUCT: CaseObserver

/// Console progress, energy history and velocity slices of a run.
pub struct CaseObserver {
    output_dir: PathBuf,
    energy_file: BufWriter<File>,
    progress_interval: usize,
}

impl CaseObserver {
    pub fn new<P>(output_dir: P) -> LbResult<Self>
    where
        P: AsRef<Path>,
    {
        let output_dir = output_dir.as_ref().to_path_buf();
        let mut energy_file = BufWriter::new(File::create(output_dir.join(ENERGY_FILE))?);
        writeln!(energy_file, "iteration,energy")?;
        Ok(CaseObserver {
            output_dir,
            energy_file,
            progress_interval: PROGRESS_INTERVAL,
        })
    }

    pub fn get_output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn finish(mut self) -> LbResult<()> {
        self.energy_file.flush()?;
        Ok(())
    }

    fn print_tracer_statistics(&self, report: &IterationReport) {
        let tracer = report.tracer;
        println!(
            "{} average energy {}, std/average {}",
            "Tracer".cyan().bold(),
            format!("{:.8e}", tracer.compute_average()).green(),
            format!("{:.8e}", tracer.get_relative_deviation()).green()
        );
    }
}

impl SimulationObserver for CaseObserver {
    fn on_iteration(&mut self, report: &IterationReport) -> LbResult<()> {
        writeln!(self.energy_file, "{},{:.12e}", report.iteration, report.energy)?;
        if report.iteration % self.progress_interval == 0 {
            println!("{:>10} {:>18.8e}", report.iteration, report.energy);
        }
        let window_size = report.tracer.get_window_size();
        if report.tracer.is_full() && (report.iteration + 1) % window_size == 0 {
            self.print_tracer_statistics(report);
        }
        Ok(())
    }

    fn on_snapshot(
        &mut self,
        iteration: usize,
        field: &LatticeField,
        geometry: &VoxelGeometry,
    ) -> LbResult<()> {
        let nz = geometry.get_nz();
        let slices = [
            (INLET_SLICE_PREFIX, 0),
            (HALF_SLICE_PREFIX, geometry.get_nx() / 2),
        ];
        for (prefix, x) in slices {
            let file_name = get_step_file_name(prefix, iteration, "csv");
            println!(
                "Writing {} for iteration {}.",
                file_name.yellow().bold(),
                iteration.to_string().yellow().bold()
            );
            let values = field.compute_velocity_norm_slice(geometry, x);
            write_slice_file(&self.output_dir.join(file_name), &values, nz)?;
        }
        Ok(())
    }
}
