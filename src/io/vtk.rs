use crate::geometry::VoxelGeometry;
use crate::prelude_crate::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn write_header<W: Write>(
    sink: &mut W,
    title: &str,
    n: [usize; 3],
    spacing: Float,
) -> std::io::Result<()> {
    writeln!(sink, "# vtk DataFile Version 3.0")?;
    writeln!(sink, "{title}")?;
    writeln!(sink, "ASCII")?;
    writeln!(sink, "DATASET STRUCTURED_POINTS")?;
    writeln!(sink, "DIMENSIONS {} {} {}", n[0], n[1], n[2])?;
    writeln!(sink, "ORIGIN 0 0 0")?;
    writeln!(sink, "SPACING {spacing:e} {spacing:e} {spacing:e}")?;
    writeln!(sink, "POINT_DATA {}", n.iter().product::<usize>())?;
    Ok(())
}

/// VTK point order: x varies fastest, z slowest.
fn vtk_order(n: [usize; 3]) -> impl Iterator<Item = usize> {
    let [_, ny, nz] = n;
    (0..n[2]).flat_map(move |z| {
        (0..ny).flat_map(move |y| (0..n[0]).map(move |x| (x * ny + y) * nz + z))
    })
}

/// # Examples
/// ```
/// # use lbperm::geometry::VoxelGeometry;
/// # use lbperm::io::vtk;
/// # use lbperm::NodeType;
/// let geometry = VoxelGeometry::from_fn([2, 1, 1], |x, _, _| {
///     if x == 1 { NodeType::Solid } else { NodeType::Fluid }
/// })
/// .unwrap();
/// let mut buffer = Vec::new();
/// vtk::write_tags(&mut buffer, &geometry, 1.0).unwrap();
///
/// let text = String::from_utf8(buffer).unwrap();
/// assert!(text.contains("DIMENSIONS 2 1 1"));
/// assert!(text.ends_with("0\n1\n"));
/// ```
pub fn write_tags<W: Write>(
    sink: &mut W,
    geometry: &VoxelGeometry,
    spacing: Float,
) -> std::io::Result<()> {
    let n = geometry.get_n();
    let node_types = geometry.get_node_types();
    write_header(sink, "lbperm porous medium", n, spacing)?;
    writeln!(sink, "SCALARS tag int 1")?;
    writeln!(sink, "LOOKUP_TABLE default")?;
    for i in vtk_order(n) {
        writeln!(sink, "{}", node_types[i].get_tag())?;
    }
    Ok(())
}

pub fn write_tags_file<P: AsRef<Path>>(
    path: P,
    geometry: &VoxelGeometry,
    spacing: Float,
) -> LbResult<()> {
    let mut file = BufWriter::new(File::create(path)?);
    write_tags(&mut file, geometry, spacing)?;
    file.flush()?;
    Ok(())
}

/// Velocity norm and vector, multiplied by `velocity_scale`.
pub fn write_velocity<W: Write>(
    sink: &mut W,
    n: [usize; 3],
    velocities: &[[Float; D]],
    velocity_scale: Float,
    spacing: Float,
) -> std::io::Result<()> {
    write_header(sink, "lbperm velocity", n, spacing)?;
    writeln!(sink, "SCALARS velocityNorm double 1")?;
    writeln!(sink, "LOOKUP_TABLE default")?;
    for i in vtk_order(n) {
        let norm = velocities[i].iter().map(|u_x| u_x * u_x).sum::<Float>().sqrt();
        writeln!(sink, "{:.8e}", norm * velocity_scale)?;
    }
    writeln!(sink, "VECTORS velocity double")?;
    for i in vtk_order(n) {
        let [u_x, u_y, u_z] = velocities[i].map(|u| u * velocity_scale);
        writeln!(sink, "{u_x:.8e} {u_y:.8e} {u_z:.8e}")?;
    }
    Ok(())
}

pub fn write_velocity_file<P: AsRef<Path>>(
    path: P,
    n: [usize; 3],
    velocities: &[[Float; D]],
    velocity_scale: Float,
    spacing: Float,
) -> LbResult<()> {
    let mut file = BufWriter::new(File::create(path)?);
    write_velocity(&mut file, n, velocities, velocity_scale, spacing)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_are_written_x_fastest() {
        let n = [2, 2, 1];
        let geometry = VoxelGeometry::from_fn(n, |x, y, _| {
            if x == 1 && y == 0 { Solid } else { Fluid }
        })
        .unwrap();
        let mut buffer = Vec::new();

        write_tags(&mut buffer, &geometry, 1.0).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let values = text.lines().skip(10).collect::<Vec<&str>>();
        assert_eq!(values, vec!["0", "1", "0", "0"]);
    }

    #[test]
    fn test_velocity_is_scaled() {
        let n = [1, 1, 1];
        let mut buffer = Vec::new();

        write_velocity(&mut buffer, n, &[[0.03, 0.04, 0.0]], 10.0, 100.0).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("SPACING 1e2 1e2 1e2"));
        assert!(text.contains("5.00000000e-1\n"));
        assert!(text.contains("3.00000000e-1 4.00000000e-1 0.00000000e0"));
    }
}
