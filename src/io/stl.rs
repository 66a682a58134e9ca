use crate::geometry::iso_surface::Triangle;
use crate::prelude_crate::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const HEADER_SIZE: usize = 80;

/// Binary STL: 80-byte header, triangle count, then per triangle the normal,
/// three vertices and a zero attribute word, little endian.
pub fn write_binary<W: Write>(sink: &mut W, triangles: &[Triangle]) -> LbResult<()> {
    let mut header = [0_u8; HEADER_SIZE];
    let title = b"lbperm iso-surface";
    header[..title.len()].copy_from_slice(title);
    sink.write_all(&header)?;
    let count = u32::try_from(triangles.len()).map_err(|_| {
        LbError::InvalidArguments(format!(
            "Too many triangles for binary STL: {}",
            triangles.len()
        ))
    })?;
    sink.write_all(&count.to_le_bytes())?;
    for triangle in triangles {
        let normal = triangle.get_normal();
        for vector in std::iter::once(&normal).chain(triangle.vertices.iter()) {
            for component in vector {
                sink.write_all(&(*component as f32).to_le_bytes())?;
            }
        }
        sink.write_all(&0_u16.to_le_bytes())?;
    }
    Ok(())
}

pub fn write_binary_file<P: AsRef<Path>>(path: P, triangles: &[Triangle]) -> LbResult<()> {
    let mut file = BufWriter::new(File::create(path)?);
    write_binary(&mut file, triangles)?;
    file.flush()?;
    Ok(())
}
