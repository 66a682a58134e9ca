// ------------------------------------------------------------------------------- MODULES

pub mod iso_surface;
mod reader;

// ------------------------------------------------------------------------------- IMPORTS

use crate::prelude_crate::*;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

// ------------------------------------------------------------------------ STRUCT: Domain

/// Inclusive box of cell indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub x0: usize,
    pub x1: usize,
    pub y0: usize,
    pub y1: usize,
    pub z0: usize,
    pub z1: usize,
}

impl Domain {
    pub fn new(x0: usize, x1: usize, y0: usize, y1: usize, z0: usize, z1: usize) -> Self {
        Domain {
            x0,
            x1,
            y0,
            y1,
            z0,
            z1,
        }
    }

    pub fn from_n(n: [usize; 3]) -> Self {
        Domain::new(0, n[0] - 1, 0, n[1] - 1, 0, n[2] - 1)
    }

    /// # Examples
    /// ```
    /// # use lbperm::geometry::Domain;
    /// let domain = Domain::from_n([10, 8, 6]);
    ///
    /// assert_eq!(domain.shrink(1), Some(Domain::new(1, 8, 1, 6, 1, 4)));
    /// assert_eq!(domain.shrink(3), None);
    /// ```
    pub fn shrink(&self, amount: usize) -> Option<Self> {
        self.shrink_x(amount)?.shrink_yz(amount)
    }

    pub fn shrink_x(&self, amount: usize) -> Option<Self> {
        let (x0, x1) = shrink_range(self.x0, self.x1, amount)?;
        Some(Domain { x0, x1, ..*self })
    }

    fn shrink_yz(&self, amount: usize) -> Option<Self> {
        let (y0, y1) = shrink_range(self.y0, self.y1, amount)?;
        let (z0, z1) = shrink_range(self.z0, self.z1, amount)?;
        Some(Domain {
            y0,
            y1,
            z0,
            z1,
            ..*self
        })
    }

    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        (self.x0..=self.x1).contains(&x)
            && (self.y0..=self.y1).contains(&y)
            && (self.z0..=self.z1).contains(&z)
    }

    pub fn is_empty(&self) -> bool {
        self.x0 > self.x1 || self.y0 > self.y1 || self.z0 > self.z1
    }

    /// Zero for an inverted box.
    pub fn get_number_of_cells(&self) -> usize {
        (self.x1 + 1).saturating_sub(self.x0)
            * (self.y1 + 1).saturating_sub(self.y0)
            * (self.z1 + 1).saturating_sub(self.z0)
    }
}

fn shrink_range(start: usize, end: usize, amount: usize) -> Option<(usize, usize)> {
    let start = start + amount;
    let end = end.checked_sub(amount)?;
    (start <= end).then_some((start, end))
}

// ----------------------------------------------------------------- STRUCT: VoxelGeometry

/// Tag grid of the porous medium, stored x-major so one X-layer is contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGeometry {
    n: [usize; 3],
    node_types: Vec<NodeType>,
}

impl VoxelGeometry {
    pub fn new(n: [usize; 3], node_types: Vec<NodeType>) -> LbResult<Self> {
        if n.iter().any(|&n_x| n_x == 0) {
            return Err(LbError::InvalidArguments(format!(
                "Grid dimensions must be positive, got {n:?}"
            )));
        }
        let num_nodes = n.iter().product::<usize>();
        if num_nodes != node_types.len() {
            return Err(LbError::InvalidArguments(format!(
                "Number of nodes ({num_nodes}) does not match the length of node types ({})",
                node_types.len()
            )));
        }
        Ok(VoxelGeometry { n, node_types })
    }

    /// # Examples
    /// ```
    /// # use lbperm::geometry::VoxelGeometry;
    /// # use lbperm::NodeType;
    /// let geometry = VoxelGeometry::from_fn([4, 3, 2], |x, _, _| {
    ///     if x == 2 { NodeType::Solid } else { NodeType::Fluid }
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(geometry.get_node_type(2, 1, 1), NodeType::Solid);
    /// assert_eq!(geometry.get_node_type(1, 2, 0), NodeType::Fluid);
    /// assert_eq!(geometry.count(NodeType::Solid), 6);
    /// ```
    pub fn from_fn<F>(n: [usize; 3], node_type: F) -> LbResult<Self>
    where
        F: Fn(usize, usize, usize) -> NodeType,
    {
        let node_types = (0..n[0])
            .flat_map(|x| (0..n[1]).flat_map(move |y| (0..n[2]).map(move |z| (x, y, z))))
            .map(|(x, y, z)| node_type(x, y, z))
            .collect::<Vec<NodeType>>();
        VoxelGeometry::new(n, node_types)
    }

    pub fn only_fluid(n: [usize; 3]) -> LbResult<Self> {
        VoxelGeometry::from_fn(n, |_, _, _| Fluid)
    }

    pub fn from_path<P>(path: P, n: [usize; 3]) -> LbResult<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LbError::GeometrySourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        reader::parse_slices(BufReader::new(file), n).map_err(|error| match error {
            LbError::Io(source) => LbError::GeometrySourceUnavailable {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Reads `nx` slices of `ny x nz` tags, in increasing X order.
    ///
    /// # Examples
    /// ```
    /// # use lbperm::geometry::VoxelGeometry;
    /// # use lbperm::NodeType;
    /// let source = "0 1\n2 0\n\n1 1\n0 0\n";
    /// let geometry = VoxelGeometry::read(source.as_bytes(), [2, 2, 2]).unwrap();
    ///
    /// assert_eq!(geometry.get_node_type(0, 0, 1), NodeType::Solid);
    /// assert_eq!(geometry.get_node_type(0, 1, 0), NodeType::Inactive);
    /// assert_eq!(geometry.get_node_type(1, 0, 0), NodeType::Solid);
    /// assert_eq!(geometry.get_node_type(1, 1, 1), NodeType::Fluid);
    /// ```
    pub fn read<R>(source: R, n: [usize; 3]) -> LbResult<Self>
    where
        R: Read,
    {
        reader::parse_slices(BufReader::new(source), n)
    }

    /// Writes the grid in the format accepted by `read`.
    pub fn write_slices<W>(&self, mut sink: W) -> std::io::Result<()>
    where
        W: Write,
    {
        let [nx, ny, nz] = self.n;
        for x in 0..nx {
            for y in 0..ny {
                let line = (0..nz)
                    .map(|z| self.get_node_type(x, y, z).get_tag().to_string())
                    .collect::<Vec<String>>()
                    .join(" ");
                writeln!(sink, "{line}")?;
            }
            writeln!(sink)?;
        }
        Ok(())
    }
}

impl VoxelGeometry {
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
        self.node_types.len()
    }

    /// # Examples
    /// ```
    /// # use lbperm::geometry::VoxelGeometry;
    /// let geometry = VoxelGeometry::only_fluid([4, 3, 2]).unwrap();
    ///
    /// assert_eq!(geometry.get_index(0, 0, 0), 0);
    /// assert_eq!(geometry.get_index(0, 0, 1), 1);
    /// assert_eq!(geometry.get_index(0, 1, 0), 2);
    /// assert_eq!(geometry.get_index(1, 0, 0), 6);
    /// assert_eq!(geometry.get_coordinates(23), [3, 2, 1]);
    /// ```
    pub fn get_index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.n[1] + y) * self.n[2] + z
    }

    pub fn get_coordinates(&self, i: usize) -> [usize; 3] {
        let z = i % self.n[2];
        let y = (i / self.n[2]) % self.n[1];
        let x = i / (self.n[1] * self.n[2]);
        [x, y, z]
    }

    pub fn get_node_type(&self, x: usize, y: usize, z: usize) -> NodeType {
        self.node_types[self.get_index(x, y, z)]
    }

    pub fn get_node_types(&self) -> &[NodeType] {
        &self.node_types
    }

    pub fn get_bounding_box(&self) -> Domain {
        Domain::from_n(self.n)
    }

    /// Fails unless `domain` is a non-empty box inside the grid.
    ///
    /// # Examples
    /// ```
    /// # use lbperm::geometry::{Domain, VoxelGeometry};
    /// let geometry = VoxelGeometry::only_fluid([4, 4, 4]).unwrap();
    ///
    /// assert!(geometry.check_domain(&Domain::new(1, 3, 0, 3, 2, 2)).is_ok());
    /// assert!(geometry.check_domain(&Domain::new(0, 4, 0, 3, 0, 3)).is_err());
    /// assert!(geometry.check_domain(&Domain::new(3, 1, 0, 3, 0, 3)).is_err());
    /// ```
    pub fn check_domain(&self, domain: &Domain) -> LbResult<()> {
        let [nx, ny, nz] = self.n;
        if domain.is_empty() || domain.x1 >= nx || domain.y1 >= ny || domain.z1 >= nz {
            return Err(LbError::InvalidArguments(format!(
                "Domain {domain:?} is not a non-empty box inside the {nx}x{ny}x{nz} grid"
            )));
        }
        Ok(())
    }

    pub fn count(&self, node_type: NodeType) -> usize {
        self.node_types
            .par_iter()
            .filter(|&&other| other == node_type)
            .count()
    }

    pub fn get_porosity(&self) -> Float {
        self.count(Fluid) as Float / self.get_number_of_nodes() as Float
    }

    /// Tags as a scalar volume, for visualization.
    pub fn get_tag_field(&self) -> Vec<Float> {
        self.node_types
            .iter()
            .map(|node_type| node_type.get_tag() as Float)
            .collect()
    }
}
