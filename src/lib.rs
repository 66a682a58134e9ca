pub mod case;
pub mod cli;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod io;
mod kernel;
pub mod lattice;
pub mod permeability;
mod prelude_crate;
pub mod simulation;
pub mod tracer;
pub mod velocity_set;

pub mod prelude {
    pub use crate::BoundaryFace::{self, *};
    pub use crate::NodeType::{self, *};
    pub use crate::constants::*;
    pub use crate::error::{LbError, LbResult};
    pub use crate::geometry::{Domain, VoxelGeometry};
    pub use crate::lattice::boundary::PressureBoundary;
    pub use crate::lattice::{CollisionStreamStep, LatticeField};
    pub use crate::permeability::PermeabilityReport;
    pub use crate::simulation::{self, Simulation, SimulationObserver, SimulationState};
    pub use crate::tracer::ConvergenceTracer;
}

/// Faces of the lattice normal to the flow direction.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BoundaryFace {
    West = 0,
    East = 1,
}

const FACES: [BoundaryFace; 2] = [BoundaryFace::West, BoundaryFace::East];

/// Voxel tag of the input geometry.
///
/// ```
/// # use lbperm::NodeType;
/// assert_eq!(NodeType::try_from(0).unwrap(), NodeType::Fluid);
/// assert_eq!(NodeType::try_from(1).unwrap(), NodeType::Solid);
/// assert_eq!(NodeType::try_from(2).unwrap(), NodeType::Inactive);
/// assert!(NodeType::try_from(3).is_err());
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NodeType {
    Fluid = 0,
    Solid = 1,
    Inactive = 2,
}

impl TryFrom<i64> for NodeType {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(NodeType::Fluid),
            1 => Ok(NodeType::Solid),
            2 => Ok(NodeType::Inactive),
            _ => Err(value),
        }
    }
}

impl NodeType {
    pub fn get_tag(&self) -> i64 {
        *self as i64
    }
}
