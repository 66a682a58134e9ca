// ------------------------------------------------------------------------------- MODULES

pub mod d3q19;

// ------------------------------------------------------------------------------- IMPORTS

use crate::constants::Float;
use crate::{BoundaryFace, FACES};

pub use d3q19::{C, D, Q, Q_BAR, W};

// ----------------------------------------------------------------------------- FUNCTIONS

/// # Examples
/// ```
/// # use lbperm::velocity_set;
/// assert_eq!(velocity_set::get_opposite_direction(0), 0);
/// assert_eq!(velocity_set::get_opposite_direction(1), 2);
/// assert_eq!(velocity_set::get_opposite_direction(14), 13);
/// ```
pub fn get_opposite_direction(direction: usize) -> usize {
    Q_BAR[direction]
}

/// # Examples
/// ```
/// # use lbperm::velocity_set;
/// # use lbperm::BoundaryFace;
/// assert_eq!(velocity_set::get_face_normal_direction(&BoundaryFace::West), 1);
/// assert_eq!(velocity_set::get_face_normal_direction(&BoundaryFace::East), 2);
/// ```
pub fn get_face_normal_direction(boundary_face: &BoundaryFace) -> usize {
    FACES
        .iter()
        .zip(d3q19::FACE_NORMAL_DIRECTIONS.iter())
        .find(|(face, _)| *face == boundary_face)
        .map(|(_, &i)| i)
        .unwrap_or_else(|| unreachable!("Every face has a normal direction"))
}
