use crate::constants::Float;

pub const D: usize = 3;

pub const Q: usize = 19;

pub const C: [[i32; D]; Q] = [
    [0, 0, 0],
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
    [1, 1, 0],
    [-1, -1, 0],
    [1, 0, 1],
    [-1, 0, -1],
    [0, 1, 1],
    [0, -1, -1],
    [1, -1, 0],
    [-1, 1, 0],
    [1, 0, -1],
    [-1, 0, 1],
    [0, 1, -1],
    [0, -1, 1],
];

pub const W: [Float; Q] = [
    1.0 / 3.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

pub const Q_BAR: [usize; Q] = [0, 2, 1, 4, 3, 6, 5, 8, 7, 10, 9, 12, 11, 14, 13, 16, 15, 18, 17];

/// Directions pointing from each face into the lattice, ordered as `FACES`.
pub const FACE_NORMAL_DIRECTIONS: [usize; 2] = [1, 2];

/// # Examples:
/// ```
/// # use lbperm::velocity_set::d3q19;
/// let f = [0.1; 19];
/// let density = f.iter().sum::<f64>();
/// let velocity = d3q19::velocity_computation(density, &f);
/// for u_x in velocity {
///     assert!(u_x.abs() < 1e-12);
/// }
///
/// //        0    1    2    3    4    5    6    7    8    9   10   11   12   13   14   15   16   17   18
/// let f = [0.1, 0.3, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.0, 0.2];
/// let velocity = d3q19::velocity_computation(2.0, &f);
/// let target = [0.1, -0.1, 0.1];
/// for (a, b) in velocity.iter().zip(target.iter()) {
///     assert!((a - b).abs() < 1e-12);
/// }
/// ```
pub fn velocity_computation(density: Float, f: &[Float]) -> [Float; D] {
    [
        (1.0 / density)
            * (f[1] - f[2] + f[7] - f[8] + f[9] - f[10] + f[13] - f[14] + f[15] - f[16]),
        (1.0 / density)
            * (f[3] - f[4] + f[7] - f[8] + f[11] - f[12] - f[13] + f[14] + f[17] - f[18]),
        (1.0 / density)
            * (f[5] - f[6] + f[9] - f[10] + f[11] - f[12] - f[15] + f[16] - f[17] + f[18]),
    ]
}
