pub type Float = f64;

pub const DELTA_T: Float = 1.0;

pub const LATTICE_DENSITY: Float = 1.0;

pub const CS_2_INV: Float = 3.0;

pub const CS_4_INV: Float = 9.0;

pub const MAX_ITERATIONS: usize = 30000;

pub const SNAPSHOT_INTERVAL: usize = 500;

pub const PROGRESS_INTERVAL: usize = 20;

pub const CHECK_INTERVAL: usize = 100;

pub const OMEGA: Float = 1.0;

pub const TRACER_VELOCITY: Float = 1.0;

pub const TRACER_LENGTH: Float = 1000.0;

pub const TRACER_TOLERANCE: Float = 1e-4;

/// Dynamic viscosity of water, in Pa.s.
pub const WATER_VISCOSITY: Float = 1e-3;

/// Smallest `|mean velocity| / pressure gradient` counted as flow.
pub const NO_FLOW_RATIO: Float = 1e-9;

pub const ISO_LEVEL: Float = 0.5;
