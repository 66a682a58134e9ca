pub(crate) use crate::constants::*;
pub(crate) use crate::error::{LbError, LbResult};
pub(crate) use crate::kernel;
pub(crate) use crate::velocity_set::{self, C, D, Q, Q_BAR, W};
pub(crate) use crate::{BoundaryFace, NodeType};
pub(crate) use crate::NodeType::*;
pub(crate) use rayon::prelude::*;
