//! Local optimizer used to descend into the basin of each perturbed point
mod local;

pub(crate) use local::*;
