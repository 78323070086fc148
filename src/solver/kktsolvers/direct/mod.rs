mod directldl;
mod kkt_assembly;

pub(crate) use directldl::*;
pub(crate) use kkt_assembly::*;
