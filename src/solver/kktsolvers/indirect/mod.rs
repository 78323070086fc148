mod pcg;

pub(crate) use pcg::*;
