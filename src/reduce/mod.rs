//! Scene-graph reducer and paint ordering.

pub(crate) mod order;
pub(crate) mod reducer;
