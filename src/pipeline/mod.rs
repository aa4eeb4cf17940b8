//! Untrusted text to safe envelope: extract, normalize, validate, guard, stabilize, enrich.

pub(crate) mod process;
