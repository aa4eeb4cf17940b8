pub(crate) mod safety;
