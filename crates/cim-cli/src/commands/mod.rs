//! CLI command implementations

pub(crate) mod catalog;
pub(crate) mod common;
pub(crate) mod migrate;
pub(crate) mod status;
pub(crate) mod validate;
