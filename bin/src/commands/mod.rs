//! CLI command implementations.

pub(crate) mod history_start;
pub(crate) mod list;
pub(crate) mod sync;
