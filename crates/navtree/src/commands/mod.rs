//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod check;
pub(crate) mod diff;
pub(crate) mod import;
pub(crate) mod search;

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;
pub(crate) use diff::DiffArgs;
pub(crate) use import::ImportArgs;
pub(crate) use search::SearchArgs;
