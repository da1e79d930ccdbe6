//! HTTP request handlers.

pub(crate) mod config;
pub(crate) mod latest;
pub(crate) mod script;
