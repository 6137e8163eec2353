//! CLI command implementations

pub mod config;
pub mod find;
pub mod ls;
pub mod watch;
