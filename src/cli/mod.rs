//! Command-line interface for deployorder

pub mod commands;
pub mod handlers;
pub mod output;
