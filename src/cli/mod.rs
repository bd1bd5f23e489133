//! Command line interface of the gazetteer binary.

pub mod args;
pub mod commands;
pub mod output;

pub use args::*;
pub use commands::execute_command;
pub use output::*;
