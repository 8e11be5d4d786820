//! Command-line front end for the clinic core.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod settings;
pub mod summary;
