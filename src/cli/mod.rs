//! Command-line interface module.

mod args;
pub mod new;
pub mod serve;

pub use args::{Cli, Commands, ServeArgs};
