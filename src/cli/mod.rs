pub mod commands;
pub mod common;
pub mod progress;
pub mod brute;
pub mod dirs;
pub mod params;
pub mod inject;

pub use commands::{Cli, Commands};
pub use common::GlobalOptions;
