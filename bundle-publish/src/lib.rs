pub mod cli;
pub mod load_config;
pub mod upload;

pub use cli::{exit_code, is_abort, run, Cli, Commands};
