pub mod cli;
pub mod load_config;
pub mod sink;
pub mod source;

pub use cli::{run, Cli, Commands};
