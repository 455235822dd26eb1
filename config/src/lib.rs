//! Configuration of the gateway
//!
//! Options are read from the command line, falling back to the environment
//! and an optional TOML config file, and parsed once into a `GatewayConfig`
//! that is passed down to the components that need it

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

mod cli;
pub mod parsing;
mod validation;

pub use cli::{Cli, GatewayConfig};
pub use parsing::{
    config_file::parse_config_from_file, parse_command_line_args, parse_config_from_arg_list,
};
