//! Configuration parsing for keylaunch
//!
//! This crate handles parsing the KDL configuration file that tells the
//! daemon which input device to watch, which terminal to launch, and which
//! desktop user/session to launch into.

mod error;
mod model;
mod parser;

pub use error::ConfigError;
pub use model::*;
pub use parser::{load_config, parse_config_str};
