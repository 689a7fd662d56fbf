//! KDL configuration parser

use std::path::Path;

use crate::error::ConfigError;
use crate::model::{Config, Setting};

/// Load the configuration file from the given path.
///
/// A missing file is not an error: every option has a default, so the daemon
/// runs with an all-auto configuration.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!("No configuration file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse configuration from a string
pub fn parse_config_str(content: &str) -> Result<Config, ConfigError> {
    let doc: kdl::KdlDocument = content.parse().map_err(|e: kdl::KdlError| {
        // Convert span from kdl's miette version to our miette version
        let offset = e.span.offset();
        let len = e.span.len();
        let span = miette::SourceSpan::from((offset, len));
        ConfigError::ParseError {
            src: content.to_string(),
            span,
            source: e,
        }
    })?;

    let mut config = Config::default();

    for node in doc.nodes() {
        match node.name().value() {
            "device" => {
                config.device = Setting::from(string_arg(node)?.as_str());
            }
            "terminal" => {
                config.terminal = string_arg(node)?;
            }
            "claude-path" => {
                config.claude_path = Setting::from(string_arg(node)?.as_str());
            }
            "user" => {
                config.user = Setting::from(string_arg(node)?.as_str());
            }
            "display" => {
                config.display = string_arg(node)?;
            }
            name => {
                tracing::warn!("Unknown config option: {}", name);
            }
        }
    }

    Ok(config)
}

/// Extract the single string argument of a flat config node
fn string_arg(node: &kdl::KdlNode) -> Result<String, ConfigError> {
    node.entries()
        .first()
        .and_then(|entry| entry.value().as_string())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingValue {
            option: node.name().value().to_string(),
        })
}
