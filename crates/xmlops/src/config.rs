//! Command-line configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `XMLOPS_LOG_LEVEL` | info | Log level |
//! | `XMLOPS_ENCODING_LABEL` | gb2312 | Encoding label written by `create` |
//! | `XMLOPS_PRETTY` | false | Indent XML printed by `show` |

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use xmlops_document::{CreateOptions, is_valid_name};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Edit XML documents through path expressions.
#[derive(Debug, Clone, Parser)]
#[command(name = "xmlops")]
#[command(about = "Path-addressed XML document editor")]
pub struct CliConfig {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, env = "XMLOPS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Encoding label written into the declaration of created documents.
    #[arg(long, global = true, env = "XMLOPS_ENCODING_LABEL", default_value = "gb2312")]
    pub encoding_label: String,

    /// Indent XML printed by `show`.
    #[arg(long, global = true, env = "XMLOPS_PRETTY", default_value = "false")]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create a new document with a single root element.
    Create { file: PathBuf, root: String },

    /// Print the whole document, or the first node matching a path.
    Show { file: PathBuf, path: Option<String> },

    /// Print the children of the first node matching a path.
    Children { file: PathBuf, path: String },

    /// Add a new element with the given inner XML under a parent.
    Add {
        file: PathBuf,
        parent: String,
        name: String,
        inner: String,
    },

    /// Append an XML fragment to the content of a parent.
    Append {
        file: PathBuf,
        parent: String,
        fragment: String,
    },

    /// Remove a child node from its parent.
    Delete {
        file: PathBuf,
        parent: String,
        child: String,
    },

    /// Replace the inner XML of a node.
    Modify {
        file: PathBuf,
        path: String,
        inner: String,
    },

    /// Replace a whole node; the replacement is appended to the parent.
    Replace {
        file: PathBuf,
        path: String,
        outer: String,
    },
}

impl CliConfig {
    /// Validates the configuration, returning every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            errors.push(format!(
                "Log level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                self.log_level
            ));
        }

        if self.encoding_label.trim().is_empty() {
            errors.push("Encoding label cannot be empty".to_string());
        }

        match &self.command {
            Command::Create { root, .. } if !is_valid_name(root) => {
                errors.push(format!("`{}` is not a valid root element name", root));
            }
            Command::Add { name, .. } if !is_valid_name(name) => {
                errors.push(format!("`{}` is not a valid element name", name));
            }
            _ => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn create_options(&self) -> CreateOptions {
        CreateOptions::default().with_encoding(self.encoding_label.clone())
    }
}
