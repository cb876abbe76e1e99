//! Cascade is a static site builder.
//! It walks a source tree, merges per-directory configuration onto the
//! configuration inherited from the parent directory, and renders, copies or
//! renames every file into a mirrored destination tree.

/// Command-line interface module for the cascade binary
pub mod cli;

/// File and directory classification
pub mod classify;

/// Cascading site and directory configuration
/// Supports YAML and JSON documents (_site_config.yaml, _config.yaml, ...)
pub mod config;

/// Common constants
pub mod constants;

/// Error types and handling for cascade
pub mod error;

/// Logger initialization
pub mod logger;

/// Markdown to HTML conversion
pub mod markdown;

/// Template rendering with MiniJinja
pub mod renderer;

/// Source tree traversal and build orchestration
pub mod walker;

/// Output file writing
pub mod writer;

pub use walker::{generate, BuildReport, Walker};
