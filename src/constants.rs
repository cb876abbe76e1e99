//! Common constants used throughout cascade.

/// Default name of the root site configuration file.
pub const SITE_CONFIG_FILE: &str = "_site_config.yaml";

/// Per-directory configuration file names, tried in order.
pub const DIR_CONFIG_FILES: [&str; 3] = ["_config.yaml", "_config.yml", "_config.json"];

/// Extension of sources that go through the markdown pass.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Extension given to rendered markdown output.
pub const HTML_EXTENSION: &str = "html";
