//! Configuration handling for cascade sites.
//!
//! A site has one required root configuration file and any number of optional
//! per-directory configuration files. Each directory's effective
//! configuration is its parent's configuration with every key set by the
//! local file replaced wholesale. Nothing is ever merged below the top level.

use crate::constants::DIR_CONFIG_FILES;
use crate::error::{Error, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ordered list of shell-style glob patterns compiled into a single matcher.
///
/// Patterns are matched against bare file or directory names, never against
/// full paths. Serializes back to the plain list of patterns.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct GlobList {
    patterns: Vec<String>,
    set: GlobSet,
}

impl GlobList {
    /// Compiles the given patterns.
    ///
    /// # Errors
    /// * `Error::Glob` if any pattern is not a valid glob
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            builder.add(GlobBuilder::new(&shell_glob(pattern)).backslash_escape(false).build()?);
        }
        let set = builder.build()?;
        Ok(Self { patterns, set })
    }

    /// Returns true if any pattern matches `name`.
    pub fn is_match(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Rewrites a shell-style pattern into globset syntax.
///
/// Only `*`, `?` and closed `[...]` classes are special. Braces and a `[`
/// without a closing `]` stand for themselves.
fn shell_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut glob = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            c @ ('{' | '}') => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            '[' => {
                // A `]` right after `[` or `[!` is a member of the class.
                let mut body = i + 1;
                if chars.get(body) == Some(&'!') {
                    body += 1;
                }
                if chars.get(body) == Some(&']') {
                    body += 1;
                }
                match chars[body..].iter().position(|&c| c == ']') {
                    Some(offset) => {
                        let close = body + offset;
                        glob.extend(&chars[i..=close]);
                        i = close + 1;
                        continue;
                    }
                    None => glob.push_str("[[]"),
                }
            }
            c => glob.push(c),
        }
        i += 1;
    }
    glob
}

impl Default for GlobList {
    fn default() -> Self {
        Self { patterns: Vec::new(), set: GlobSet::empty() }
    }
}

impl PartialEq for GlobList {
    fn eq(&self, other: &Self) -> bool {
        self.patterns == other.patterns
    }
}

impl TryFrom<Vec<String>> for GlobList {
    type Error = Error;

    fn try_from(patterns: Vec<String>) -> Result<Self> {
        GlobList::new(patterns)
    }
}

impl From<GlobList> for Vec<String> {
    fn from(list: GlobList) -> Self {
        list.patterns
    }
}

/// Effective configuration of one directory.
///
/// Built once per visited directory and never mutated afterwards. The whole
/// value is exposed to templates as `config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Config {
    /// Files rendered as templates.
    pub process: GlobList,
    /// Files copied unmodified.
    pub copy: GlobList,
    /// Exact source file name to destination file name.
    pub rename: IndexMap<String, String>,
    /// Subdirectory names pruned from the traversal.
    pub dirs_to_skip: GlobList,
    /// Shared template directory, relative to the source root.
    pub site_template_dir: Option<PathBuf>,
    /// Further shared template directories, searched after `site_template_dir`.
    pub template_dirs: Vec<PathBuf>,
    /// Extra names injected into every template context.
    pub variables: IndexMap<String, serde_json::Value>,
    /// Keys cascade does not interpret itself.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// Keys set by a single configuration file.
///
/// `None` means the file did not mention the key, so the inherited value
/// survives the merge.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigOverlay {
    pub process: Option<GlobList>,
    pub copy: Option<GlobList>,
    pub rename: Option<IndexMap<String, String>>,
    pub dirs_to_skip: Option<GlobList>,
    pub site_template_dir: Option<PathBuf>,
    pub template_dirs: Option<Vec<PathBuf>>,
    pub variables: Option<IndexMap<String, serde_json::Value>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Config {
    /// Returns a copy of this configuration with every key set in `overlay`
    /// replaced wholesale.
    pub fn merge(&self, overlay: ConfigOverlay) -> Config {
        let mut merged = self.clone();
        if let Some(process) = overlay.process {
            merged.process = process;
        }
        if let Some(copy) = overlay.copy {
            merged.copy = copy;
        }
        if let Some(rename) = overlay.rename {
            merged.rename = rename;
        }
        if let Some(dirs_to_skip) = overlay.dirs_to_skip {
            merged.dirs_to_skip = dirs_to_skip;
        }
        if let Some(site_template_dir) = overlay.site_template_dir {
            merged.site_template_dir = Some(site_template_dir);
        }
        if let Some(template_dirs) = overlay.template_dirs {
            merged.template_dirs = template_dirs;
        }
        if let Some(variables) = overlay.variables {
            merged.variables = variables;
        }
        for (key, value) in overlay.extra {
            merged.extra.insert(key, value);
        }
        merged
    }
}

/// Parses configuration content into the keys it sets.
///
/// Accepts YAML and, since YAML is a superset of it, JSON. An empty or
/// comment-only document sets nothing.
///
/// # Errors
/// * A message describing why the content is not a valid configuration
pub fn parse_config(content: &str) -> std::result::Result<ConfigOverlay, String> {
    if is_blank_document(content) {
        return Ok(ConfigOverlay::default());
    }
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| format!("invalid format: {e}"))?;
    match value {
        serde_yaml::Value::Null => Ok(ConfigOverlay::default()),
        serde_yaml::Value::Mapping(_) => {
            serde_yaml::from_value(value).map_err(|e| format!("invalid schema: {e}"))
        }
        _ => Err("top level must be a mapping".to_string()),
    }
}

/// True if the document holds nothing but comments and document markers.
fn is_blank_document(content: &str) -> bool {
    content.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Reads and parses a configuration file.
///
/// # Errors
/// * `Error::MalformedConfig` if the file cannot be read or parsed
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<ConfigOverlay> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::MalformedConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_config(&content)
        .map_err(|reason| Error::MalformedConfig { path: path.to_path_buf(), reason })
}

/// Loads the configuration at `path` on top of `parent`.
///
/// * Missing file without a parent: the root configuration is required, so
///   this is the only error returned.
/// * Missing file with a parent: the parent is returned unchanged.
/// * Malformed file: a warning is logged and the parent (or an empty
///   configuration at the root) is returned.
///
/// # Errors
/// * `Error::MissingRootConfig` if `path` does not exist and `parent` is `None`
pub fn load_config<P: AsRef<Path>>(path: P, parent: Option<&Config>) -> Result<Config> {
    let path = path.as_ref();
    let base = match (path.exists(), parent) {
        (false, Some(parent)) => return Ok(parent.clone()),
        (false, None) => {
            return Err(Error::MissingRootConfig { path: path.to_path_buf() });
        }
        (true, parent) => parent.cloned().unwrap_or_default(),
    };

    debug!("Processing configuration file '{}'", path.display());
    match read_config(path) {
        Ok(overlay) => Ok(base.merge(overlay)),
        Err(e) => {
            warn!("{e}");
            Ok(base)
        }
    }
}

/// Returns the configuration file of `dir`, if it has one.
pub fn find_dir_config<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
    DIR_CONFIG_FILES.iter().map(|name| dir.as_ref().join(name)).find(|path| path.is_file())
}

/// Returns the effective configuration of `dir` given its parent's.
pub fn load_dir_config<P: AsRef<Path>>(dir: P, parent: &Config) -> Config {
    match find_dir_config(&dir) {
        // A parent is given, so loading cannot fail.
        Some(path) => load_config(path, Some(parent)).unwrap_or_else(|_| parent.clone()),
        None => parent.clone(),
    }
}

/// Returns true if `name` is one of the per-directory configuration file names.
pub fn is_dir_config_name(name: &str) -> bool {
    DIR_CONFIG_FILES.contains(&name)
}
