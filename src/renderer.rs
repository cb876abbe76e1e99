//! Template rendering for cascade.
//! Compiles page sources with MiniJinja, resolving `extends`/`include`
//! references through an ordered list of lookup directories, and runs
//! markdown sources through the markdown pass first.
use crate::config::Config;
use crate::constants::{HTML_EXTENSION, MARKDOWN_EXTENSION};
use crate::error::{Error, Result};
use crate::markdown::markdown_to_html;
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template source with the given context.
    ///
    /// # Arguments
    /// * `name` - Name of the template, used in error messages
    /// * `source` - Template source
    /// * `lookup_dirs` - Directories searched, in order, for referenced templates
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `Result<String>` - Rendered output
    fn render(
        &self,
        name: &str,
        source: &str,
        lookup_dirs: &[PathBuf],
        context: &serde_json::Value,
    ) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
///
/// Undefined names are errors, nothing is auto-escaped and trailing newlines
/// are kept.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// # Errors
    /// * `Error::Render` if the source fails to compile, a referenced template
    ///   cannot be loaded, or rendering fails
    fn render(
        &self,
        name: &str,
        source: &str,
        lookup_dirs: &[PathBuf],
        context: &serde_json::Value,
    ) -> Result<String> {
        let mut env = self.env.clone();
        let dirs = lookup_dirs.to_vec();
        env.set_loader(move |name| load_from_dirs(&dirs, name));

        let to_error = |e: minijinja::Error| Error::Render {
            path: PathBuf::from(name),
            reason: format_error(&e),
        };
        env.add_template_owned(name.to_string(), source.to_string()).map_err(to_error)?;
        let tmpl = env.get_template(name).map_err(to_error)?;
        tmpl.render(context).map_err(to_error)
    }
}

/// Resolves a template name against the lookup directories, first hit wins.
fn load_from_dirs(
    dirs: &[PathBuf],
    name: &str,
) -> std::result::Result<Option<String>, minijinja::Error> {
    let Some(relative) = template_path(name) else {
        return Ok(None);
    };
    for dir in dirs {
        let path = dir.join(&relative);
        if path.is_file() {
            return std::fs::read_to_string(&path).map(Some).map_err(|e| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template '{}'", path.display()),
                )
                .with_source(e)
            });
        }
    }
    Ok(None)
}

/// Turns a `/`-separated template name into a relative path.
///
/// Returns `None` for names that would escape the lookup directory.
fn template_path(name: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for segment in name.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            segment => path.push(segment),
        }
    }
    if path.as_os_str().is_empty() || path.is_absolute() {
        return None;
    }
    Some(path)
}

/// Formats a MiniJinja error with its template excerpt and all its causes.
fn format_error(err: &minijinja::Error) -> String {
    let mut message = format!("{err:#}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(&format!("\ncaused by: {cause:#}"));
        source = std::error::Error::source(cause);
    }
    message
}

/// Returns true if `path` is a markdown source. The extension is compared
/// case-insensitively.
pub fn is_markdown<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MARKDOWN_EXTENSION))
}

/// Returns the name a processed file is written under: markdown sources get
/// an `.html` extension, everything else keeps its name.
pub fn output_file_name<P: AsRef<Path>>(filename: P) -> PathBuf {
    let filename = filename.as_ref();
    if is_markdown(filename) {
        filename.with_extension(HTML_EXTENSION)
    } else {
        filename.to_path_buf()
    }
}

/// Values every processed page can refer to.
#[derive(Debug, Serialize)]
pub struct RenderContext<'a> {
    /// Site-relative directory URL, `/` at the root.
    pub dirname: String,
    /// Source file name.
    pub filename: String,
    /// Site-relative URL of the source file.
    pub relative_url: String,
    /// Merged configuration of the file's directory.
    pub config: &'a Config,
}

impl<'a> RenderContext<'a> {
    /// Builds the context of `filename` in `relative_dir` (relative to the
    /// source root, possibly empty or `.`).
    pub fn new<P: AsRef<Path>>(relative_dir: P, filename: &str, config: &'a Config) -> Self {
        let dir_segments: Vec<String> = relative_dir
            .as_ref()
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let dirname = format!("/{}", dir_segments.join("/"));
        let relative_url = if dir_segments.is_empty() {
            format!("/{filename}")
        } else {
            format!("{dirname}/{filename}")
        };
        Self { dirname, filename: filename.to_string(), relative_url, config }
    }

    /// Flattens the context into the value handed to the engine.
    ///
    /// `config.variables` become top-level names; the built-in names win
    /// over variables of the same name.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        for (key, value) in &self.config.variables {
            map.insert(key.clone(), value.clone());
        }
        if let serde_json::Value::Object(builtins) = serde_json::to_value(self)? {
            map.extend(builtins);
        }
        Ok(serde_json::Value::Object(map))
    }
}

/// Renders one processed file.
///
/// Markdown sources are converted to HTML before the template pass.
///
/// # Arguments
/// * `engine` - Template engine
/// * `path` - Source path relative to the source root, used to name the template
/// * `source` - Raw source bytes
/// * `lookup_dirs` - Template lookup chain, highest priority first
/// * `context` - Page context
///
/// # Errors
/// * `Error::Render` if the source is not UTF-8 or rendering fails
pub fn render_source(
    engine: &dyn TemplateRenderer,
    path: &Path,
    source: &[u8],
    lookup_dirs: &[PathBuf],
    context: &RenderContext<'_>,
) -> Result<Vec<u8>> {
    let render_error = |reason: String| Error::Render { path: path.to_path_buf(), reason };

    let text = std::str::from_utf8(source)
        .map_err(|e| render_error(format!("source is not valid UTF-8: {e}")))?;
    let body = if is_markdown(path) { markdown_to_html(text) } else { text.to_string() };
    let context = context.to_value().map_err(|e| render_error(e.to_string()))?;
    let name = path.to_string_lossy().replace('\\', "/");

    let output = engine.render(&name, &body, lookup_dirs, &context)?;
    Ok(output.into_bytes())
}
