//! Site build orchestration.
//!
//! The [`Walker`] visits the source tree top-down. At each directory it merges
//! the local configuration onto the one inherited from the parent, classifies
//! every file, dispatches it to the renderer or a plain copy, and then
//! descends into the subdirectories that are not pruned by `dirs_to_skip`.
//! Per-file failures are logged, recorded in the [`BuildReport`] and never
//! stop the walk.

use crate::classify::{classify, should_skip_dir, Disposition};
use crate::config::{is_dir_config_name, load_config, load_dir_config, Config};
use crate::error::{Error, Result};
use crate::renderer::{
    output_file_name, render_source, MiniJinjaRenderer, RenderContext, TemplateRenderer,
};
use crate::writer::{read_source, write_output};
use log::{debug, info, warn};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// What happened to one file of the source tree.
#[derive(Debug)]
pub struct FileOutcome {
    /// Path relative to the source root.
    pub source: PathBuf,
    /// How the file was classified.
    pub disposition: Disposition,
    /// Destination written, `None` for skipped files, or the failure.
    pub result: Result<Option<PathBuf>>,
}

/// Per-file outcomes of a finished build, in visiting order.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub outcomes: Vec<FileOutcome>,
    /// Directory entries that could not be listed. Whatever lies below them
    /// is missing from the output.
    pub walk_errors: Vec<Error>,
}

impl BuildReport {
    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok() && pred(o)).count()
    }

    pub fn rendered(&self) -> usize {
        self.count(|o| o.disposition == Disposition::Process)
    }

    pub fn copied(&self) -> usize {
        self.count(|o| o.disposition == Disposition::Copy)
    }

    pub fn renamed(&self) -> usize {
        self.count(|o| matches!(o.disposition, Disposition::Rename(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| o.disposition == Disposition::Skip)
    }

    /// Outcomes that produced no output because something went wrong.
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// Failed files plus unreadable directory entries.
    pub fn failed(&self) -> usize {
        self.failures().count() + self.walk_errors.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Finds the outcome of a source file by its path relative to the source root.
    pub fn outcome<P: AsRef<Path>>(&self, source: P) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|o| o.source == source.as_ref())
    }
}

/// Builds `dest_dir` from `source_dir` with the default MiniJinja engine.
///
/// `site_config` is resolved against `source_dir` when relative.
///
/// # Errors
/// * `Error::MissingRootConfig` if the site configuration does not exist
/// * `Error::Io` if the source directory cannot be resolved
pub fn generate<P, Q, R>(source_dir: P, dest_dir: Q, site_config: R) -> Result<BuildReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let engine = MiniJinjaRenderer::new();
    Walker::new(&engine, source_dir, dest_dir)?.build(site_config)
}

/// Traverses a source tree and writes the mirrored output tree.
pub struct Walker<'a> {
    renderer: &'a dyn TemplateRenderer,
    source_root: PathBuf,
    dest_root: PathBuf,
}

impl<'a> Walker<'a> {
    /// Creates a walker over `source_dir` writing into `dest_dir`.
    ///
    /// # Errors
    /// * `Error::Io` if either path cannot be made absolute or the source
    ///   directory does not exist
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        renderer: &'a dyn TemplateRenderer,
        source_dir: P,
        dest_dir: Q,
    ) -> Result<Self> {
        let source_dir = source_dir.as_ref();
        let source_root =
            std::fs::canonicalize(source_dir).map_err(|e| Error::io(source_dir, e))?;
        let dest_dir = dest_dir.as_ref();
        let dest_root = std::path::absolute(dest_dir).map_err(|e| Error::io(dest_dir, e))?;
        // Only resolvable when it already exists; a missing destination
        // cannot show up in the walk anyway.
        let dest_root = std::fs::canonicalize(&dest_root).unwrap_or(dest_root);

        Ok(Self { renderer, source_root, dest_root })
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Runs the build.
    ///
    /// # Errors
    /// * `Error::MissingRootConfig` if the site configuration does not exist;
    ///   nothing is written in that case
    pub fn build<P: AsRef<Path>>(&self, site_config: P) -> Result<BuildReport> {
        let site_config_path = self.source_root.join(site_config.as_ref());
        let root_config = load_config(&site_config_path, None)?;
        let site_config_path =
            std::fs::canonicalize(&site_config_path).unwrap_or(site_config_path);

        let build = Build {
            walker: self,
            template_dirs: self.shared_template_dirs(&root_config),
            site_config_path,
        };
        info!(
            "Building '{}' into '{}'",
            self.source_root.display(),
            self.dest_root.display()
        );

        let mut report = BuildReport::default();
        build.visit(Path::new(""), &root_config, &mut report);
        Ok(report)
    }

    /// Shared template directories named by the root configuration, as
    /// absolute paths.
    fn shared_template_dirs(&self, root_config: &Config) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        match &root_config.site_template_dir {
            Some(dir) => dirs.push(self.source_root.join(dir)),
            None => warn!("No site_template_dir configured, shared templates will not resolve"),
        }
        dirs.extend(root_config.template_dirs.iter().map(|dir| self.source_root.join(dir)));
        for dir in &dirs {
            debug!("Template directory is '{}'", dir.display());
        }
        dirs
    }
}

/// State fixed for the duration of one build.
struct Build<'w, 'a> {
    walker: &'w Walker<'a>,
    template_dirs: Vec<PathBuf>,
    site_config_path: PathBuf,
}

impl Build<'_, '_> {
    fn visit(&self, rel_dir: &Path, parent: &Config, report: &mut BuildReport) {
        let dir = self.walker.source_root.join(rel_dir);
        debug!("Processing directory '{}'", dir.display());
        let config = load_dir_config(&dir, parent);

        let mut subdirs = Vec::new();
        let entries = WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let e = Error::Walk(e);
                    warn!("{e}");
                    report.walk_errors.push(e);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy();

            if entry.file_type().is_dir() {
                if should_skip_dir(&config, &name) {
                    debug!("Skipping directory '{}'", entry.path().display());
                } else if entry.path() == self.walker.dest_root {
                    debug!("Skipping destination directory '{}'", entry.path().display());
                } else {
                    subdirs.push(rel_dir.join(entry.file_name()));
                }
            } else if entry.path().is_dir() {
                debug!("Not following directory link '{}'", entry.path().display());
            } else if is_dir_config_name(&name) || entry.path() == self.site_config_path {
                debug!("Skipping configuration file '{}'", entry.path().display());
            } else {
                report.outcomes.push(self.process_file(rel_dir, entry.file_name(), &config));
            }
        }

        for subdir in subdirs {
            self.visit(&subdir, &config, report);
        }
    }

    fn process_file(&self, rel_dir: &Path, file_name: &OsStr, config: &Config) -> FileOutcome {
        let source = rel_dir.join(file_name);
        // Patterns match the displayed name, I/O keeps the raw one.
        let name = file_name.to_string_lossy();
        let disposition = classify(config, &name);
        let dest_dir = self.walker.dest_root.join(rel_dir);
        debug!("'{}': {disposition}", source.display());

        let result = match &disposition {
            Disposition::Process => self.render_file(rel_dir, file_name, config).map(Some),
            Disposition::Copy => self.copy_file(&source, &dest_dir.join(file_name)).map(Some),
            Disposition::Rename(target) => self.rename_file(&source, &dest_dir, target).map(Some),
            Disposition::Skip => Ok(None),
        };
        if let Err(e) = &result {
            warn!("{e}");
        }

        FileOutcome { source, disposition, result }
    }

    fn render_file(&self, rel_dir: &Path, file_name: &OsStr, config: &Config) -> Result<PathBuf> {
        let rel_path = rel_dir.join(file_name);
        let source_dir = self.walker.source_root.join(rel_dir);
        let dest = self.walker.dest_root.join(rel_dir).join(output_file_name(file_name));
        debug!("Processing '{}' to '{}'", rel_path.display(), dest.display());

        let bytes = read_source(source_dir.join(file_name))?;
        let mut lookup_dirs = vec![source_dir];
        lookup_dirs.extend(self.template_dirs.iter().cloned());
        let context = RenderContext::new(rel_dir, &file_name.to_string_lossy(), config);

        let output =
            render_source(self.walker.renderer, &rel_path, &bytes, &lookup_dirs, &context)?;
        write_output(&dest, &output)?;
        Ok(dest)
    }

    fn copy_file(&self, source: &Path, dest: &Path) -> Result<PathBuf> {
        debug!("Copying '{}' to '{}'", source.display(), dest.display());
        let bytes = read_source(self.walker.source_root.join(source))?;
        write_output(dest, &bytes)?;
        Ok(dest.to_path_buf())
    }

    fn rename_file(&self, source: &Path, dest_dir: &Path, target: &str) -> Result<PathBuf> {
        if !is_plain_relative(target) {
            return Err(Error::InvalidRename {
                path: source.to_path_buf(),
                target: target.to_string(),
            });
        }
        self.copy_file(source, &dest_dir.join(target))
    }
}

/// True for a non-empty relative path that stays below its base directory.
fn is_plain_relative(target: &str) -> bool {
    let path = Path::new(target);
    !target.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}
