//! Whole-build orchestration.
//!
//! ```text
//! clear dist/            fatal on failure
//! load .env              fatal when malformed
//! ==> Scan               image list, SP set, dimension table
//! ==> HTML               assemble → minify → dist/index.html
//! ==> CSS                minify → dist/style.min.css
//! ==> JS                 + conversion code → minify → dist/script.min.js
//! ==> Images             copy originals + AVIF/WebP siblings → dist/images/
//! ==> Favicon            images/favicon.png → dist/favicon-*.png ...
//! ```
//!
//! Every stage is isolated: a failure becomes [`StageOutcome::Failed`] in the
//! [`BuildReport`] and the next stage still runs. Only problems that make the
//! whole run meaningless (unusable output directory, invalid `lp.toml` or env
//! file) are returned as [`PipelineError`].
//!
//! Progress is reported through an optional channel of [`BuildEvent`]s so the
//! CLI can print stage headers while the build runs.

use crate::assemble::{AssembleContext, Assembled, assemble, minified_name};
use crate::config::{BuildConfig, ConfigError, load_config};
use crate::imaging::{ImageBackend, Quality};
use crate::minify::{MinifyError, minify_css, minify_html, minify_js};
use crate::process::{ProcessError, process_favicon, process_images};
use crate::scan::{
    ScanError, ScanResult, find_sp_images, list_images, load_dimensions, relative_key, scan,
};
use crate::site::{SiteError, SiteParams, load_env_file};
use crate::tags::conversion::conversion_script;
use crate::types::Warning;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Failures that abort the whole build.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Env file {path}: {source}")]
    Env { path: PathBuf, source: SiteError },
    #[error("Output directory {path}: {source}")]
    OutputDir { path: PathBuf, source: io::Error },
    #[error("Refusing to clear {0}: it contains the project or its sources")]
    UnsafeOutput(PathBuf),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Failures local to one stage. Rendered into [`StageOutcome::Failed`].
#[derive(Error, Debug)]
pub enum StageError {
    #[error("{path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Minify(#[from] MinifyError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("{0}")]
    Conversions(String),
}

/// CLI overrides for the `[paths]` section.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

/// A project root with its resolved config and locations.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: BuildConfig,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub env_file: PathBuf,
}

impl Project {
    /// Load `lp.toml` from `root` and apply CLI overrides.
    pub fn load(root: &Path, overrides: &Overrides) -> Result<Self, PipelineError> {
        let config = load_config(root)?;
        Ok(Self::from_config(root, config, overrides))
    }

    /// Relative paths resolve against `root`; absolute paths are kept.
    pub fn from_config(root: &Path, config: BuildConfig, overrides: &Overrides) -> Self {
        let resolve = |over: &Option<PathBuf>, configured: &str| {
            root.join(over.as_deref().unwrap_or(Path::new(configured)))
        };
        Self {
            root: root.to_path_buf(),
            source_dir: resolve(&overrides.source, &config.paths.source),
            output_dir: resolve(&overrides.output, &config.paths.output),
            env_file: resolve(&overrides.env_file, &config.paths.env_file),
            config,
        }
    }

    pub fn html_path(&self) -> PathBuf {
        self.source_dir.join(&self.config.paths.html)
    }

    pub fn css_path(&self) -> PathBuf {
        self.source_dir.join(&self.config.paths.css)
    }

    pub fn js_path(&self) -> PathBuf {
        self.source_dir.join(&self.config.paths.js)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.source_dir.join(&self.config.paths.images)
    }

    pub fn favicon_path(&self) -> PathBuf {
        self.images_dir().join(&self.config.paths.favicon)
    }

    /// Read the env file into typed parameters. A missing file is empty.
    ///
    /// Skipped lines and unparseable values come back as warnings; only an
    /// unreadable file is an error.
    pub fn site_params(&self) -> Result<(SiteParams, Vec<Warning>), PipelineError> {
        let (env, mut warnings) =
            load_env_file(&self.env_file).map_err(|source| PipelineError::Env {
                path: self.env_file.clone(),
                source,
            })?;
        let (params, mut value_warnings) = SiteParams::from_env(&env);
        warnings.append(&mut value_warnings);
        Ok((params, warnings))
    }

    /// Scan the image tree, or take the dimension table from `dimensions_file`.
    pub fn scan_images(
        &self,
        backend: &impl ImageBackend,
        dimensions_file: Option<&Path>,
    ) -> Result<ScanResult, ScanError> {
        let Some(table_path) = dimensions_file else {
            return scan(backend, &self.source_dir, &self.config.paths.images);
        };
        let images: Vec<String> = list_images(&self.images_dir())?
            .iter()
            .map(|path| relative_key(path, &self.source_dir))
            .collect();
        Ok(ScanResult {
            sp_images: find_sp_images(&images),
            dimensions: load_dimensions(table_path)?,
            images,
            warnings: Vec::new(),
        })
    }

    /// Assemble the page without minifying or writing it.
    pub fn assemble_page(
        &self,
        params: &SiteParams,
        scanned: &ScanResult,
    ) -> Result<Assembled, StageError> {
        let path = self.html_path();
        let source = fs::read_to_string(&path).map_err(|source| StageError::Read {
            path: path.clone(),
            source,
        })?;
        let ctx = AssembleContext {
            params,
            dimensions: &scanned.dimensions,
            sp_images: &scanned.sp_images,
            favicon: self.favicon_path().is_file(),
            css_name: &self.config.paths.css,
            js_name: &self.config.paths.js,
        };
        Ok(assemble(&source, &ctx))
    }

    /// Clear and recreate the output directory.
    fn reset_output(&self) -> Result<(), PipelineError> {
        let out = &self.output_dir;
        if out == &self.root || self.root.starts_with(out) || self.source_dir.starts_with(out) {
            return Err(PipelineError::UnsafeOutput(out.clone()));
        }
        let wrap = |source| PipelineError::OutputDir {
            path: out.clone(),
            source,
        };
        if out.exists() {
            fs::remove_dir_all(out).map_err(wrap)?;
        }
        fs::create_dir_all(out).map_err(wrap)
    }
}

/// Build stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scan,
    Html,
    Css,
    Js,
    Images,
    Favicon,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Scan => "Scan",
            Stage::Html => "HTML",
            Stage::Css => "CSS",
            Stage::Js => "JS",
            Stage::Images => "Images",
            Stage::Favicon => "Favicon",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Ok(String),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: StageOutcome,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    StageStarted(Stage),
    StageFinished(StageReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub stages: Vec<StageReport>,
}

impl BuildReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    pub fn failed(&self) -> impl Iterator<Item = &StageReport> {
        self.stages
            .iter()
            .filter(|r| matches!(r.outcome, StageOutcome::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Runs stages, collects reports and forwards progress events.
struct StageRunner<'a> {
    events: Option<&'a Sender<BuildEvent>>,
    reports: Vec<StageReport>,
}

impl StageRunner<'_> {
    fn send(&self, event: BuildEvent) {
        if let Some(tx) = self.events {
            // A dropped receiver only means nobody is printing.
            let _ = tx.send(event);
        }
    }

    fn run(
        &mut self,
        stage: Stage,
        body: impl FnOnce(&mut Vec<Warning>) -> Result<StageOutcome, StageError>,
    ) {
        self.send(BuildEvent::StageStarted(stage));
        let mut warnings = Vec::new();
        let outcome = body(&mut warnings).unwrap_or_else(|e| StageOutcome::Failed(e.to_string()));
        let report = StageReport {
            stage,
            outcome,
            warnings,
        };
        self.send(BuildEvent::StageFinished(report.clone()));
        self.reports.push(report);
    }
}

/// Run the full build.
pub fn build(
    project: &Project,
    backend: &impl ImageBackend,
    dimensions_file: Option<&Path>,
    events: Option<&Sender<BuildEvent>>,
) -> Result<BuildReport, PipelineError> {
    project.reset_output()?;
    let (params, env_warnings) = project.site_params()?;
    let minify = &project.config.minify;
    let out = &project.output_dir;

    let mut runner = StageRunner {
        events,
        reports: Vec::new(),
    };

    let mut scanned = ScanResult::default();
    runner.run(Stage::Scan, |warnings| {
        scanned = project.scan_images(backend, dimensions_file)?;
        warnings.append(&mut scanned.warnings);
        Ok(StageOutcome::Ok(format!(
            "{} images, {} with SP variant, {} measured",
            scanned.images.len(),
            scanned.sp_images.len(),
            scanned.dimensions.len()
        )))
    });

    runner.run(Stage::Html, |warnings| {
        warnings.extend(env_warnings.iter().cloned());
        let assembled = project.assemble_page(&params, &scanned)?;
        warnings.extend(assembled.warnings.iter().cloned());
        let html = if minify.html {
            minify_html(&assembled.html)?
        } else {
            assembled.html
        };
        let name = &project.config.paths.html;
        write_output(&out.join(name), &html)?;
        Ok(StageOutcome::Ok(format!(
            "{name}: {} head fragments, {} of {} images as <picture>",
            assembled.fragments.len(),
            assembled.pictures,
            assembled.images
        )))
    });

    runner.run(Stage::Css, |_| {
        let path = project.css_path();
        let Some(source) = read_optional(&path)? else {
            return Ok(StageOutcome::Skipped(format!("no {}", path.display())));
        };
        let css = if minify.css { minify_css(&source)? } else { source };
        let name = minified_name(&project.config.paths.css);
        write_output(&out.join(&name), &css)?;
        Ok(StageOutcome::Ok(name))
    });

    runner.run(Stage::Js, |_| {
        let source = read_optional(&project.js_path())?.unwrap_or_default();
        let conversion = conversion_script(&params);
        let combined = match (source.trim().is_empty(), conversion.is_empty()) {
            (true, true) => {
                return Ok(StageOutcome::Skipped(
                    "no script and no conversion tracking".to_string(),
                ));
            }
            (true, false) => conversion,
            (false, true) => source,
            (false, false) => format!("{}\n{conversion}", source.trim_end()),
        };
        let js = if minify.js {
            minify_js(&combined)?
        } else {
            combined
        };
        let name = minified_name(&project.config.paths.js);
        write_output(&out.join(&name), &js)?;
        Ok(StageOutcome::Ok(name))
    });

    runner.run(Stage::Images, |_| {
        let images_src = project.images_dir();
        if !images_src.is_dir() {
            return Ok(StageOutcome::Skipped(format!("no {}", images_src.display())));
        }
        let quality = Quality::new(project.config.images.quality);
        let report = process_images(backend, &images_src, &out.join(&project.config.paths.images), quality)?;
        if !report.failures.is_empty() {
            let details: Vec<String> = report
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.path, f.reason))
                .collect();
            return Err(StageError::Conversions(format!(
                "{} of {} conversions failed: {}",
                report.failures.len(),
                report.failures.len() + report.converted,
                details.join("; ")
            )));
        }
        Ok(StageOutcome::Ok(format!(
            "{} files copied, {} converted to AVIF + WebP",
            report.copied, report.converted
        )))
    });

    runner.run(Stage::Favicon, |_| {
        let source = project.favicon_path();
        match process_favicon(backend, &source, out)? {
            Some(icons) => Ok(StageOutcome::Ok(format!("{} icons", icons.len()))),
            None => Ok(StageOutcome::Skipped(format!("no {}", source.display()))),
        }
    });

    Ok(BuildReport {
        output_dir: out.clone(),
        stages: runner.reports,
    })
}

/// Assemble the page for the `html` command: env, scan, assemble. No writes.
pub fn assemble_only(
    project: &Project,
    backend: &impl ImageBackend,
    dimensions_file: Option<&Path>,
) -> Result<Assembled, PipelineError> {
    let (params, mut warnings) = project.site_params()?;
    let mut scanned = project.scan_images(backend, dimensions_file)?;
    let mut assembled = project.assemble_page(&params, &scanned)?;
    warnings.append(&mut scanned.warnings);
    warnings.append(&mut assembled.warnings);
    assembled.warnings = warnings;
    Ok(assembled)
}

fn read_optional(path: &Path) -> Result<Option<String>, StageError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StageError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_output(path: &Path, content: &str) -> Result<(), StageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
