use crate::error::InjectError;
use crate::hooks::{HookRegistry, PhaseHandler};
use crate::metrics::{PassMetrics, PassSummary};
use crate::models::{Options, SourceFile};
use crate::services::compiler::{CompileOptions, SassCommandCompiler, StyleCompiler};
use crate::services::fs::{FileSystem, OsFileSystem};
use crate::services::injection::InjectionEngine;
use crate::services::postprocess::{Pipeline, ProcessContext};
use crate::services::walker::StyleWalker;
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use regex::NoExpand;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Name the injector registers under in a [`HookRegistry`].
pub const PLUGIN_NAME: &str = "StyleModuleInjectPlugin";

/// What happened to one source file during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Injected,
    MissingTarget,
    NoPayload,
    RegionNotFound,
    Failed,
}

/// Compiles every stylesheet under the style folder and injects it into its style module.
///
/// One pass walks the style folder, maps each match to `module_folder/<name><module ext>`,
/// skips sources without a module, then runs compiler, post-processing pipeline and
/// injection engine in sequence. Per-file failures are logged and the pass moves on; only a
/// missing style folder aborts it.
///
/// Passes are serialised by `pass_lock`, so two overlapping triggers never read-modify-write
/// the same module at once.
pub struct StyleModuleInjector {
    options: Options,
    engine: InjectionEngine,
    compiler: Arc<dyn StyleCompiler>,
    compile_options: CompileOptions,
    pipeline: Pipeline,
    fs: Arc<dyn FileSystem>,
    pass_lock: Mutex<()>,
}

impl StyleModuleInjector {
    /// Injector backed by the `sass` executable and the real file system.
    pub fn new(options: Options) -> Result<Self, InjectError> {
        let compiler = Arc::new(SassCommandCompiler::from_options(&options));
        Self::with_components(options, compiler, Arc::new(OsFileSystem))
    }

    pub fn with_components(
        options: Options,
        compiler: Arc<dyn StyleCompiler>,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self, InjectError> {
        let engine = InjectionEngine::new(options.delimiters.clone())?;
        let pipeline = Pipeline::from_kinds(&options.post_process);
        let compile_options = CompileOptions::from_options(&options);

        Ok(Self {
            options,
            engine,
            compiler,
            compile_options,
            pipeline,
            fs,
            pass_lock: Mutex::new(()),
        })
    }

    /// Replace the pipeline built from `options.post_process`.
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn engine(&self) -> &InjectionEngine {
        &self.engine
    }

    /// `module_folder/<name with the extension match replaced by the module extension>`
    pub fn module_path_for(&self, source: &SourceFile) -> Utf8PathBuf {
        self.options
            .module_folder
            .join(self.rename(&source.name, &self.options.module_extension))
    }

    /// `css_folder/<name with the extension match replaced by .css>`, when configured.
    pub fn css_path_for(&self, source: &SourceFile) -> Option<Utf8PathBuf> {
        self.options
            .css_folder
            .as_ref()
            .map(|folder| folder.join(self.rename(&source.name, ".css")))
    }

    fn rename(&self, name: &str, extension: &str) -> String {
        self.options
            .extension
            .replace(name, NoExpand(extension))
            .into_owned()
    }

    /// Run one full pass over the style folder.
    ///
    /// # Errors
    /// Only `InvalidRoot`. Everything else is logged per file and counted in the summary.
    pub async fn convert_and_inject(&self) -> Result<PassSummary, InjectError> {
        let _pass = self.pass_lock.lock().await;

        let walker = StyleWalker::new(
            self.options.style_folder.clone(),
            self.options.extension.clone(),
        )?;
        let metrics = PassMetrics::new();

        tracing::info!(
            "Injecting styles from {} into {}",
            self.options.style_folder,
            self.options.module_folder
        );

        for item in walker.iter() {
            match item {
                Ok(source) => {
                    metrics.record_matched();
                    self.process_file(&source, &metrics).await;
                }
                Err(e) => tracing::error!("{}", e),
            }
        }

        metrics.log_summary();
        Ok(metrics.summary())
    }

    /// Compile, post-process and inject a single source file.
    pub async fn process_file(&self, source: &SourceFile, metrics: &PassMetrics) -> FileOutcome {
        let module_file = self.module_path_for(source);

        if !self.fs.exists(&module_file) {
            tracing::debug!("No style module for {} at {}", source.path, module_file);
            metrics.record_missing_target();
            return FileOutcome::MissingTarget;
        }

        let started = Instant::now();
        let compiled = self
            .compiler
            .compile(&source.path, &self.compile_options)
            .await;
        metrics.record_compile_time(started.elapsed());

        let css = match compiled {
            Ok(css) => css,
            Err(e) => {
                tracing::error!("{}", e);
                metrics.record_failed();
                return FileOutcome::Failed;
            }
        };

        let context = ProcessContext::new(source.path.clone(), module_file.clone());
        let css = match self.pipeline.process(&css, &context) {
            Ok(css) => css,
            Err(e) => {
                tracing::error!("Skipping injection of {}: {}", source.path, e);
                metrics.record_failed();
                return FileOutcome::Failed;
            }
        };

        if let Some(css_file) = self.css_path_for(source) {
            if let Err(e) = self.write_css(&css_file, &css) {
                tracing::error!("{}", e);
            }
        }

        match self.engine.inject(self.fs.as_ref(), &module_file, Some(&css)) {
            Ok(()) => {
                tracing::info!("Injected {} into {}", source.path, module_file);
                metrics.record_injected();
                FileOutcome::Injected
            }
            Err(InjectError::NoPayload(_)) => {
                tracing::debug!("{} compiled to empty CSS, nothing to inject", source.path);
                metrics.record_empty_payload();
                FileOutcome::NoPayload
            }
            Err(InjectError::RegionNotFound(_)) => {
                tracing::warn!(
                    "Tried to inject into {} but no injection comments found",
                    module_file
                );
                metrics.record_region_not_found();
                FileOutcome::RegionNotFound
            }
            Err(e) => {
                tracing::error!("{}", e);
                metrics.record_failed();
                FileOutcome::Failed
            }
        }
    }

    fn write_css(&self, css_file: &Utf8Path, css: &str) -> Result<(), InjectError> {
        let write_failed = |source| InjectError::WriteFailed {
            path: css_file.to_path_buf(),
            source,
        };

        if let Some(parent) = css_file.parent().filter(|p| !p.as_str().is_empty()) {
            self.fs.create_dir_all(parent).map_err(write_failed)?;
        }
        self.fs.write(css_file, css.as_bytes()).map_err(write_failed)?;

        tracing::debug!("Wrote {}", css_file);
        Ok(())
    }

    /// Register this injector under the configured `webpack_hook` phase.
    pub fn apply(self: Arc<Self>, registry: &mut HookRegistry) {
        let phase = self.options.webpack_hook.clone();
        registry.register(&phase, self);
    }
}

#[async_trait]
impl PhaseHandler for StyleModuleInjector {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn on_phase(&self, phase: &str) -> anyhow::Result<()> {
        tracing::debug!("{} triggered by '{}' phase", PLUGIN_NAME, phase);
        self.convert_and_inject().await?;
        Ok(())
    }
}
