//! Integration tests for StyleModuleInjector
//!
//! These tests run full passes over a real style folder with a stand-in compiler that
//! returns each source file's contents as CSS. They verify:
//! - Per-file outcomes (injected, no module, empty CSS, no region, compile failure)
//! - CSS side output and the default post-processing stages
//! - Fatal handling of a missing style folder
//! - Triggering a pass through the hook registry

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::sync::Arc;
use style_inject::services::compiler::{CompileOptions, StyleCompiler};
use style_inject::services::{AUTOGENERATED_NOTICE, OsFileSystem};
use style_inject::{
    HookRegistry, InjectError, Options, RawOptions, StyleModuleInjector, TransformKind,
};
use tempfile::TempDir;

const EMPTY_REGION: &str = "/*inject_start{scss}*//*inject_end{scss}*/";

/// Treats sources as plain CSS. A source containing `@error` fails to compile.
struct PassthroughCompiler;

#[async_trait]
impl StyleCompiler for PassthroughCompiler {
    async fn compile(
        &self,
        source: &Utf8Path,
        _options: &CompileOptions,
    ) -> Result<String, InjectError> {
        let css = tokio::fs::read_to_string(source)
            .await
            .map_err(|e| InjectError::Compile {
                path: source.to_path_buf(),
                message: e.to_string(),
            })?;

        if css.contains("@error") {
            return Err(InjectError::Compile {
                path: source.to_path_buf(),
                message: "explicit @error".to_string(),
            });
        }
        Ok(css)
    }
}

struct Project {
    _temp_dir: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("scss")).unwrap();
        fs::create_dir_all(root.join("modules")).unwrap();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    fn style(&self, name: &str, contents: &str) -> &Self {
        fs::write(self.root.join("scss").join(name), contents).unwrap();
        self
    }

    fn module(&self, name: &str, contents: &str) -> &Self {
        fs::write(self.root.join("modules").join(name), contents).unwrap();
        self
    }

    fn read_module(&self, name: &str) -> String {
        fs::read_to_string(self.root.join("modules").join(name)).unwrap()
    }

    fn raw_options(&self) -> RawOptions {
        let mut raw = RawOptions::new(
            self.root.join("scss").as_str(),
            self.root.join("modules").as_str(),
            r"\.scss$",
        );
        raw.polymer_version = Some(3.0);
        raw.post_process = Some(Vec::new());
        raw
    }

    fn injector(&self, raw: RawOptions) -> StyleModuleInjector {
        StyleModuleInjector::with_components(
            Options::from_raw(raw).unwrap(),
            Arc::new(PassthroughCompiler),
            Arc::new(OsFileSystem),
        )
        .unwrap()
    }
}

fn region(css: &str) -> String {
    format!(
        "/*inject_start{{scss}}*/\n{}\n{}/*inject_end{{scss}}*/",
        AUTOGENERATED_NOTICE, css
    )
}

#[tokio::test]
async fn test_full_pass_outcomes() {
    let project = Project::new();
    project
        .style("card.scss", ".card{color:red}")
        .module("card.js", EMPTY_REGION)
        .style("orphan.scss", ".orphan{}")
        .style("broken.scss", "@error 'nope';")
        .module("broken.js", EMPTY_REGION)
        .style("empty.scss", "")
        .module("empty.js", EMPTY_REGION)
        .style("plain.scss", ".plain{}")
        .module("plain.js", "no markers here")
        .style("notes.txt", "not a stylesheet");

    let summary = project
        .injector(project.raw_options())
        .convert_and_inject()
        .await
        .unwrap();

    assert_eq!(summary.matched, 5);
    assert_eq!(summary.injected, 1);
    assert_eq!(summary.missing_targets, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.empty_payloads, 1);
    assert_eq!(summary.regions_not_found, 1);
    assert!(!summary.is_clean());

    assert_eq!(project.read_module("card.js"), region(".card{color:red}"));
    assert_eq!(project.read_module("broken.js"), EMPTY_REGION);
    assert_eq!(project.read_module("empty.js"), EMPTY_REGION);
    assert_eq!(project.read_module("plain.js"), "no markers here");
    assert!(!project.root.join("modules/orphan.js").exists());
}

#[tokio::test]
async fn test_nested_sources_map_to_flat_module_folder() {
    let project = Project::new();
    fs::create_dir_all(project.root.join("scss/components")).unwrap();
    fs::write(project.root.join("scss/components/button.scss"), ".btn{}").unwrap();
    project.module("button.js", EMPTY_REGION);

    let summary = project
        .injector(project.raw_options())
        .convert_and_inject()
        .await
        .unwrap();

    assert_eq!(summary.injected, 1);
    assert_eq!(project.read_module("button.js"), region(".btn{}"));
}

#[tokio::test]
async fn test_polymer_two_targets_html() {
    let project = Project::new();
    project
        .style("card.scss", ".card{}")
        .module("card.html", EMPTY_REGION)
        .module("card.js", EMPTY_REGION);

    let mut raw = project.raw_options();
    raw.polymer_version = Some(2.0);
    project.injector(raw).convert_and_inject().await.unwrap();

    assert_eq!(project.read_module("card.html"), region(".card{}"));
    assert_eq!(project.read_module("card.js"), EMPTY_REGION);
}

#[tokio::test]
async fn test_css_side_output() {
    let project = Project::new();
    project
        .style("card.scss", ".card{color:red}")
        .module("card.js", EMPTY_REGION);

    let css_folder = project.root.join("dist/css");
    let mut raw = project.raw_options();
    raw.css_folder = Some(css_folder.to_string());

    project.injector(raw).convert_and_inject().await.unwrap();

    assert_eq!(
        fs::read_to_string(css_folder.join("card.css")).unwrap(),
        ".card{color:red}"
    );
}

#[tokio::test]
async fn test_default_post_processing() {
    let project = Project::new();
    project
        .style("card.scss", ".card{hyphens:auto;background:url(img/bg.png)}")
        .module("card.js", EMPTY_REGION);

    let mut raw = project.raw_options();
    raw.post_process = None;
    let injector = project.injector(raw);
    assert_eq!(
        injector.options().post_process,
        vec![TransformKind::Autoprefix, TransformKind::RebaseUrls]
    );

    injector.convert_and_inject().await.unwrap();

    assert_eq!(
        project.read_module("card.js"),
        region(".card{-webkit-hyphens:auto;-ms-hyphens:auto;hyphens:auto;background:url(../scss/img/bg.png)}")
    );
}

#[tokio::test]
async fn test_repeated_passes_are_stable() {
    let project = Project::new();
    project
        .style("card.scss", ".card{}")
        .module("card.js", &format!("<style>{}</style>", EMPTY_REGION));

    let injector = project.injector(project.raw_options());
    injector.convert_and_inject().await.unwrap();
    let first = project.read_module("card.js");
    injector.convert_and_inject().await.unwrap();

    assert_eq!(project.read_module("card.js"), first);
    assert_eq!(first, format!("<style>{}</style>", region(".card{}")));
}

#[tokio::test]
async fn test_missing_style_folder_is_fatal() {
    let project = Project::new();
    let mut raw = project.raw_options();
    raw.style_folder = Some(project.root.join("missing").to_string());

    let result = project.injector(raw).convert_and_inject().await;

    match result {
        Err(e @ InjectError::InvalidRoot(_)) => assert!(e.is_fatal()),
        other => panic!("expected InvalidRoot, got {:?}", other),
    }
}

#[tokio::test]
async fn test_hook_trigger_runs_pass() {
    let project = Project::new();
    project
        .style("card.scss", ".card{}")
        .module("card.js", EMPTY_REGION);

    let mut raw = project.raw_options();
    raw.webpack_hook = Some("emit".to_string());
    let injector = Arc::new(project.injector(raw));

    let mut registry = HookRegistry::new();
    Arc::clone(&injector).apply(&mut registry);

    assert_eq!(registry.trigger("run").await.unwrap(), 0);
    assert_eq!(project.read_module("card.js"), EMPTY_REGION);

    assert_eq!(registry.trigger("emit").await.unwrap(), 1);
    assert_eq!(project.read_module("card.js"), region(".card{}"));
}

#[tokio::test]
async fn test_hook_trigger_reports_fatal_pass() {
    let project = Project::new();
    let mut raw = project.raw_options();
    raw.style_folder = Some(project.root.join("missing").to_string());

    let mut registry = HookRegistry::new();
    Arc::new(project.injector(raw)).apply(&mut registry);

    let err = registry.trigger("run").await.unwrap_err();
    assert!(format!("{:#}", err).contains("StyleModuleInjectPlugin failed during 'run' phase"));
}
