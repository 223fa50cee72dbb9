//! Post-processing of compiled CSS.
//!
//! A [`Pipeline`] is an ordered list of [`CssTransform`] stages. Stages run in the order they
//! were added; the first failing stage aborts the pipeline with `PostProcess`.

use crate::error::InjectError;
use crate::models::TransformKind;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use regex::{Captures, Regex};

/// Where the CSS came from and where it is going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessContext {
    /// The stylesheet source the CSS was compiled from.
    pub from: Utf8PathBuf,
    /// The style module the CSS will be injected into.
    pub to: Utf8PathBuf,
}

impl ProcessContext {
    pub fn new(from: impl Into<Utf8PathBuf>, to: impl Into<Utf8PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

pub trait CssTransform: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, css: &str, context: &ProcessContext) -> Result<String, InjectError>;
}

#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn CssTransform>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the built-in stages, in the given order.
    pub fn from_kinds(kinds: &[TransformKind]) -> Self {
        let mut pipeline = Self::new();
        for kind in kinds {
            match kind {
                TransformKind::Autoprefix => pipeline.push(Box::new(Autoprefixer::new())),
                TransformKind::RebaseUrls => pipeline.push(Box::new(UrlRebaser::new())),
            }
        }
        pipeline
    }

    pub fn push(&mut self, stage: Box<dyn CssTransform>) {
        self.stages.push(stage);
    }

    pub fn with_stage(mut self, stage: impl CssTransform + 'static) -> Self {
        self.push(Box::new(stage));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn process(&self, css: &str, context: &ProcessContext) -> Result<String, InjectError> {
        let mut css = css.to_string();
        for stage in &self.stages {
            css = stage.apply(&css, context)?;
            tracing::trace!("Applied {} to {}", stage.name(), context.from);
        }
        Ok(css)
    }
}

/// Properties that still ship behind vendor prefixes, with the prefixes to add.
const PREFIXED_PROPERTIES: &[(&str, &[&str])] = &[
    ("user-select", &["-webkit-", "-moz-", "-ms-"]),
    ("appearance", &["-webkit-", "-moz-"]),
    ("backdrop-filter", &["-webkit-"]),
    ("text-size-adjust", &["-webkit-", "-moz-", "-ms-"]),
    ("hyphens", &["-webkit-", "-ms-"]),
    ("mask-image", &["-webkit-"]),
    ("box-decoration-break", &["-webkit-"]),
    ("tab-size", &["-moz-"]),
];

/// Inserts vendor-prefixed copies in front of declarations that need them.
///
/// A prefix already declared in the same rule block is not added again.
pub struct Autoprefixer {
    declaration: Regex,
}

impl Autoprefixer {
    pub fn new() -> Self {
        let properties: Vec<&str> = PREFIXED_PROPERTIES.iter().map(|(p, _)| *p).collect();
        let pattern = format!(
            r#"(?P<lead>[{{;]\s*)(?P<prop>{})\s*:(?P<value>(?:"[^"]*"|'[^']*'|\([^)]*\)|[^;{{}}"'(])*)"#,
            properties.join("|")
        );
        Self {
            declaration: Regex::new(&pattern).expect("Invalid autoprefixer regex"),
        }
    }

    fn prefixes_for(property: &str) -> &'static [&'static str] {
        PREFIXED_PROPERTIES
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, prefixes)| *prefixes)
            .unwrap_or(&[])
    }
}

impl Default for Autoprefixer {
    fn default() -> Self {
        Self::new()
    }
}

impl CssTransform for Autoprefixer {
    fn name(&self) -> &str {
        "autoprefix"
    }

    fn apply(&self, css: &str, _context: &ProcessContext) -> Result<String, InjectError> {
        let prefixed = self.declaration.replace_all(css, |caps: &Captures| {
            let whole = &caps[0];
            let lead = &caps["lead"];
            let property = &caps["prop"];
            let value = caps["value"].trim_end();
            let start = caps.get(0).map_or(0, |m| m.start());

            let block_start = css[..=start].rfind('{').map_or(0, |i| i + 1);
            let block_end = css[start + 1..]
                .find('}')
                .map_or(css.len(), |i| start + 1 + i);
            let block = &css[block_start..block_end];
            let indent = &lead[1..];

            let mut out = String::from(lead);
            for prefix in Self::prefixes_for(property) {
                let prefixed_property = format!("{}{}", prefix, property);
                if block.contains(&prefixed_property) {
                    continue;
                }
                out.push_str(&format!("{}:{};{}", prefixed_property, value, indent));
            }
            out.push_str(&whole[lead.len()..]);
            out
        });

        Ok(prefixed.into_owned())
    }
}

/// Rewrites relative `url(...)` references so they resolve from the style module's directory.
pub struct UrlRebaser {
    url: Regex,
}

impl UrlRebaser {
    pub fn new() -> Self {
        Self {
            url: Regex::new(
                r#"url\(\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^'"\s)][^)\s]*))\s*\)"#,
            )
            .expect("Invalid url regex"),
        }
    }
}

impl Default for UrlRebaser {
    fn default() -> Self {
        Self::new()
    }
}

impl CssTransform for UrlRebaser {
    fn name(&self) -> &str {
        "rebase-urls"
    }

    fn apply(&self, css: &str, context: &ProcessContext) -> Result<String, InjectError> {
        let from_dir = context.from.parent().unwrap_or(Utf8Path::new(""));
        let to_dir = context.to.parent().unwrap_or(Utf8Path::new(""));

        let rebased = self.url.replace_all(css, |caps: &Captures| {
            let (quote, url) = if let Some(m) = caps.name("dq") {
                ("\"", m.as_str())
            } else if let Some(m) = caps.name("sq") {
                ("'", m.as_str())
            } else {
                ("", caps.name("bare").map_or("", |m| m.as_str()))
            };

            match rebase_url(url, from_dir, to_dir) {
                Some(rebased) => format!("url({}{}{})", quote, rebased, quote),
                None => caps[0].to_string(),
            }
        });

        Ok(rebased.into_owned())
    }
}

/// Re-express `url` (relative to `from_dir`) relative to `to_dir`.
///
/// Returns `None` for URLs that must be left alone: absolute paths, anything with a scheme,
/// protocol-relative and fragment-only references, or when no relative path exists.
pub fn rebase_url(url: &str, from_dir: &Utf8Path, to_dir: &Utf8Path) -> Option<String> {
    if url.is_empty() || url.starts_with('/') || url.starts_with('#') {
        return None;
    }
    if url.split('/').next().is_some_and(|segment| segment.contains(':')) {
        return None;
    }

    let (path, suffix) = match url.find(['?', '#']) {
        Some(i) => url.split_at(i),
        None => (url, ""),
    };

    let resolved = from_dir.join(path);
    let relative = relative_path(&resolved, to_dir)?;
    Some(format!("{}{}", relative, suffix))
}

/// Lexical relative path from `base` to `target`, `/`-separated.
fn relative_path(target: &Utf8Path, base: &Utf8Path) -> Option<String> {
    let (target_root, target) = normalize(target);
    let (base_root, base) = normalize(base);
    if target_root != base_root {
        return None;
    }

    let common = target
        .iter()
        .zip(&base)
        .take_while(|(t, b)| t == b)
        .count();

    // Climbing out of a base that itself starts with `..` needs directory names we don't have.
    if base[common..].iter().any(|part| part == "..") {
        return None;
    }

    let mut parts: Vec<&str> = vec![".."; base.len() - common];
    parts.extend(target[common..].iter().map(String::as_str));
    Some(parts.join("/"))
}

fn normalize(path: &Utf8Path) -> (String, Vec<String>) {
    let mut root = String::new();
    let mut parts: Vec<String> = Vec::new();

    for component in path.components() {
        match component {
            Utf8Component::Prefix(prefix) => root.push_str(prefix.as_str()),
            Utf8Component::RootDir => root.push('/'),
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if parts.last().is_some_and(|last| last != "..") {
                    parts.pop();
                } else if root.is_empty() {
                    parts.push("..".to_string());
                }
            }
            Utf8Component::Normal(name) => parts.push(name.to_string()),
        }
    }

    (root, parts)
}
