use crate::error::InjectError;
use camino::Utf8PathBuf;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_START_COMMENT: &str = "/*inject_start{scss}*/";
pub const DEFAULT_END_COMMENT: &str = "/*inject_end{scss}*/";
pub const DEFAULT_WEBPACK_HOOK: &str = "run";
pub const DEFAULT_SASS_EXECUTABLE: &str = "sass";
pub const DEFAULT_COMPILE_TIMEOUT_SECS: u64 = 60;

/// Output style handed to the style compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    Nested,
    Expanded,
    Compact,
    #[default]
    Compressed,
}

impl OutputStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nested => "nested",
            Self::Expanded => "expanded",
            Self::Compact => "compact",
            Self::Compressed => "compressed",
        }
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post-processing stage applied to compiled CSS before injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformKind {
    Autoprefix,
    RebaseUrls,
}

/// Unvalidated options as read from YAML and the environment.
///
/// Field names follow the plugin's option names in snake_case. Everything is optional here;
/// [`Options::from_raw`] applies defaults and rejects missing required fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_folder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_folder: Option<String>,

    /// Regular expression matched against the full path of every file under `style_folder`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_paths: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_style: Option<OutputStyle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_folder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webpack_hook: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polymer_version: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_extension: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_process: Option<Vec<TransformKind>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sass_executable: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_timeout_secs: Option<u64>,
}

impl RawOptions {
    /// Raw options with only the three required fields set.
    pub fn new(
        style_folder: impl Into<String>,
        module_folder: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            style_folder: Some(style_folder.into()),
            module_folder: Some(module_folder.into()),
            extension: Some(extension.into()),
            ..Self::default()
        }
    }

    /// Starter configuration written by [`crate::ConfigManager::write_template`].
    pub fn template() -> Self {
        Self {
            include_paths: Some(Vec::new()),
            output_style: Some(OutputStyle::Compressed),
            polymer_version: Some(3.0),
            ..Self::new("./scss", "./style-modules", r"\.scss$")
        }
    }
}

/// The two literal markers delimiting an injection region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterPair {
    pub start: String,
    pub end: String,
}

impl DelimiterPair {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl Default for DelimiterPair {
    fn default() -> Self {
        Self::new(DEFAULT_START_COMMENT, DEFAULT_END_COMMENT)
    }
}

/// Validated, immutable configuration for one injector.
#[derive(Debug, Clone)]
pub struct Options {
    pub style_folder: Utf8PathBuf,
    pub module_folder: Utf8PathBuf,
    pub extension: Regex,
    pub module_extension: String,
    pub include_paths: Vec<Utf8PathBuf>,
    pub output_style: OutputStyle,
    pub css_folder: Option<Utf8PathBuf>,
    pub webpack_hook: String,
    pub delimiters: DelimiterPair,
    pub post_process: Vec<TransformKind>,
    pub sass_executable: String,
    pub compile_timeout: Duration,
}

impl Options {
    /// Validate raw options and fill in defaults.
    ///
    /// # Errors
    /// `MissingArgument` when `style_folder`, `module_folder` or `extension` is absent or
    /// blank, `InvalidPattern` when `extension` is not a valid regular expression.
    pub fn from_raw(raw: RawOptions) -> Result<Self, InjectError> {
        let style_folder = required(raw.style_folder, "style_folder")?;
        let module_folder = required(raw.module_folder, "module_folder")?;
        let extension = required(raw.extension, "extension")?;

        let extension = Regex::new(&extension).map_err(|source| InjectError::InvalidPattern {
            option: "extension",
            source,
        })?;

        let module_extension = non_blank(raw.module_extension)
            .unwrap_or_else(|| module_extension_for(raw.polymer_version).to_string());

        let delimiters = DelimiterPair::new(
            non_blank(raw.start_comment).unwrap_or_else(|| DEFAULT_START_COMMENT.to_string()),
            non_blank(raw.end_comment).unwrap_or_else(|| DEFAULT_END_COMMENT.to_string()),
        );

        Ok(Self {
            style_folder: Utf8PathBuf::from(style_folder),
            module_folder: Utf8PathBuf::from(module_folder),
            extension,
            module_extension,
            include_paths: raw
                .include_paths
                .unwrap_or_default()
                .into_iter()
                .map(Utf8PathBuf::from)
                .collect(),
            output_style: raw.output_style.unwrap_or_default(),
            css_folder: non_blank(raw.css_folder).map(Utf8PathBuf::from),
            webpack_hook: non_blank(raw.webpack_hook)
                .unwrap_or_else(|| DEFAULT_WEBPACK_HOOK.to_string()),
            delimiters,
            post_process: raw
                .post_process
                .unwrap_or_else(|| vec![TransformKind::Autoprefix, TransformKind::RebaseUrls]),
            sass_executable: non_blank(raw.sass_executable)
                .unwrap_or_else(|| DEFAULT_SASS_EXECUTABLE.to_string()),
            compile_timeout: Duration::from_secs(
                raw.compile_timeout_secs
                    .unwrap_or(DEFAULT_COMPILE_TIMEOUT_SECS),
            ),
        })
    }
}

/// Polymer 2 style modules are HTML imports, Polymer 3 moved them to JavaScript.
pub fn module_extension_for(polymer_version: Option<f64>) -> &'static str {
    match polymer_version {
        Some(version) if version.round() == 3.0 => ".js",
        _ => ".html",
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, InjectError> {
    non_blank(value).ok_or(InjectError::MissingArgument(name))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
