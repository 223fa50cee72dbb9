use crate::models::{Options, RawOptions};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "style-inject.yaml";

/// Prefix for environment variables overriding file values (`STYLE_INJECT_STYLE_FOLDER`, ...).
pub const ENV_PREFIX: &str = "STYLE_INJECT";

/// Configuration manager for the injector's YAML options file.
///
/// Values are layered: the YAML file (optional) first, then `STYLE_INJECT_*` environment
/// variables on top. List options (`include_paths`, `post_process`) accept comma-separated
/// values from the environment.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    pub fn new<P: AsRef<Utf8Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    /// Load raw options from the file and environment without validating them.
    pub fn load_raw(&self) -> Result<RawOptions> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, reading options from the environment only",
                self.config_path
            );
        }

        let settings = Config::builder()
            .add_source(
                File::from(self.config_path.as_std_path())
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("include_paths")
                    .with_list_parse_key("post_process"),
            )
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let raw: RawOptions = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::info!("Loaded config from {}", self.config_path);
        Ok(raw)
    }

    /// Load and validate options.
    pub fn load_options(&self) -> Result<Options> {
        let raw = self.load_raw()?;
        Options::from_raw(raw)
            .with_context(|| format!("Invalid options in {}", self.config_path))
    }

    pub fn save_raw(&self, raw: &RawOptions) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(raw).context("Failed to serialize options to YAML")?;

        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent))?;
        }

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Write a starter config file if none exists yet.
    ///
    /// Returns `false` when a file is already present and was left untouched.
    pub fn write_template(&self) -> Result<bool> {
        if self.config_path.exists() {
            tracing::debug!("Config already exists at {}, not overwriting", self.config_path);
            return Ok(false);
        }

        self.save_raw(&RawOptions::template())?;
        Ok(true)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}
