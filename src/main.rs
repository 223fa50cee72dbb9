//! style-inject - one-shot runner.
//!
//! Loads options from `style-inject.yaml` (or the file named by `STYLE_INJECT_CONFIG`),
//! overlays `STYLE_INJECT_*` environment variables, then compiles every stylesheet under
//! the style folder and injects it into its style module.
//!
//! # Execution Flow
//!
//! 1. Initialize logging → logs/style-inject.<date>
//! 2. Load and validate options ([`ConfigManager`])
//! 3. Build a current-thread tokio runtime
//! 4. Run one [`StyleModuleInjector::convert_and_inject`] pass
//!
//! Exits non-zero only when the configuration is invalid or the style folder is missing.
//! Per-file failures are logged and counted but do not fail the run.

use anyhow::{Context, Result};
use style_inject::config::DEFAULT_CONFIG_FILE;
use style_inject::logging::{DEFAULT_LOG_DIR, DEFAULT_LOG_PREFIX};
use style_inject::{APP_NAME, ConfigManager, StyleModuleInjector, VERSION};

fn main() -> Result<()> {
    let debug_mode = std::env::var_os("STYLE_INJECT_DEBUG").is_some();
    let _guard = style_inject::logging::setup_logging_with_console(
        DEFAULT_LOG_DIR,
        DEFAULT_LOG_PREFIX,
        debug_mode,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_path =
        std::env::var("STYLE_INJECT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let config_manager = ConfigManager::new(&config_path);
    let options = config_manager.load_options()?;

    tracing::info!(
        "Options loaded - style folder: {}, module folder: {}, hook: {}",
        options.style_folder,
        options.module_folder,
        options.webpack_hook
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let injector = StyleModuleInjector::new(options)?;
    let summary = runtime.block_on(injector.convert_and_inject())?;

    if !summary.is_clean() {
        tracing::warn!("{} file(s) failed, see log for details", summary.failed);
    }

    tracing::info!("Done");
    Ok(())
}
