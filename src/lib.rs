// style-inject - compile stylesheets and inject them into Polymer style modules
//
// This is the library crate containing the injection engine and its pipeline.
// The binary crate (main.rs) runs a single pass from a YAML config file.

pub mod config;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use error::InjectError;
pub use hooks::{HookRegistry, PhaseHandler};
pub use metrics::{PassMetrics, PassSummary};
pub use models::{DelimiterPair, Options, OutputStyle, RawOptions, SourceFile, TransformKind};
pub use services::{InjectionEngine, StyleModuleInjector};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
