//! Services module - the compile-and-inject pipeline.
//!
//! # Components
//!
//! - [`StyleWalker`]: lazily discovers stylesheet sources under the style folder
//! - [`StyleCompiler`]: compiles one source to CSS ([`SassCommandCompiler`] runs Dart Sass)
//! - [`Pipeline`]: ordered CSS transforms run after compilation
//!   ([`Autoprefixer`], [`UrlRebaser`])
//! - [`InjectionEngine`]: replaces the delimited region of a style module with new CSS
//! - [`StyleModuleInjector`]: wires the above together for one pass over the style folder
//!
//! File access goes through the [`FileSystem`] trait so the engine and the injector can be
//! tested without touching disk.
//!
//! # Usage Example
//!
//! ```ignore
//! use style_inject::{Options, RawOptions, StyleModuleInjector};
//!
//! let options = Options::from_raw(RawOptions::new("./scss", "./modules", r"\.scss$"))?;
//! let injector = StyleModuleInjector::new(options)?;
//!
//! let summary = injector.convert_and_inject().await?;
//! println!("{} modules updated", summary.injected);
//! ```

pub mod compiler;
pub mod fs;
pub mod injection;
pub mod injector;
pub mod postprocess;
pub mod walker;

pub use compiler::{CompileOptions, SassCommandCompiler, StyleCompiler};
pub use fs::{FileSystem, OsFileSystem};
pub use injection::{AUTOGENERATED_NOTICE, InjectionEngine};
pub use injector::{FileOutcome, PLUGIN_NAME, StyleModuleInjector};
pub use postprocess::{Autoprefixer, CssTransform, Pipeline, ProcessContext, UrlRebaser};
pub use walker::{StyleWalker, walk};
