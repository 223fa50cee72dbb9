//! Data models for style-inject.
//!
//! - [`RawOptions`]: unvalidated options as loaded from `style-inject.yaml` and the environment
//! - [`Options`]: the validated, immutable configuration an injector is built from
//! - [`DelimiterPair`]: the start/end markers that delimit an injection region
//! - [`SourceFile`]: a stylesheet discovered by the walker
//!
//! Options are validated exactly once, in [`Options::from_raw`]. Nothing downstream
//! re-checks them.

pub mod options;
pub mod source;

pub use options::{
    DEFAULT_END_COMMENT, DEFAULT_START_COMMENT, DelimiterPair, Options, OutputStyle, RawOptions,
    TransformKind,
};
pub use source::SourceFile;
