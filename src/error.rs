use camino::Utf8PathBuf;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Every failure a pass can report.
///
/// Construction errors (`MissingArgument`, `InvalidPattern`) and `InvalidRoot` are fatal.
/// Everything else is scoped to a single source file: the orchestrator logs it and moves on.
#[derive(Error, Debug)]
pub enum InjectError {
    #[error("{0} option is missing")]
    MissingArgument(&'static str),

    #[error("Invalid {option} pattern: {source}")]
    InvalidPattern {
        option: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("The given path is not a valid directory: {0}")]
    InvalidRoot(Utf8PathBuf),

    #[error("Failed to traverse {path}: {message}")]
    WalkFailed { path: String, message: String },

    #[error("Couldn't compile {path}: {message}")]
    Compile { path: Utf8PathBuf, message: String },

    #[error("Post-processing stage '{stage}' failed: {message}")]
    PostProcess { stage: String, message: String },

    #[error("No CSS to inject into {0}")]
    NoPayload(Utf8PathBuf),

    #[error("No injection comments found in {0}")]
    RegionNotFound(Utf8PathBuf),

    #[error("Couldn't read file {path}: {source}")]
    ReadFailed {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Couldn't write to file {path}: {source}")]
    WriteFailed {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InjectError {
    pub(crate) fn compile(path: impl Into<Utf8PathBuf>, message: impl Into<String>) -> Self {
        Self::Compile {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn compile_timeout(path: impl Into<Utf8PathBuf>, after: Duration) -> Self {
        Self::compile(path, format!("compiler timed out after {:?}", after))
    }

    pub(crate) fn post_process(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PostProcess {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// True for the errors that abort construction or a whole pass.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument(_) | Self::InvalidPattern { .. } | Self::InvalidRoot(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_argument_message() {
        let err = InjectError::MissingArgument("style_folder");
        assert_eq!(err.to_string(), "style_folder option is missing");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_per_file_errors_are_not_fatal() {
        let path = Utf8PathBuf::from("modules/button.js");
        assert!(!InjectError::RegionNotFound(path.clone()).is_fatal());
        assert!(!InjectError::NoPayload(path.clone()).is_fatal());
        assert!(!InjectError::compile(path, "Undefined variable").is_fatal());
        assert!(InjectError::InvalidRoot(Utf8PathBuf::from("missing")).is_fatal());
    }

    #[test]
    fn test_compile_timeout_message() {
        let err = InjectError::compile_timeout("scss/a.scss", Duration::from_secs(2));
        assert!(err.to_string().contains("scss/a.scss"));
        assert!(err.to_string().contains("timed out after 2s"));
    }
}
