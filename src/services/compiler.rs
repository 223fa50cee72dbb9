use crate::error::InjectError;
use crate::models::{Options, OutputStyle};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

/// Settings passed through to the compiler for every source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub include_paths: Vec<Utf8PathBuf>,
    pub output_style: OutputStyle,
}

impl CompileOptions {
    pub fn from_options(options: &Options) -> Self {
        Self {
            include_paths: options.include_paths.clone(),
            output_style: options.output_style,
        }
    }
}

/// Compiles one stylesheet source into CSS.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StyleCompiler: Send + Sync {
    async fn compile(
        &self,
        source: &Utf8Path,
        options: &CompileOptions,
    ) -> Result<String, InjectError>;
}

/// Runs the Dart Sass command-line compiler as a subprocess.
///
/// The compiled CSS is read from stdout; a non-zero exit turns stderr into the `Compile`
/// error message.
#[derive(Debug, Clone)]
pub struct SassCommandCompiler {
    executable: String,
    timeout: Duration,
}

impl SassCommandCompiler {
    pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    pub fn from_options(options: &Options) -> Self {
        Self::new(options.sass_executable.clone(), options.compile_timeout)
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Dart Sass only knows `expanded` and `compressed`.
    pub fn style_flag(style: OutputStyle) -> &'static str {
        match style {
            OutputStyle::Compressed => "compressed",
            OutputStyle::Nested | OutputStyle::Expanded | OutputStyle::Compact => "expanded",
        }
    }

    /// Build the argument list for compiling `source` to stdout.
    pub fn build_args(&self, source: &Utf8Path, options: &CompileOptions) -> Vec<String> {
        let mut args = vec![
            "--no-source-map".to_string(),
            format!("--style={}", Self::style_flag(options.output_style)),
        ];

        args.extend(
            options
                .include_paths
                .iter()
                .map(|path| format!("--load-path={}", path)),
        );

        args.push(source.to_string());
        args
    }
}

#[async_trait]
impl StyleCompiler for SassCommandCompiler {
    async fn compile(
        &self,
        source: &Utf8Path,
        options: &CompileOptions,
    ) -> Result<String, InjectError> {
        let args = self.build_args(source, options);
        tracing::debug!("Executing: {} {}", self.executable, args.join(" "));

        let start = Instant::now();

        let child = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                InjectError::compile(source, format!("failed to spawn {}: {}", self.executable, e))
            })?;

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                tracing::warn!("{} timed out after {:?}", self.executable, self.timeout);
                InjectError::compile_timeout(source, self.timeout)
            })?
            .map_err(|e| InjectError::compile(source, format!("failed to wait for compiler: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("compiler exited with {}", output.status),
                diagnostic => diagnostic.to_string(),
            };
            return Err(InjectError::compile(source, message));
        }

        tracing::debug!(
            "Compiled {} in {:.2}s",
            source,
            start.elapsed().as_secs_f32()
        );

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_options() -> CompileOptions {
        CompileOptions {
            include_paths: vec![
                Utf8PathBuf::from("src/webcomponents/style-modules"),
                Utf8PathBuf::from("node_modules"),
            ],
            output_style: OutputStyle::Compressed,
        }
    }

    #[test]
    fn test_build_args() {
        let compiler = SassCommandCompiler::new("sass", Duration::from_secs(5));
        let args = compiler.build_args(Utf8Path::new("scss/card.scss"), &compile_options());

        assert_eq!(
            args,
            vec![
                "--no-source-map",
                "--style=compressed",
                "--load-path=src/webcomponents/style-modules",
                "--load-path=node_modules",
                "scss/card.scss",
            ]
        );
    }

    #[test]
    fn test_style_flag_mapping() {
        assert_eq!(SassCommandCompiler::style_flag(OutputStyle::Compressed), "compressed");
        assert_eq!(SassCommandCompiler::style_flag(OutputStyle::Expanded), "expanded");
        assert_eq!(SassCommandCompiler::style_flag(OutputStyle::Nested), "expanded");
        assert_eq!(SassCommandCompiler::style_flag(OutputStyle::Compact), "expanded");
    }

    #[tokio::test]
    async fn test_missing_executable_is_compile_error() {
        let compiler =
            SassCommandCompiler::new("style-inject-no-such-sass-binary", Duration::from_secs(5));
        let result = compiler
            .compile(Utf8Path::new("scss/card.scss"), &CompileOptions::default())
            .await;

        match result {
            Err(InjectError::Compile { path, message }) => {
                assert_eq!(path, "scss/card.scss");
                assert!(message.contains("failed to spawn"));
            }
            other => panic!("expected compile error, got {:?}", other),
        }
    }
}
