//! Recursive discovery of stylesheet sources.
//!
//! [`StyleWalker`] is a restartable producer: every call to [`StyleWalker::iter`] starts a
//! fresh traversal, so a single walker can drive any number of passes. [`walk`] is the
//! callback-style wrapper over it.

use crate::error::InjectError;
use crate::models::SourceFile;
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct StyleWalker {
    root: Utf8PathBuf,
    pattern: Regex,
}

impl StyleWalker {
    /// # Errors
    /// `InvalidRoot` if `root` does not exist or is not a directory.
    pub fn new(root: impl Into<Utf8PathBuf>, pattern: Regex) -> Result<Self, InjectError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(InjectError::InvalidRoot(root));
        }
        Ok(Self { root, pattern })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Lazily yield every file below the root whose full path matches the pattern.
    ///
    /// Directories are descended into, everything else (symlinks included, which are not
    /// followed) is tested against the pattern. Unreadable entries are yielded as
    /// `WalkFailed` and the traversal carries on.
    pub fn iter(&self) -> impl Iterator<Item = Result<SourceFile, InjectError>> + '_ {
        WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        let path = e
                            .path()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| self.root.to_string());
                        return Some(Err(InjectError::WalkFailed {
                            path,
                            message: e.to_string(),
                        }));
                    }
                };

                if entry.file_type().is_dir() {
                    return None;
                }

                let path = match Utf8PathBuf::from_path_buf(entry.into_path()) {
                    Ok(path) => path,
                    Err(path) => {
                        tracing::warn!("Skipping non UTF-8 path: {}", path.display());
                        return None;
                    }
                };

                if !self.pattern.is_match(path.as_str()) {
                    return None;
                }

                SourceFile::from_path(path).map(Ok)
            })
    }
}

/// Visit every matching file below `root`, in directory-listing order.
///
/// Entries that can't be read are logged and skipped.
pub fn walk<F>(root: &Utf8Path, pattern: &Regex, mut visit: F) -> Result<(), InjectError>
where
    F: FnMut(SourceFile),
{
    let walker = StyleWalker::new(root, pattern.clone())?;

    for item in walker.iter() {
        match item {
            Ok(file) => visit(file),
            Err(e) => tracing::error!("{}", e),
        }
    }

    Ok(())
}
