use camino::{Utf8Path, Utf8PathBuf};

/// A stylesheet discovered under the style folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    /// Full path, rooted at the style folder.
    pub path: Utf8PathBuf,
    /// File name only, used to derive the module and side-output file names.
    pub name: String,
}

impl SourceFile {
    pub fn from_path(path: Utf8PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_string();
        Some(Self { path, name })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        let file = SourceFile::from_path(Utf8PathBuf::from("scss/buttons/primary.scss")).unwrap();
        assert_eq!(file.name, "primary.scss");
        assert_eq!(file.path(), "scss/buttons/primary.scss");
    }

    #[test]
    fn test_from_path_without_file_name() {
        assert!(SourceFile::from_path(Utf8PathBuf::from("/")).is_none());
    }
}
