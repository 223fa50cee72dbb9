use camino::Utf8Path;
use std::fs;
use std::io;

/// File operations used by the injection engine and the orchestrator.
///
/// Content is handled as raw bytes so target files round-trip exactly, whatever their
/// encoding.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Utf8Path) -> bool;

    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>>;

    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()>;

    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Utf8Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}
