//! Destinations for exported artifacts.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Receives the directories and files an export produces.
pub trait ArtifactSink {
    /// Ensure a directory exists. Must succeed if it already does.
    fn create_dir(&mut self, path: &Path) -> io::Result<()>;

    /// Write a complete artifact, replacing any existing one.
    fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Writes artifacts to the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSink;

impl ArtifactSink for FsSink {
    fn create_dir(&mut self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::write(path, bytes)
    }
}

/// Records artifacts in memory. Used for dry runs and tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub dirs: BTreeSet<PathBuf>,
    pub files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<&[u8]> {
        self.files.get(path.as_ref()).map(Vec::as_slice)
    }
}

impl ArtifactSink for MemorySink {
    fn create_dir(&mut self, path: &Path) -> io::Result<()> {
        self.dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_sink_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut sink = FsSink;

        sink.create_dir(&nested).unwrap();
        sink.create_dir(&nested).unwrap();
        sink.write(&nested.join("x.json"), b"{}").unwrap();

        assert_eq!(fs::read(nested.join("x.json")).unwrap(), b"{}");
    }

    #[test]
    fn memory_sink_overwrites() {
        let mut sink = MemorySink::new();
        sink.write(Path::new("out/x.txt"), b"one").unwrap();
        sink.write(Path::new("out/x.txt"), b"two").unwrap();
        assert_eq!(sink.file("out/x.txt"), Some(&b"two"[..]));
        assert_eq!(sink.files.len(), 1);
    }
}
