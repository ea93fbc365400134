// Scoped files in the working directory.
//
// Every audio file a request touches (the raw intake and the normalized
// waveform) is owned by a guard that removes it when the request scope ends,
// on success and failure alike.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A file in the working directory that is deleted on drop.
#[derive(Debug)]
pub struct WorkFile {
    path: PathBuf,
}

impl WorkFile {
    /// Write `bytes` verbatim to `file_name` inside `work_dir`.
    pub fn create(work_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<Self> {
        fs::create_dir_all(work_dir)
            .with_context(|| format!("create working directory {}", work_dir.display()))?;
        let path = work_dir.join(file_name);
        fs::write(&path, bytes)
            .with_context(|| format!("write intake file {}", path.display()))?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(Self { path })
    }

    /// Write `bytes` under a unique name, keeping the uploaded extension so
    /// the decoder can sniff the container.
    pub fn create_unique(work_dir: &Path, original_name: &str, bytes: &[u8]) -> Result<Self> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("wav");
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        Self::create(work_dir, &file_name, bytes)
    }

    /// Take ownership of a file some other step already wrote.
    pub fn adopt(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem used for the normalized-output naming convention.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string())
    }
}

impl Drop for WorkFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed working file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_writes_and_drop_removes() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let file = WorkFile::create(dir.path(), "clip.wav", b"RIFF").unwrap();
            assert_eq!(fs::read(file.path()).unwrap(), b"RIFF");
            file.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn create_unique_keeps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = WorkFile::create_unique(dir.path(), "meeting.ogg", b"data").unwrap();
        assert_eq!(
            file.path().extension().and_then(|e| e.to_str()),
            Some("ogg")
        );
    }

    #[test]
    fn missing_extension_defaults_to_wav() {
        let dir = tempfile::tempdir().unwrap();
        let file = WorkFile::create_unique(dir.path(), "blob", b"data").unwrap();
        assert_eq!(
            file.path().extension().and_then(|e| e.to_str()),
            Some("wav")
        );
    }

    #[test]
    fn adopt_removes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("normalized_clip.wav");
        fs::write(&path, b"wav").unwrap();
        drop(WorkFile::adopt(path.clone()));
        assert!(!path.exists());
    }
}
