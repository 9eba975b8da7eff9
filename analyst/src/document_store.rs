use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Flat directory of uploaded reports, keyed by original filename.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the upload directory if missing (0755 on unix).
    pub async fn ensure_dir(&self) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);
        builder.create(&self.dir).await
    }

    /// Path of a stored document. The name must already have passed
    /// [`validate_filename`].
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Opens a staging writer for `filename`. Bytes land in a hidden temp
    /// file and only replace the target on [`StagedUpload::commit`].
    pub async fn stage(&self, filename: &str) -> io::Result<StagedUpload> {
        let target = self.path_for(filename);
        let temp = self.dir.join(format!(".upload-{}.part", Uuid::new_v4()));
        let file = fs::File::create(&temp).await?;
        Ok(StagedUpload { file, temp, target })
    }

    pub async fn exists(&self, filename: &str) -> bool {
        match fs::metadata(self.path_for(filename)).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }

    /// Sorted names of stored PDFs. A missing directory is an empty store.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if has_pdf_extension(&name) {
                names.push(name);
            }
        }

        names.sort();
        log::debug!("Listed {} documents in {}", names.len(), self.dir.display());
        Ok(names)
    }
}

/// An upload being written. Dropping it without `commit` leaves the temp
/// file behind; call `discard` on error paths.
pub struct StagedUpload {
    file: fs::File,
    temp: PathBuf,
    target: PathBuf,
}

impl StagedUpload {
    pub async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await
    }

    pub async fn commit(self) -> io::Result<PathBuf> {
        let StagedUpload { mut file, temp, target } = self;

        let result = async {
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp, &target).await
        }
        .await;

        match result {
            Ok(()) => Ok(target),
            Err(err) => {
                let _ = fs::remove_file(&temp).await;
                Err(err)
            }
        }
    }

    pub async fn discard(self) {
        drop(self.file);
        if let Err(err) = fs::remove_file(&self.temp).await {
            log::warn!("Failed to remove staging file {}: {}", self.temp.display(), err);
        }
    }
}

/// Case-sensitive: only a trailing `.pdf` counts.
pub fn has_pdf_extension(filename: &str) -> bool {
    filename.ends_with(".pdf")
}

/// Rejects names that could escape the upload directory.
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty() || filename == "." || filename == ".." {
        anyhow::bail!("filename {:?} is not allowed", filename);
    }
    if filename.contains(['/', '\\', '\0']) {
        anyhow::bail!("filename {:?} must not contain path separators", filename);
    }
    Ok(())
}
