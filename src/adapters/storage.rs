use crate::domain::model::StagedFile;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;

static STAGING_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Upper bound for the client part of a staged name, in bytes. Leaves room
/// for the timestamp prefix under the usual 255-byte file name limit.
const MAX_NAME_BYTES: usize = 100;
/// Longer suffixes are not treated as an extension.
const MAX_EXTENSION_BYTES: usize = 16;

/// Staging directory on the local filesystem.
///
/// Every upload gets its own file: the stored name is
/// `<timestamp>-<sequence>-<client name>`, so uploads sharing a client
/// file name never overwrite each other.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn staged_name(file_name: &str) -> String {
        let seq = STAGING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S%3f");
        format!("{}-{:06}-{}", stamp, seq, sanitize_file_name(file_name))
    }
}

/// 只保留最後一段檔名，避免 path traversal
pub fn sanitize_file_name(file_name: &str) -> String {
    let last = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        truncate_file_name(&cleaned, MAX_NAME_BYTES)
    }
}

/// 超過長度時截斷主檔名，保留副檔名
fn truncate_file_name(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(i) if i > 0 && name.len() - i <= MAX_EXTENSION_BYTES => name.split_at(i),
        _ => (name, ""),
    };
    let stem = truncate_on_char_boundary(stem, max_bytes - extension.len());
    format!("{}{}", stem, extension)
}

fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    let mut end = max_bytes.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Writes `data` to a file that must not exist yet.
async fn write_new(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(data).await?;
    file.flush().await
}

#[async_trait]
impl Storage for LocalStorage {
    async fn stage(&self, file_name: &str, data: &[u8]) -> Result<StagedFile> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        let path = self.base_path.join(Self::staged_name(file_name));
        write_new(&path, data).await?;

        tracing::debug!("Staged {} bytes to {}", data.len(), path.display());
        Ok(StagedFile {
            original_name: file_name.to_string(),
            path,
        })
    }

    async fn read(&self, staged: &StagedFile) -> Result<Vec<u8>> {
        let data = tokio::fs::read(&staged.path).await?;
        Ok(data)
    }

    async fn discard(&self, staged: &StagedFile) -> Result<()> {
        tokio::fs::remove_file(&staged.path).await?;
        tracing::debug!("Removed staged file {}", staged.path.display());
        Ok(())
    }
}
