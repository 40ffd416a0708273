//! Object-storage collaborator at its interface: finished database files
//! and exports are handed over as byte streams keyed by destination path.
//! Only the filesystem-backed store lives here; network-backed stores are
//! external.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

#[async_trait]
pub trait ArchiveStore: Send + Sync {
    async fn upload(&self, key: &str, body: &[u8]) -> Result<(), String>;
    async fn download(&self, key: &str) -> Result<Vec<u8>, String>;
    /// Content-checksum comparison of two stored objects, used to decide
    /// whether a freshly produced export differs from the published one.
    async fn checksums_match(&self, key_a: &str, key_b: &str) -> Result<bool, String>;
    /// Moves every object under `old_prefix` to `new_prefix`.
    async fn rename_folder(&self, old_prefix: &str, new_prefix: &str) -> Result<(), String>;
}

pub struct LocalArchiveStore {
    root: PathBuf,
}

impl LocalArchiveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalArchiveStore { root: root.into() }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    async fn checksum(&self, key: &str) -> Result<String, String> {
        let body = self.download(key).await?;
        let digest = Sha256::digest(&body);
        Ok(hex::encode(digest))
    }
}

#[async_trait]
impl ArchiveStore for LocalArchiveStore {
    async fn upload(&self, key: &str, body: &[u8]) -> Result<(), String> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("Failed to create archive folder for '{}': {}", key, e))?;
        }
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| format!("Failed to store '{}': {}", key, e))?;
        log::info!("Stored '{}' ({} bytes)", key, body.len());
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, String> {
        tokio::fs::read(self.resolve(key))
            .await
            .map_err(|e| format!("Failed to read '{}': {}", key, e))
    }

    async fn checksums_match(&self, key_a: &str, key_b: &str) -> Result<bool, String> {
        let checksum_a = self.checksum(key_a).await?;
        let checksum_b = self.checksum(key_b).await?;
        log::info!("Checksum '{}': {}", key_a, checksum_a);
        log::info!("Checksum '{}': {}", key_b, checksum_b);
        Ok(checksum_a == checksum_b)
    }

    async fn rename_folder(&self, old_prefix: &str, new_prefix: &str) -> Result<(), String> {
        let old_root = self.resolve(old_prefix);
        let new_root = self.resolve(new_prefix);

        let mut pending = vec![old_root.clone()];
        while let Some(folder) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&folder)
                .await
                .map_err(|e| format!("Failed to list '{}': {}", folder.display(), e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| format!("Failed to list '{}': {}", folder.display(), e))?
            {
                let old_path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| format!("Failed to inspect '{}': {}", old_path.display(), e))?;
                if file_type.is_dir() {
                    pending.push(old_path);
                    continue;
                }

                let relative = old_path
                    .strip_prefix(&old_root)
                    .map_err(|e| format!("Failed to relocate '{}': {}", old_path.display(), e))?;
                let new_path = new_root.join(relative);
                move_file(&old_path, &new_path).await?;
                log::info!(
                    "Moved '{}' to '{}'",
                    old_path.display(),
                    new_path.display()
                );
            }
        }

        tokio::fs::remove_dir_all(&old_root)
            .await
            .map_err(|e| format!("Failed to remove '{}': {}", old_root.display(), e))?;
        log::info!("Folder '{}' renamed to '{}'", old_prefix, new_prefix);
        Ok(())
    }
}

async fn move_file(old_path: &Path, new_path: &Path) -> Result<(), String> {
    if let Some(parent) = new_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    tokio::fs::rename(old_path, new_path)
        .await
        .map_err(|e| format!("Failed to move '{}': {}", old_path.display(), e))
}
