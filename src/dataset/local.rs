use super::{is_image_extension, DatasetProvider};
use crate::core::{DatasetId, Image};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// ローカルディレクトリをデータセットとして扱う取得元
///
/// `<root>/<dataset_id>/` 以下の画像ファイルをファイル名順に読み込む。
#[derive(Debug, Clone)]
pub struct LocalDirectoryProvider {
    root: PathBuf,
}

impl LocalDirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// データセットIDに対応するディレクトリ
    pub fn dataset_dir(&self, dataset_id: &DatasetId) -> Result<PathBuf> {
        let id = dataset_id.as_str();
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            bail!("invalid dataset id for a directory dataset: {id:?}");
        }
        Ok(self.root.join(id))
    }

    fn load_directory(dir: &Path) -> Result<Vec<Image>> {
        if !dir.is_dir() {
            bail!("dataset directory not found: {}", dir.display());
        }

        let mut images = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk: {}", dir.display()))?;
            let path = entry.path();
            let is_image = entry.file_type().is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(is_image_extension)
                    .unwrap_or(false);
            if !is_image {
                continue;
            }

            let decoded = image::open(path)
                .with_context(|| format!("Failed to decode image: {}", path.display()))?;
            let id = path.strip_prefix(dir).unwrap_or(path).to_string_lossy().to_string();
            images.push(Image::from_dynamic_image(id, decoded));
        }

        Ok(images)
    }
}

#[async_trait]
impl DatasetProvider for LocalDirectoryProvider {
    async fn get_dataset_images(&self, dataset_id: &DatasetId) -> Result<Vec<Image>> {
        let dir = self.dataset_dir(dataset_id)?;
        tracing::debug!(dir = %dir.display(), "Loading dataset directory");

        // 画像のデコードはブロッキング処理
        tokio::task::spawn_blocking(move || Self::load_directory(&dir))
            .await
            .context("dataset loading task failed")?
    }

    fn provider_name(&self) -> &'static str {
        "local-directory"
    }
}
