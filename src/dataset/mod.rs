use crate::core::{DatasetId, Image};
use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

pub mod local;
pub mod synthetic;

/// データセット取得元のトレイト
///
/// 1回の実行につき1回だけ呼ばれ、順序付きの画像列を全て返す。
#[automock]
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    /// データセットの全画像を取得する
    async fn get_dataset_images(&self, dataset_id: &DatasetId) -> Result<Vec<Image>>;

    /// 取得元の名前
    fn provider_name(&self) -> &'static str;
}

// DatasetProvider for Box<dyn DatasetProvider>
#[async_trait]
impl DatasetProvider for Box<dyn DatasetProvider> {
    async fn get_dataset_images(&self, dataset_id: &DatasetId) -> Result<Vec<Image>> {
        self.as_ref().get_dataset_images(dataset_id).await
    }

    fn provider_name(&self) -> &'static str {
        self.as_ref().provider_name()
    }
}

/// 画像ファイルとして扱う拡張子
pub fn is_image_extension(extension: &str) -> bool {
    matches!(
        extension.to_lowercase().as_str(),
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tiff" | "webp"
    )
}
