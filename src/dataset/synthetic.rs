// 合成データセット
// ランダムな白黒画素の画像を生成する。乱数の種はデータセットIDから決まる

use super::DatasetProvider;
use crate::core::{DatasetId, Image};
use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

// 数値以外のIDのシード（Rustのバージョンやプロセスに依存しない）
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(FNV_OFFSET_BASIS, |hash, &b| (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME))
}

/// 合成データセットの取得元
#[derive(Debug, Clone)]
pub struct SyntheticDatasetProvider {
    image_count: usize,
    width: u32,
    height: u32,
}

impl Default for SyntheticDatasetProvider {
    fn default() -> Self {
        Self {
            image_count: 10,
            width: 500,
            height: 500,
        }
    }
}

impl SyntheticDatasetProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_count(mut self, image_count: usize) -> Self {
        self.image_count = image_count;
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn seed(dataset_id: &DatasetId) -> u64 {
        dataset_id
            .as_number()
            .unwrap_or_else(|| fnv1a(dataset_id.as_str().as_bytes()))
    }

    /// データセットを同期的に生成
    pub fn generate(&self, dataset_id: &DatasetId) -> Result<Vec<Image>> {
        let mut rng = StdRng::seed_from_u64(Self::seed(dataset_id));
        let pixel_count = self.width as usize * self.height as usize;

        (0..self.image_count)
            .map(|i| {
                let pixels = (0..pixel_count)
                    .map(|_| if rng.gen_bool(0.5) { 255 } else { 0 })
                    .collect();
                Image::grayscale(
                    format!("dataset-{dataset_id}/image-{i:04}"),
                    self.width,
                    self.height,
                    pixels,
                )
            })
            .collect()
    }
}

#[async_trait]
impl DatasetProvider for SyntheticDatasetProvider {
    async fn get_dataset_images(&self, dataset_id: &DatasetId) -> Result<Vec<Image>> {
        tracing::debug!(%dataset_id, image_count = self.image_count, "Generating synthetic dataset");
        self.generate(dataset_id)
    }

    fn provider_name(&self) -> &'static str {
        "synthetic"
    }
}
