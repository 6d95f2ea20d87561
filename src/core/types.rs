// 並列実行で扱うデータ型定義

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// データセット識別子（文字列または整数）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 整数として解釈できる場合はその値を返す
    pub fn as_number(&self) -> Option<u64> {
        self.0.trim().parse().ok()
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DatasetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for DatasetId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// プロセス境界を越えて受け渡される画像バッファ
///
/// `pixels` は行優先で `width * height * channels` バイト。
/// 中身の意味はワークロードだけが解釈する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// 画像の識別子（診断メッセージに使う）
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    #[serde(with = "pixel_encoding")]
    pub pixels: Vec<u8>,
}

impl Image {
    /// 画像を作成（バッファ長を検証する）
    pub fn new(
        id: impl Into<String>,
        width: u32,
        height: u32,
        channels: u8,
        pixels: Vec<u8>,
    ) -> anyhow::Result<Self> {
        let expected = width as usize * height as usize * channels as usize;
        if pixels.len() != expected {
            anyhow::bail!(
                "pixel buffer length {} does not match {}x{}x{}",
                pixels.len(),
                width,
                height,
                channels
            );
        }
        Ok(Self {
            id: id.into(),
            width,
            height,
            channels,
            pixels,
        })
    }

    /// 単一チャンネル（グレースケール）画像を作成
    pub fn grayscale(id: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> anyhow::Result<Self> {
        Self::new(id, width, height, 1, pixels)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixel_sum(&self) -> u64 {
        self.pixels.iter().map(|&p| p as u64).sum()
    }

    /// `image` クレートの画像に変換（1/3/4チャンネルのみ）
    pub fn to_dynamic_image(&self) -> Option<DynamicImage> {
        let pixels = self.pixels.clone();
        match self.channels {
            1 => GrayImage::from_raw(self.width, self.height, pixels).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(self.width, self.height, pixels).map(DynamicImage::ImageRgb8),
            4 => RgbaImage::from_raw(self.width, self.height, pixels).map(DynamicImage::ImageRgba8),
            _ => None,
        }
    }

    /// `image` クレートの画像から作成
    ///
    /// 8bit以外の形式はRGBA8に変換される。
    pub fn from_dynamic_image(id: impl Into<String>, image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let (channels, pixels) = match image {
            DynamicImage::ImageLuma8(buffer) => (1, buffer.into_raw()),
            DynamicImage::ImageRgb8(buffer) => (3, buffer.into_raw()),
            DynamicImage::ImageRgba8(buffer) => (4, buffer.into_raw()),
            other => (4, other.to_rgba8().into_raw()),
        };
        Self {
            id: id.into(),
            width,
            height,
            channels,
            pixels,
        }
    }
}

mod pixel_encoding {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(pixels: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(pixels))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// データセットの連続した部分列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk<T = Image> {
    /// 投入順の位置
    pub index: usize,
    /// 先頭要素のデータセット内位置
    pub offset: usize,
    pub items: Vec<T>,
}

impl<T> Chunk<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 処理に失敗した画像の記録
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFailure {
    /// データセット内の位置
    pub index: usize,
    pub image_id: String,
    pub reason: String,
}

impl From<&ImageFailure> for crate::core::RunError {
    fn from(failure: &ImageFailure) -> Self {
        crate::core::RunError::image_processing(
            failure.index,
            failure.image_id.clone(),
            failure.reason.clone(),
        )
    }
}

/// 画像1枚分の処理結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageOutcome {
    Processed { index: usize, value: Value },
    Failed(ImageFailure),
}

impl ImageOutcome {
    pub fn index(&self) -> usize {
        match self {
            Self::Processed { index, .. } => *index,
            Self::Failed(failure) => failure.index,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Processed { value, .. } => Some(value),
            Self::Failed(_) => None,
        }
    }
}

/// 1チャンク分の出力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkOutput {
    pub chunk_index: usize,
    pub outcomes: Vec<ImageOutcome>,
}

/// 実行全体の最終結果
///
/// `values()` は失敗した画像を取り除いた詰めた列、
/// `outcomes()` はデータセットと位置が揃った列。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    outcomes: Vec<ImageOutcome>,
}

impl ResultSet {
    pub fn new(outcomes: Vec<ImageOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[ImageOutcome] {
        &self.outcomes
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.outcomes.iter().filter_map(ImageOutcome::value)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                ImageOutcome::Processed { value, .. } => Some(value),
                ImageOutcome::Failed(_) => None,
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ImageFailure> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            ImageOutcome::Failed(failure) => Some(failure),
            ImageOutcome::Processed { .. } => None,
        })
    }

    pub fn processed_count(&self) -> usize {
        self.values().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// 処理対象になった画像の総数
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(index: usize) -> ImageOutcome {
        ImageOutcome::Failed(ImageFailure {
            index,
            image_id: format!("image-{index}"),
            reason: "boom".to_string(),
        })
    }

    #[test]
    fn test_dataset_id_numeric_and_string() {
        assert_eq!(DatasetId::from(42u64).as_number(), Some(42));
        assert_eq!(DatasetId::from("  7 ").as_number(), Some(7));
        assert_eq!(DatasetId::from("cells-a").as_number(), None);
        assert_eq!(DatasetId::from("cells-a").to_string(), "cells-a");
    }

    #[test]
    fn test_image_rejects_mismatched_buffer() {
        assert!(Image::new("bad", 2, 2, 1, vec![0; 3]).is_err());
        assert!(Image::new("ok", 2, 2, 3, vec![0; 12]).is_ok());
        assert!(Image::new("empty", 0, 0, 1, Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_image_pixel_sum() {
        let image = Image::grayscale("a", 2, 2, vec![255, 0, 255, 1]).unwrap();
        assert_eq!(image.pixel_sum(), 511);
    }

    #[test]
    fn test_image_serializes_pixels_as_base64() {
        let image = Image::grayscale("a", 2, 1, vec![0, 255]).unwrap();
        let value = serde_json::to_value(&image).unwrap();

        assert_eq!(value["pixels"], json!("AP8="));
        let decoded: Image = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_dynamic_image_conversion() {
        let image = Image::new("rgb", 1, 2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let dynamic = image.to_dynamic_image().unwrap();
        assert_eq!((dynamic.width(), dynamic.height()), (1, 2));

        let back = Image::from_dynamic_image("rgb", dynamic);
        assert_eq!(back, image);

        let unsupported = Image::new("two", 1, 1, 2, vec![0, 0]).unwrap();
        assert!(unsupported.to_dynamic_image().is_none());
    }

    #[test]
    fn test_result_set_compacts_failures() {
        let result_set = ResultSet::new(vec![
            ImageOutcome::Processed { index: 0, value: json!(10) },
            failure(1),
            ImageOutcome::Processed { index: 2, value: json!(30) },
        ]);

        assert_eq!(result_set.total(), 3);
        assert_eq!(result_set.processed_count(), 2);
        assert_eq!(result_set.failed_count(), 1);
        assert_eq!(result_set.failures().next().unwrap().index, 1);
        assert_eq!(result_set.outcomes()[1].index(), 1);
        assert_eq!(result_set.into_values(), vec![json!(10), json!(30)]);
    }

    #[test]
    fn test_image_failure_converts_to_run_error() {
        let failure = ImageFailure {
            index: 4,
            image_id: "image-4".to_string(),
            reason: "bad".to_string(),
        };
        let error: crate::core::RunError = (&failure).into();
        assert!(!error.is_fatal());
    }
}
