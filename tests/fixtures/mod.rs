// テストユーティリティ
// 実バイナリをワーカーとして使うための設定と、固定データセットを提供
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use image_parallel::{DatasetId, DatasetProvider, DefaultExecutionConfig, Image};
use std::fs;
use std::path::{Path, PathBuf};

/// `--internal-worker` を解釈するビルド済みバイナリ
pub fn worker_program() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_image_parallel"))
}

/// 実バイナリをワーカーにした静音設定
pub fn process_config(worker_count: usize) -> DefaultExecutionConfig {
    DefaultExecutionConfig::new()
        .with_worker_count(worker_count)
        .with_worker_program(worker_program())
        .with_progress_reporting(false)
}

/// 画素値 [i, 1] を持つ2x1の画像列。`empty_at` の位置だけ空画像にする
pub fn numbered_images(count: usize, empty_at: Option<usize>) -> Vec<Image> {
    (0..count)
        .map(|i| {
            if Some(i) == empty_at {
                Image::grayscale(format!("img-{i}"), 0, 0, Vec::new()).unwrap()
            } else {
                Image::grayscale(format!("img-{i}"), 2, 1, vec![i as u8, 1]).unwrap()
            }
        })
        .collect()
}

/// 固定の画像列を返すデータセット取得元
pub struct FixedDatasetProvider {
    images: Vec<Image>,
}

impl FixedDatasetProvider {
    pub fn new(images: Vec<Image>) -> Self {
        Self { images }
    }
}

#[async_trait]
impl DatasetProvider for FixedDatasetProvider {
    async fn get_dataset_images(&self, _dataset_id: &DatasetId) -> Result<Vec<Image>> {
        Ok(self.images.clone())
    }

    fn provider_name(&self) -> &'static str {
        "fixed"
    }
}

/// マニフェストファイルを書き出す
pub fn write_manifest(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Cソースを共有ライブラリへコンパイルする
///
/// Cコンパイラが無い環境では `None` を返し、呼び出し側のテストはスキップする。
pub fn compile_c_plugin(dir: &Path, name: &str, source: &str) -> Option<PathBuf> {
    let source_path = dir.join(format!("{name}.c"));
    fs::write(&source_path, source).unwrap();
    let library = dir.join(format!("lib{name}.{}", std::env::consts::DLL_EXTENSION));

    let status = std::process::Command::new("cc")
        .args(["-shared", "-fPIC", "-o"])
        .arg(&library)
        .arg(&source_path)
        .status();

    match status {
        Ok(status) if status.success() && library.is_file() => Some(library),
        other => {
            eprintln!("skipping plugin test: C compiler unavailable ({other:?})");
            None
        }
    }
}
