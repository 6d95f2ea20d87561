// 進捗報告の実装
// ユーザー向けの進捗は標準出力、診断ログはtracing経由で標準エラーへ

use crate::core::{DatasetId, ImageFailure, ProgressReporter};
use async_trait::async_trait;

/// コンソール進捗報告実装
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    quiet: bool,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn completion_line(processed: usize, failed: usize) -> String {
        if failed == 0 {
            format!("All {processed} images processed successfully.")
        } else {
            format!("Processed {processed} images, {failed} failed.")
        }
    }

    fn failure_line(failure: &ImageFailure) -> String {
        format!(
            "[ERROR] Failed processing image {} (index {}): {}",
            failure.image_id, failure.index, failure.reason
        )
    }
}

#[async_trait]
impl ProgressReporter for ConsoleProgressReporter {
    async fn report_dataset_size(&self, dataset_id: &DatasetId, image_count: usize) {
        if !self.quiet {
            println!("Found {image_count} images in dataset {dataset_id}");
        }
    }

    async fn report_worker_count(&self, worker_count: usize, chunk_count: usize) {
        tracing::debug!(worker_count, chunk_count, "Dataset partitioned");
        if !self.quiet {
            println!("Using {worker_count} CPU cores");
            println!("Starting parallel processing...");
        }
    }

    async fn report_image_failure(&self, failure: &ImageFailure) {
        if !self.quiet {
            println!("{}", Self::failure_line(failure));
        }
    }

    async fn report_completed(&self, processed: usize, failed: usize) {
        if !self.quiet {
            println!("{}", Self::completion_line(processed, failed));
        }
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_dataset_size(&self, _dataset_id: &DatasetId, _image_count: usize) {}

    async fn report_worker_count(&self, _worker_count: usize, _chunk_count: usize) {}

    async fn report_image_failure(&self, _failure: &ImageFailure) {}

    async fn report_completed(&self, _processed: usize, _failed: usize) {}
}
