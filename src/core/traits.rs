// 並列実行システムのトレイト定義
// ドライバーが依存する抽象化インターフェースを定義

use super::error::RunResult;
use super::types::{Chunk, ChunkOutput, DatasetId, ImageFailure};
use crate::workload::WorkloadLocator;
use async_trait::async_trait;
use mockall::automock;
use std::path::PathBuf;

/// 実行設定を抽象化するトレイト
#[automock]
pub trait ExecutionConfig: Send + Sync {
    /// ワーカー数を取得（1以上）
    fn worker_count(&self) -> usize;

    /// ワーカーとして再実行するプログラムを取得
    fn worker_program(&self) -> RunResult<PathBuf>;

    /// 進捗報告を有効にするかどうか
    fn enable_progress_reporting(&self) -> bool;
}

/// 進捗報告の抽象化トレイト
///
/// 報告は情報提供のみで、制御フローには影響しない。
#[automock]
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// データセットの画像数が判明した時の報告
    async fn report_dataset_size(&self, dataset_id: &DatasetId, image_count: usize);

    /// ワーカー数が決まった時の報告
    async fn report_worker_count(&self, worker_count: usize, chunk_count: usize);

    /// 画像単位の失敗の報告
    async fn report_image_failure(&self, failure: &ImageFailure);

    /// 処理完了時の報告
    async fn report_completed(&self, processed: usize, failed: usize);
}

// ProgressReporter for Box<dyn ProgressReporter>
#[async_trait]
impl ProgressReporter for Box<dyn ProgressReporter> {
    async fn report_dataset_size(&self, dataset_id: &DatasetId, image_count: usize) {
        self.as_ref().report_dataset_size(dataset_id, image_count).await
    }

    async fn report_worker_count(&self, worker_count: usize, chunk_count: usize) {
        self.as_ref().report_worker_count(worker_count, chunk_count).await
    }

    async fn report_image_failure(&self, failure: &ImageFailure) {
        self.as_ref().report_image_failure(failure).await
    }

    async fn report_completed(&self, processed: usize, failed: usize) {
        self.as_ref().report_completed(processed, failed).await
    }
}

/// チャンク群をワーカーへ配布して実行するトレイト
///
/// 戻り値は投入順（`Chunk::index` 順）に並んでいなければならない。
#[automock]
#[async_trait]
pub trait ChunkExecutor: Send + Sync {
    async fn execute(
        &self,
        chunks: Vec<Chunk>,
        locator: &WorkloadLocator,
    ) -> RunResult<Vec<ChunkOutput>>;
}
