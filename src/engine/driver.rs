// Driver - 依存性注入による実行オーケストレーション
// 取得 → 分割 → 並列実行 → 集約 を1回の実行として管理する

use crate::{
    core::{
        ChunkExecutor, DatasetId, ExecutionConfig, ProgressReporter, ResultSet, RunError,
        RunResult,
    },
    dataset::DatasetProvider,
    processing::{flatten, order_by_submission, partition},
    workload::WorkloadLocator,
};
use std::sync::Arc;
use tracing::{debug, info};

/// 並列実行のドライバー
///
/// 依存関係は全てコンストラクタで注入する。データセットの取得は1回の実行につき1回だけ。
/// 進捗報告は情報提供のみで、戻り値や制御フローには影響しない。
pub struct Driver<D, E, R, C> {
    provider: Arc<D>,
    executor: Arc<E>,
    reporter: Arc<R>,
    config: Arc<C>,
}

impl<D, E, R, C> Driver<D, E, R, C>
where
    D: DatasetProvider,
    E: ChunkExecutor,
    R: ProgressReporter,
    C: ExecutionConfig,
{
    pub fn new(provider: D, executor: E, reporter: R, config: C) -> Self {
        Self {
            provider: Arc::new(provider),
            executor: Arc::new(executor),
            reporter: Arc::new(reporter),
            config: Arc::new(config),
        }
    }

    /// ワークロードをデータセットの全画像に適用する
    ///
    /// 成功した画像の値はデータセット順に並び、失敗した画像は `values()` から除外される。
    pub async fn run(
        &self,
        locator: &WorkloadLocator,
        dataset_id: &DatasetId,
    ) -> RunResult<ResultSet> {
        // ワーカー起動前に解決できないロケーターを弾く
        locator.resolve()?;

        let images = self
            .provider
            .get_dataset_images(dataset_id)
            .await
            .map_err(|e| RunError::dataset_retrieval(dataset_id.as_str(), e))?;

        if images.is_empty() {
            return Err(RunError::empty_dataset(dataset_id.as_str()));
        }

        let image_count = images.len();
        let report = self.config.enable_progress_reporting();
        info!(
            %dataset_id,
            image_count,
            provider = self.provider.provider_name(),
            "Dataset retrieved"
        );
        if report {
            self.reporter.report_dataset_size(dataset_id, image_count).await;
        }

        let worker_count = self.config.worker_count().max(1);
        let chunks = partition(images, worker_count);
        let chunk_count = chunks.len();
        debug!(worker_count, chunk_count, "Dataset partitioned");
        if report {
            self.reporter.report_worker_count(worker_count, chunk_count).await;
        }

        let outputs = self.executor.execute(chunks, locator).await?;
        // 実行器の実装に関わらず、投入順に揃い全チャンクが揃った時だけ結果とする
        let results = flatten(order_by_submission(chunk_count, outputs)?);

        if report {
            for failure in results.failures() {
                self.reporter.report_image_failure(failure).await;
            }
            self.reporter
                .report_completed(results.processed_count(), results.failed_count())
                .await;
        }
        info!(
            processed = results.processed_count(),
            failed = results.failed_count(),
            "Run completed"
        );

        Ok(results)
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn provider(&self) -> &D {
        &self.provider
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }
}
