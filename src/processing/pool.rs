// ワーカープール実行器
// 固定数のOSプロセスへチャンクを配布し、投入順に結果を返す

use super::aggregator::order_by_submission;
use super::worker_process::WorkerProcess;
use crate::core::{
    Chunk, ChunkExecutor, ChunkOutput, ExecutionConfig, Image, RunError, RunResult,
};
use crate::workload::WorkloadLocator;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// ワーカープールの設定
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// 起動するワーカープロセス数の上限
    pub worker_count: usize,
    /// `--internal-worker` を解釈するプログラム
    pub program: PathBuf,
}

/// OSプロセスによるチャンク実行器
///
/// プールは1回の `execute` の間だけ存在し、どの経路で終わっても
/// 子プロセスは回収または強制終了される。
#[derive(Debug, Clone)]
pub struct ProcessPoolExecutor {
    config: WorkerPoolConfig,
}

type WorkQueue = Arc<Mutex<mpsc::Receiver<Chunk<Image>>>>;

impl ProcessPoolExecutor {
    pub fn new(config: WorkerPoolConfig) -> Self {
        Self { config }
    }

    /// 実行設定から作成
    pub fn from_config<C: ExecutionConfig + ?Sized>(config: &C) -> RunResult<Self> {
        Ok(Self::new(WorkerPoolConfig {
            worker_count: config.worker_count(),
            program: config.worker_program()?,
        }))
    }

    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }
}

#[async_trait]
impl ChunkExecutor for ProcessPoolExecutor {
    async fn execute(
        &self,
        chunks: Vec<Chunk>,
        locator: &WorkloadLocator,
    ) -> RunResult<Vec<ChunkOutput>> {
        let chunk_count = chunks.len();
        if chunk_count == 0 {
            return Ok(Vec::new());
        }

        let worker_count = self.config.worker_count.clamp(1, chunk_count);
        let locator = locator.to_string();
        info!(worker_count, chunk_count, "Starting worker pool");

        // 投入順にキューへ積み、空いたワーカーが次を取る
        let (work_tx, work_rx) = mpsc::channel(chunk_count);
        for chunk in chunks {
            work_tx
                .send(chunk)
                .await
                .map_err(|_| RunError::protocol("work queue closed before dispatch"))?;
        }
        drop(work_tx);
        let queue: WorkQueue = Arc::new(Mutex::new(work_rx));

        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            workers.spawn(run_worker(
                worker_id,
                self.config.program.clone(),
                locator.clone(),
                queue.clone(),
            ));
        }

        let mut outputs = Vec::with_capacity(chunk_count);
        while let Some(joined) = workers.join_next().await {
            let result = joined.map_err(RunError::task).and_then(|r| r);
            match result {
                Ok(mut worker_outputs) => outputs.append(&mut worker_outputs),
                Err(e) => {
                    error!(severity = e.severity().as_str(), "Aborting run: {e}");
                    // 残りのワーカーを中断（kill_on_drop で子プロセスも終了する）
                    workers.shutdown().await;
                    return Err(e);
                }
            }
        }

        order_by_submission(chunk_count, outputs)
    }
}

/// 1ワーカー分の処理: 起動、読み込み待ち、キューが空になるまで処理、終了
async fn run_worker(
    worker_id: usize,
    program: PathBuf,
    locator: String,
    queue: WorkQueue,
) -> RunResult<Vec<ChunkOutput>> {
    let mut worker = WorkerProcess::spawn(worker_id, &program, &locator)?;
    worker.wait_for_ready(&locator).await?;

    let mut outputs = Vec::new();
    loop {
        let next = {
            let mut rx = queue.lock().await;
            rx.recv().await
        };
        let Some(chunk) = next else {
            break;
        };

        debug!(worker_id = worker.id(), chunk_index = chunk.index, images = chunk.len(), "Dispatching chunk");
        outputs.push(worker.process_chunk(chunk).await?);
    }

    worker.shutdown().await?;
    Ok(outputs)
}
