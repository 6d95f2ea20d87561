// スレッドによるチャンク実行器
// プロセスを起動できない埋め込み環境とテスト向け。各スレッドがワークロードを個別に読み込む

use super::aggregator::order_by_submission;
use super::chunk_runner::run_chunk;
use crate::core::{Chunk, ChunkExecutor, ChunkOutput, Image, RunError, RunResult};
use crate::workload::WorkloadLocator;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

type WorkQueue = Arc<Mutex<VecDeque<Chunk<Image>>>>;

/// ブロッキングスレッドでチャンクを処理する実行器
#[derive(Debug, Clone)]
pub struct InProcessExecutor {
    worker_count: usize,
}

impl InProcessExecutor {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }
}

#[async_trait]
impl ChunkExecutor for InProcessExecutor {
    async fn execute(
        &self,
        chunks: Vec<Chunk>,
        locator: &WorkloadLocator,
    ) -> RunResult<Vec<ChunkOutput>> {
        let chunk_count = chunks.len();
        if chunk_count == 0 {
            return Ok(Vec::new());
        }

        let queue: WorkQueue = Arc::new(Mutex::new(chunks.into_iter().collect()));
        let mut workers = JoinSet::new();
        for worker_id in 0..self.worker_count.min(chunk_count) {
            let queue = queue.clone();
            let locator = locator.clone();
            workers.spawn_blocking(move || drain_queue(worker_id, &locator, &queue));
        }

        let mut outputs = Vec::with_capacity(chunk_count);
        while let Some(joined) = workers.join_next().await {
            match joined.map_err(RunError::task).and_then(|r| r) {
                Ok(mut worker_outputs) => outputs.append(&mut worker_outputs),
                Err(e) => {
                    workers.shutdown().await;
                    return Err(e);
                }
            }
        }

        order_by_submission(chunk_count, outputs)
    }
}

fn drain_queue(worker_id: usize, locator: &WorkloadLocator, queue: &WorkQueue) -> RunResult<Vec<ChunkOutput>> {
    let workload = locator.load()?;
    let mut outputs = Vec::new();

    loop {
        let next = queue
            .lock()
            .map_err(|_| RunError::worker(worker_id, "work queue lock poisoned"))?
            .pop_front();
        let Some(chunk) = next else {
            break;
        };
        outputs.push(run_chunk(workload.as_ref(), &chunk));
    }

    Ok(outputs)
}
