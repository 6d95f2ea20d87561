// 並列処理層
// 分割 → ワーカー実行 → 集約 の各段階を提供

pub mod aggregator;
pub mod chunk_runner;
pub mod in_process;
pub mod partitioner;
pub mod pool;
pub mod protocol;
pub mod worker_main;
pub mod worker_process;

// 公開API
pub use aggregator::{flatten, order_by_submission};
pub use chunk_runner::run_chunk;
pub use in_process::InProcessExecutor;
pub use partitioner::{chunk_size, partition};
pub use pool::{ProcessPoolExecutor, WorkerPoolConfig};
pub use worker_main::run_worker_main;
pub use worker_process::INTERNAL_WORKER_FLAG;
