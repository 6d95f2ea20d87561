pub mod cli;
pub mod config;
pub mod core;
pub mod dataset;
pub mod engine;
pub mod logging;
pub mod processing;
pub mod reporting;
pub mod workload;

// よく使う型の再エクスポート
pub use config::DefaultExecutionConfig;
pub use crate::core::{
    Chunk, ChunkExecutor, DatasetId, ExecutionConfig, Image, ImageFailure, ImageOutcome,
    ProgressReporter, ResultSet, RunError, RunResult,
};
pub use dataset::{local::LocalDirectoryProvider, synthetic::SyntheticDatasetProvider, DatasetProvider};
pub use engine::Driver;
pub use processing::{InProcessExecutor, ProcessPoolExecutor, WorkerPoolConfig};
pub use reporting::{ConsoleProgressReporter, NoOpProgressReporter};
pub use workload::{Workload, WorkloadLocator};
