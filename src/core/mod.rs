// コアレイヤー - 基盤となるトレイト、型、エラー定義
// 他のレイヤーから参照される基本的な抽象化を提供

pub mod error;
pub mod traits;
pub mod types;

// 公開API
pub use error::{ErrorSeverity, RunError, RunResult};
pub use traits::{
    ChunkExecutor, ExecutionConfig, MockChunkExecutor, MockExecutionConfig, MockProgressReporter,
    ProgressReporter,
};
pub use types::{
    Chunk, ChunkOutput, DatasetId, Image, ImageFailure, ImageOutcome, ResultSet,
};
