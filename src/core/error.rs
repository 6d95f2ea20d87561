// 並列実行コアのエラー型定義
// 致命的エラー（実行中断）と画像単位エラー（ワーカー内で回復）を区別する

use thiserror::Error;

/// 並列実行のエラー型
#[derive(Error, Debug)]
pub enum RunError {
    #[error("ワークロード読み込みエラー: {locator} - {reason}")]
    WorkloadLoadError { locator: String, reason: String },

    #[error("ワークロード契約エラー: {locator} - {reason}")]
    WorkloadContractError { locator: String, reason: String },

    #[error("データセットが空です: {dataset_id}")]
    EmptyDatasetError { dataset_id: String },

    #[error("画像処理エラー: {image_id} (index {index}) - {reason}")]
    ImageProcessingError {
        index: usize,
        image_id: String,
        reason: String,
    },

    #[error("データセット取得エラー: {dataset_id} - {source}")]
    DatasetRetrievalError {
        dataset_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("ワーカーエラー: worker {worker_id} - {message}")]
    WorkerError { worker_id: usize, message: String },

    #[error("プロトコルエラー: {message}")]
    ProtocolError { message: String },

    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error("タスクエラー: {source}")]
    TaskError {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl RunError {
    /// ワークロード読み込みエラーの作成
    pub fn workload_load(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WorkloadLoadError {
            locator: locator.into(),
            reason: reason.into(),
        }
    }

    /// ワークロード契約エラーの作成
    pub fn workload_contract(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WorkloadContractError {
            locator: locator.into(),
            reason: reason.into(),
        }
    }

    pub fn empty_dataset(dataset_id: impl Into<String>) -> Self {
        Self::EmptyDatasetError {
            dataset_id: dataset_id.into(),
        }
    }

    /// 画像処理エラーの作成
    pub fn image_processing(
        index: usize,
        image_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ImageProcessingError {
            index,
            image_id: image_id.into(),
            reason: reason.into(),
        }
    }

    pub fn dataset_retrieval(dataset_id: impl Into<String>, source: anyhow::Error) -> Self {
        Self::DatasetRetrievalError {
            dataset_id: dataset_id.into(),
            source,
        }
    }

    /// ワーカーエラーの作成
    pub fn worker(worker_id: usize, message: impl Into<String>) -> Self {
        Self::WorkerError {
            worker_id,
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::TaskError { source }
    }

    /// 実行全体を中断させるエラーかどうか
    ///
    /// 画像単位のエラーだけがワーカー内で回復される。
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ImageProcessingError { .. })
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ImageProcessingError { .. } => ErrorSeverity::Low,
            Self::EmptyDatasetError { .. } | Self::DatasetRetrievalError { .. } => {
                ErrorSeverity::Medium
            }
            Self::WorkloadLoadError { .. }
            | Self::WorkloadContractError { .. }
            | Self::ConfigurationError { .. } => ErrorSeverity::High,
            Self::WorkerError { .. } | Self::ProtocolError { .. } | Self::TaskError { .. } => {
                ErrorSeverity::Critical
            }
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - 画像単位で回復済み
    Low,
    /// 中重要度 - 入力データの問題
    Medium,
    /// 高重要度 - ワークロードまたは設定の問題
    High,
    /// 致命的 - ワーカープール自体の障害
    Critical,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// 並列実行の結果型
pub type RunResult<T> = std::result::Result<T, RunError>;
