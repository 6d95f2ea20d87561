// ワーカープロセスとのIPCプロトコル
// メッセージは1行1件のJSON

use crate::core::{Chunk, ChunkOutput, Image, RunError, RunResult};
use serde::{Deserialize, Serialize};

/// 親からワーカーへの要求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerRequest {
    /// チャンクを処理する
    ProcessChunk { chunk: Chunk<Image> },

    /// 正常終了の要求
    Exit,
}

/// ワークロード読み込み失敗の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailureKind {
    /// ロケーターを読み込めない
    Load,
    /// エントリポイントが契約を満たさない
    Contract,
}

/// ワーカーから親への応答
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerResponse {
    /// ワークロードを読み込み、作業を受け付けられる
    Ready,

    /// ワークロードの読み込みに失敗した（ワーカーはこの後終了する）
    LoadFailed { kind: LoadFailureKind, reason: String },

    /// チャンクの処理結果
    ChunkDone { output: ChunkOutput },

    /// 要求を処理できなかった
    Error { message: String },
}

impl WorkerRequest {
    pub fn process_chunk(chunk: Chunk<Image>) -> Self {
        Self::ProcessChunk { chunk }
    }

    /// JSON行に変換（改行付き）
    pub fn to_line(&self) -> RunResult<String> {
        to_line(self)
    }

    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}

impl WorkerResponse {
    /// 読み込みエラーから失敗応答を作成
    pub fn load_failed(error: &RunError) -> Self {
        let (kind, reason) = match error {
            RunError::WorkloadContractError { reason, .. } => (LoadFailureKind::Contract, reason.clone()),
            RunError::WorkloadLoadError { reason, .. } => (LoadFailureKind::Load, reason.clone()),
            other => (LoadFailureKind::Load, other.to_string()),
        };
        Self::LoadFailed { kind, reason }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// 失敗応答を親側のエラーへ戻す
    pub fn into_load_error(kind: LoadFailureKind, locator: &str, reason: String) -> RunError {
        match kind {
            LoadFailureKind::Load => RunError::workload_load(locator, reason),
            LoadFailureKind::Contract => RunError::workload_contract(locator, reason),
        }
    }

    pub fn to_line(&self) -> RunResult<String> {
        to_line(self)
    }

    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}

fn to_line<T: Serialize>(message: &T) -> RunResult<String> {
    let mut json = serde_json::to_string(message)
        .map_err(|e| RunError::protocol(format!("failed to encode message: {e}")))?;
    json.push('\n');
    Ok(json)
}
