// 実行設定
// 既定値はCPUコア数から決まり、環境変数で上書きできる

use crate::core::{ExecutionConfig, RunError, RunResult};
use std::path::PathBuf;

/// ワーカー数を上書きする環境変数
pub const ENV_WORKERS: &str = "IMAGE_PARALLEL_WORKERS";
/// ワーカーとして起動するプログラムを上書きする環境変数
pub const ENV_WORKER_PROGRAM: &str = "IMAGE_PARALLEL_WORKER_PROGRAM";
/// ローカルディレクトリのデータセットを使う場合のルート
pub const ENV_DATASET_ROOT: &str = "IMAGE_PARALLEL_DATASET_ROOT";

/// 利用可能なコア数（1未満にはならない）
pub fn detect_worker_count() -> usize {
    num_cpus::get().max(1)
}

/// デフォルト設定実装
#[derive(Debug, Clone)]
pub struct DefaultExecutionConfig {
    worker_count: usize,
    worker_program: Option<PathBuf>,
    dataset_root: Option<PathBuf>,
    enable_progress: bool,
}

impl Default for DefaultExecutionConfig {
    fn default() -> Self {
        Self {
            worker_count: detect_worker_count(),
            worker_program: None,
            dataset_root: None,
            enable_progress: true,
        }
    }
}

impl DefaultExecutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_worker_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.worker_program = Some(program.into());
        self
    }

    pub fn with_dataset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.dataset_root = Some(root.into());
        self
    }

    pub fn with_progress_reporting(mut self, enable: bool) -> Self {
        self.enable_progress = enable;
        self
    }

    pub fn dataset_root(&self) -> Option<&PathBuf> {
        self.dataset_root.as_ref()
    }

    /// 環境変数から設定を読み込む
    pub fn from_env() -> RunResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み込む（テスト用に分離）
    pub fn from_lookup<F>(lookup: F) -> RunResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_WORKERS) {
            let count = raw.trim().parse::<usize>().map_err(|e| {
                RunError::configuration(format!("{ENV_WORKERS} must be a positive integer: {e}"))
            })?;
            config = config.with_worker_count(count);
        }
        if let Some(program) = lookup(ENV_WORKER_PROGRAM).filter(|p| !p.is_empty()) {
            config = config.with_worker_program(program);
        }
        if let Some(root) = lookup(ENV_DATASET_ROOT).filter(|p| !p.is_empty()) {
            config = config.with_dataset_root(root);
        }

        config.validate()?;
        Ok(config)
    }

    /// 設定の検証
    pub fn validate(&self) -> RunResult<()> {
        if self.worker_count == 0 {
            return Err(RunError::configuration("ワーカー数は1以上である必要があります"));
        }
        Ok(())
    }
}

impl ExecutionConfig for DefaultExecutionConfig {
    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn worker_program(&self) -> RunResult<PathBuf> {
        match &self.worker_program {
            Some(program) => Ok(program.clone()),
            None => std::env::current_exe().map_err(|e| {
                RunError::configuration(format!("failed to locate current executable: {e}"))
            }),
        }
    }

    fn enable_progress_reporting(&self) -> bool {
        self.enable_progress
    }
}
