// 高レベル公開API
// Driverを簡単に組み立てるためのヘルパー関数

use super::Driver;
use crate::{
    config::DefaultExecutionConfig,
    core::RunResult,
    dataset::{local::LocalDirectoryProvider, synthetic::SyntheticDatasetProvider, DatasetProvider},
    processing::ProcessPoolExecutor,
    reporting::{ConsoleProgressReporter, NoOpProgressReporter},
};

/// プロセスプールで実行するDriverの型
pub type ProcessDriver<D, R> = Driver<D, ProcessPoolExecutor, R, DefaultExecutionConfig>;

/// 設定に応じたデータセット取得元を選ぶ
///
/// ルートディレクトリが設定されていればローカルディレクトリ、なければ合成データセット。
pub fn provider_for(config: &DefaultExecutionConfig) -> Box<dyn DatasetProvider> {
    match config.dataset_root() {
        Some(root) => Box::new(LocalDirectoryProvider::new(root)),
        None => Box::new(SyntheticDatasetProvider::new()),
    }
}

/// Driver作成のヘルパー関数
///
/// コンソールへ進捗を出すプロセスプール構成
pub fn create_default_driver<D>(
    provider: D,
    config: DefaultExecutionConfig,
) -> RunResult<ProcessDriver<D, ConsoleProgressReporter>>
where
    D: DatasetProvider,
{
    config.validate()?;
    let executor = ProcessPoolExecutor::from_config(&config)?;
    Ok(Driver::new(provider, executor, ConsoleProgressReporter::new(), config))
}

/// Driver作成のヘルパー関数（静音版）
pub fn create_quiet_driver<D>(
    provider: D,
    config: DefaultExecutionConfig,
) -> RunResult<ProcessDriver<D, NoOpProgressReporter>>
where
    D: DatasetProvider,
{
    config.validate()?;
    let executor = ProcessPoolExecutor::from_config(&config)?;
    Ok(Driver::new(provider, executor, NoOpProgressReporter::new(), config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ExecutionConfig, RunError};
    use std::path::PathBuf;

    #[test]
    fn test_create_default_driver() {
        let config = DefaultExecutionConfig::new()
            .with_worker_count(3)
            .with_worker_program("/opt/image_parallel");
        let driver = create_default_driver(SyntheticDatasetProvider::new(), config).unwrap();

        assert_eq!(driver.config().worker_count(), 3);
        assert_eq!(driver.executor().config().worker_count, 3);
        assert_eq!(driver.executor().config().program, PathBuf::from("/opt/image_parallel"));
        assert!(!driver.reporter().is_quiet());
    }

    #[test]
    fn test_create_quiet_driver_rejects_zero_workers() {
        let config = DefaultExecutionConfig::new().with_worker_count(0);
        let result = create_quiet_driver(SyntheticDatasetProvider::new(), config);

        assert!(matches!(result, Err(RunError::ConfigurationError { .. })));
    }

    #[test]
    fn test_provider_for_dataset_root() {
        let synthetic = provider_for(&DefaultExecutionConfig::new());
        assert_eq!(synthetic.provider_name(), "synthetic");

        let local = provider_for(&DefaultExecutionConfig::new().with_dataset_root("/data"));
        assert_eq!(local.provider_name(), "local-directory");
    }
}
