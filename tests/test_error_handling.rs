// エラーハンドリングの統合テスト
// 致命的エラーは部分結果を返さずに実行全体を失敗させる
mod fixtures;

use fixtures::{numbered_images, process_config, write_manifest, FixedDatasetProvider};
use image_parallel::{
    engine::create_quiet_driver, DatasetId, Driver, InProcessExecutor, NoOpProgressReporter,
    RunError, WorkloadLocator,
};
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_manifest_without_entry_is_contract_error() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = write_manifest(temp_dir.path(), "no_entry.json", r#"{"params": {}}"#);

    let provider = FixedDatasetProvider::new(numbered_images(4, None));
    let driver = create_quiet_driver(provider, process_config(2)).unwrap();

    let error = driver
        .run(
            &WorkloadLocator::parse(manifest.to_str().unwrap()),
            &DatasetId::from("1"),
        )
        .await
        .unwrap_err();

    assert!(
        matches!(error, RunError::WorkloadContractError { ref reason, .. } if reason.contains("entry")),
        "unexpected error: {error:?}"
    );
    assert!(error.is_fatal());
}

#[tokio::test]
async fn test_manifest_with_unknown_entry_is_contract_error() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = write_manifest(temp_dir.path(), "median.json", r#"{"entry": "median"}"#);

    let provider = FixedDatasetProvider::new(numbered_images(3, None));
    let driver = create_quiet_driver(provider, process_config(3)).unwrap();

    let error = driver
        .run(
            &WorkloadLocator::parse(manifest.to_str().unwrap()),
            &DatasetId::from("1"),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, RunError::WorkloadContractError { .. }));
}

#[tokio::test]
async fn test_contract_error_is_the_same_in_process() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = write_manifest(temp_dir.path(), "no_entry.json", "{}");

    let driver = Driver::new(
        FixedDatasetProvider::new(numbered_images(4, None)),
        InProcessExecutor::new(2),
        NoOpProgressReporter::new(),
        process_config(2),
    );
    let error = driver
        .run(
            &WorkloadLocator::parse(manifest.to_str().unwrap()),
            &DatasetId::from("1"),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, RunError::WorkloadContractError { .. }));
}

#[tokio::test]
async fn test_missing_manifest_is_load_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.json");

    let provider = FixedDatasetProvider::new(numbered_images(2, None));
    let driver = create_quiet_driver(provider, process_config(2)).unwrap();

    let error = driver
        .run(
            &WorkloadLocator::parse(missing.to_str().unwrap()),
            &DatasetId::from("1"),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, RunError::WorkloadLoadError { .. }));
}

#[tokio::test]
async fn test_invalid_plugin_library_is_load_error() {
    let temp_dir = TempDir::new().unwrap();
    let plugin = temp_dir.path().join("libbogus.so");
    fs::write(&plugin, "not a shared library").unwrap();

    let provider = FixedDatasetProvider::new(numbered_images(2, None));
    let driver = create_quiet_driver(provider, process_config(2)).unwrap();

    let error = driver
        .run(
            &WorkloadLocator::parse(plugin.to_str().unwrap()),
            &DatasetId::from("1"),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, RunError::WorkloadLoadError { .. }));
}

#[tokio::test]
async fn test_empty_dataset_is_rejected() {
    let provider = FixedDatasetProvider::new(Vec::new());
    let driver = create_quiet_driver(provider, process_config(2)).unwrap();

    let error = driver
        .run(&WorkloadLocator::parse("builtin:sum"), &DatasetId::from("none"))
        .await
        .unwrap_err();

    assert!(matches!(error, RunError::EmptyDatasetError { .. }));
    assert!(error.to_string().contains("none"));
}

#[tokio::test]
async fn test_unknown_builtin_is_rejected_before_dispatch() {
    let provider = FixedDatasetProvider::new(numbered_images(2, None));
    let driver = create_quiet_driver(provider, process_config(2)).unwrap();

    let error = driver
        .run(&WorkloadLocator::parse("builtin:median"), &DatasetId::from("1"))
        .await
        .unwrap_err();

    assert!(matches!(error, RunError::WorkloadLoadError { ref reason, .. } if reason.contains("median")));
}
