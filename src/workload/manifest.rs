// JSONマニフェストによるワークロード定義
//
// {"entry": "gaussian_blur", "params": {"sigma": 2.0}}

use super::{builtin, Workload};
use crate::core::{RunError, RunResult};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// マニフェストファイルの内容
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadManifest {
    /// 呼び出すエントリポイント名
    pub entry: Option<String>,
    #[serde(default)]
    pub params: Value,
}

/// マニフェストを読み込んでワークロードを作成
///
/// 読めない・JSONとして壊れている場合は読み込みエラー、
/// エントリポイントが無い・未登録・パラメータ不正の場合は契約エラー。
pub fn load(path: &Path, locator: &str) -> RunResult<Box<dyn Workload>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| RunError::workload_load(locator, format!("failed to read manifest: {e}")))?;

    let manifest: WorkloadManifest = serde_json::from_str(&content)
        .map_err(|e| RunError::workload_load(locator, format!("invalid manifest: {e}")))?;

    let entry = manifest
        .entry
        .as_deref()
        .ok_or_else(|| RunError::workload_contract(locator, "manifest does not declare an `entry`"))?;

    builtin::create(entry, &manifest.params).map_err(|reason| RunError::workload_contract(locator, reason))
}
