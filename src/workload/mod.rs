// ワークロード読み込み層
// ロケーター文字列から画像1枚を処理する呼び出し可能オブジェクトを解決する
//
// 読み込みはワーカープロセスごとに独立して行われる。プラグインの初期化処理や
// マニフェストの読み込みといった副作用は、実行全体で1回ではなくワーカーごとに1回発生する。

pub mod builtin;
pub mod manifest;
pub mod plugin;

use crate::core::{Image, RunError, RunResult};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 組み込みワークロードを指すロケーターの接頭辞
pub const BUILTIN_PREFIX: &str = "builtin:";

/// 画像1枚を処理して結果を返すユーザーコード
pub trait Workload: Send + Sync {
    /// 画像を1枚処理する
    fn process(&self, image: &Image) -> anyhow::Result<Value>;

    /// 診断用の名前
    fn name(&self) -> &str;
}

impl Workload for Box<dyn Workload> {
    fn process(&self, image: &Image) -> anyhow::Result<Value> {
        self.as_ref().process(image)
    }

    fn name(&self) -> &str {
        self.as_ref().name()
    }
}

/// ワークロードの所在
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadLocator {
    /// `builtin:<name>` で指定される組み込みワークロード
    Builtin(String),
    /// エントリポイントとパラメータを記述したJSONマニフェスト
    Manifest(PathBuf),
    /// `image_parallel_process` を公開する動的ライブラリ
    Plugin(PathBuf),
}

impl WorkloadLocator {
    /// ロケーター文字列を解釈する
    pub fn parse(locator: &str) -> Self {
        if let Some(name) = locator.strip_prefix(BUILTIN_PREFIX) {
            return Self::Builtin(name.to_string());
        }

        let path = PathBuf::from(locator);
        if plugin::is_plugin_path(&path) {
            Self::Plugin(path)
        } else {
            Self::Manifest(path)
        }
    }

    /// 読み込まずに解決可能かどうかだけを確認する
    pub fn resolve(&self) -> RunResult<()> {
        match self {
            Self::Builtin(name) => {
                if builtin::is_registered(name) {
                    Ok(())
                } else {
                    Err(RunError::workload_load(
                        self.to_string(),
                        format!(
                            "unknown builtin workload '{name}' (available: {})",
                            builtin::REGISTERED.join(", ")
                        ),
                    ))
                }
            }
            Self::Manifest(path) | Self::Plugin(path) => self.ensure_file(path),
        }
    }

    /// ワークロードを読み込み、エントリポイントを検証する
    ///
    /// ワーカーごとに呼ばれる前提で、状態を共有しない。
    pub fn load(&self) -> RunResult<Box<dyn Workload>> {
        match self {
            Self::Builtin(name) => builtin::create(name, &Value::Null)
                .map_err(|reason| RunError::workload_load(self.to_string(), reason)),
            Self::Manifest(path) => manifest::load(path, &self.to_string()),
            Self::Plugin(path) => plugin::load(path, &self.to_string()),
        }
    }

    fn ensure_file(&self, path: &Path) -> RunResult<()> {
        if path.is_file() {
            Ok(())
        } else {
            Err(RunError::workload_load(
                self.to_string(),
                format!("{} is not a readable file", path.display()),
            ))
        }
    }
}

impl fmt::Display for WorkloadLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(name) => write!(f, "{BUILTIN_PREFIX}{name}"),
            Self::Manifest(path) | Self::Plugin(path) => write!(f, "{}", path.display()),
        }
    }
}

impl FromStr for WorkloadLocator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
