// 動的ライブラリによるワークロード
//
// プラグインは次のC ABIのエントリポイントを公開する必要がある:
//
//   int32_t image_parallel_process(const uint8_t *pixels, size_t len,
//                                  uint32_t width, uint32_t height,
//                                  uint8_t channels, double *out);
//
// 戻り値0で成功（`*out` が結果）、それ以外は画像単位の失敗として扱う。
// NaN・無限大の結果も画像単位の失敗になる。

use super::Workload;
use crate::core::{Image, RunError, RunResult};
use anyhow::bail;
use libloading::Library;
use serde_json::{json, Value};
use std::path::Path;

/// エントリポイントのシンボル名
pub const ENTRY_SYMBOL: &[u8] = b"image_parallel_process\0";

const PLUGIN_EXTENSIONS: &[&str] = &["so", "dylib", "dll"];

type ProcessEntry =
    unsafe extern "C" fn(*const u8, usize, u32, u32, u8, *mut f64) -> i32;

pub fn is_plugin_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| PLUGIN_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// 読み込み済みのプラグイン
pub struct PluginWorkload {
    name: String,
    entry: ProcessEntry,
    // `entry` はライブラリがロードされている間だけ有効
    _library: Library,
}

impl std::fmt::Debug for PluginWorkload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginWorkload").field("name", &self.name).finish()
    }
}

/// 動的ライブラリを読み込んでエントリポイントを検証
pub fn load(path: &Path, locator: &str) -> RunResult<Box<dyn Workload>> {
    // Safety: ライブラリの初期化処理はユーザーコードであり、ワーカープロセス内で実行される
    let library = unsafe { Library::new(path) }
        .map_err(|e| RunError::workload_load(locator, format!("failed to load library: {e}")))?;

    let entry = {
        // Safety: シンボルの型は上記ABIとして宣言されている
        let symbol = unsafe { library.get::<ProcessEntry>(ENTRY_SYMBOL) }.map_err(|e| {
            RunError::workload_contract(
                locator,
                format!("library does not export `image_parallel_process`: {e}"),
            )
        })?;
        *symbol
    };

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("plugin")
        .to_string();

    Ok(Box::new(PluginWorkload {
        name,
        entry,
        _library: library,
    }))
}

impl Workload for PluginWorkload {
    fn process(&self, image: &Image) -> anyhow::Result<Value> {
        let mut out = 0.0f64;
        // Safety: ポインタと長さは借用中の画像バッファを指し、`out` はこの関数のスタック上にある
        let status = unsafe {
            (self.entry)(
                image.pixels.as_ptr(),
                image.pixels.len(),
                image.width,
                image.height,
                image.channels,
                &mut out,
            )
        };
        plugin_result(&self.name, status, out)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// エントリポイントの戻り値を結果に変換
fn plugin_result(name: &str, status: i32, out: f64) -> anyhow::Result<Value> {
    if status != 0 {
        bail!("plugin {name} returned status {status}");
    }
    if !out.is_finite() {
        bail!("plugin {name} returned a non-finite value ({out})");
    }
    Ok(json!(out))
}
