// 組み込みワークロード
// `builtin:<name>` とマニフェストの `entry` から参照される

use super::Workload;
use crate::core::Image;
use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

/// 登録済みのエントリポイント名
pub const REGISTERED: &[&str] = &["sum", "mean", "histogram", "gaussian_blur"];

const DEFAULT_BLUR_SIGMA: f32 = 2.0;

pub fn is_registered(name: &str) -> bool {
    REGISTERED.contains(&name)
}

/// 名前とパラメータからワークロードを作成
///
/// エラーは理由の文字列で返し、呼び出し側がエラー種別を決める。
pub fn create(name: &str, params: &Value) -> std::result::Result<Box<dyn Workload>, String> {
    match name {
        "sum" => Ok(Box::new(PixelSum)),
        "mean" => Ok(Box::new(MeanIntensity)),
        "histogram" => Ok(Box::new(IntensityHistogram)),
        "gaussian_blur" => GaussianBlur::from_params(params).map(|w| Box::new(w) as Box<dyn Workload>),
        other => Err(format!(
            "unknown entry point '{other}' (available: {})",
            REGISTERED.join(", ")
        )),
    }
}

fn ensure_pixels(image: &Image) -> Result<()> {
    if image.is_empty() {
        bail!("image {} has no pixel data", image.id);
    }
    Ok(())
}

/// 全画素値の合計
#[derive(Debug, Clone, Copy)]
pub struct PixelSum;

impl Workload for PixelSum {
    fn process(&self, image: &Image) -> Result<Value> {
        ensure_pixels(image)?;
        Ok(json!(image.pixel_sum()))
    }

    fn name(&self) -> &str {
        "sum"
    }
}

/// 平均輝度
#[derive(Debug, Clone, Copy)]
pub struct MeanIntensity;

impl Workload for MeanIntensity {
    fn process(&self, image: &Image) -> Result<Value> {
        ensure_pixels(image)?;
        Ok(json!(image.pixel_sum() as f64 / image.pixels.len() as f64))
    }

    fn name(&self) -> &str {
        "mean"
    }
}

/// 256ビンの輝度ヒストグラム（全チャンネル合算）
#[derive(Debug, Clone, Copy)]
pub struct IntensityHistogram;

impl Workload for IntensityHistogram {
    fn process(&self, image: &Image) -> Result<Value> {
        let mut bins = vec![0u64; 256];
        for &pixel in &image.pixels {
            bins[pixel as usize] += 1;
        }
        Ok(json!(bins))
    }

    fn name(&self) -> &str {
        "histogram"
    }
}

/// ガウシアンぼかし（ぼかした画像を返す）
#[derive(Debug, Clone, Copy)]
pub struct GaussianBlur {
    sigma: f32,
}

impl GaussianBlur {
    pub fn new(sigma: f32) -> std::result::Result<Self, String> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(format!("sigma must be a positive number, got {sigma}"));
        }
        Ok(Self { sigma })
    }

    fn from_params(params: &Value) -> std::result::Result<Self, String> {
        match params.get("sigma") {
            None | Some(Value::Null) => Self::new(DEFAULT_BLUR_SIGMA),
            Some(value) => match value.as_f64() {
                Some(sigma) => Self::new(sigma as f32),
                None => Err(format!("sigma must be a number, got {value}")),
            },
        }
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }
}

impl Workload for GaussianBlur {
    fn process(&self, image: &Image) -> Result<Value> {
        ensure_pixels(image)?;
        let dynamic = image
            .to_dynamic_image()
            .with_context(|| format!("unsupported channel count {}", image.channels))?;
        let blurred = Image::from_dynamic_image(image.id.clone(), dynamic.blur(self.sigma));
        Ok(serde_json::to_value(blurred)?)
    }

    fn name(&self) -> &str {
        "gaussian_blur"
    }
}
