// ロギング設定
// ドライバーとワーカーの診断ログは常に標準エラーへ出す。
// ドライバーの標準出力は進捗表示、ワーカーの標準出力はプロトコル専用。
//
// 環境変数:
//   IMAGE_PARALLEL_LOG         ログフィルタ（RUST_LOG より優先）
//   IMAGE_PARALLEL_LOG_FORMAT  出力形式: pretty, compact, json

use std::str::FromStr;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const ENV_LOG: &str = "IMAGE_PARALLEL_LOG";
pub const ENV_LOG_FORMAT: &str = "IMAGE_PARALLEL_LOG_FORMAT";

/// ログ出力形式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 複数行の読みやすい形式
    Pretty,
    /// 1行形式
    #[default]
    Compact,
    /// ログ集約向けのJSON
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "full" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Unknown log format: '{}'. Valid options: pretty, compact, json",
                s
            )),
        }
    }
}

/// ロギング設定
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 環境変数が無い時のフィルタ
    pub default_filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_filter: "warn".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LogConfig {
    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    /// `IMAGE_PARALLEL_LOG_FORMAT` が有効な値なら反映する
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(format) = std::env::var(ENV_LOG_FORMAT)
            .ok()
            .and_then(|f| f.parse().ok())
        {
            self.format = format;
        }
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(ENV_LOG)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(&self.default_filter))
    }
}

/// グローバルなサブスクライバーを設定（複数回呼んでもよい）
pub fn init(config: LogConfig) {
    let registry = tracing_subscriber::registry().with(config.filter());

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    // 2回目以降の呼び出し（テストなど）では既存のサブスクライバーを使う
    if let Err(e) = result {
        tracing::debug!("Logging already initialized: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(LogConfig::default());
        init(LogConfig::default().with_default_filter("debug"));
    }
}
