// エンジン層 - 実行全体のオーケストレーション
// データセット取得・分割・並列実行・集約を組み合わせる

pub mod api;
pub mod driver;

// 公開API
pub use api::{create_default_driver, create_quiet_driver, provider_for, ProcessDriver};
pub use driver::Driver;
