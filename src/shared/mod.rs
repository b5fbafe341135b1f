/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有設定管理
pub mod config;

/// 共有ユーティリティ関数
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// 便利な再エクスポート
pub use config::{
    get_environment, initialize_logging_system, load_environment_variables, Environment,
    EnvironmentConfig, StoreConfig,
};
pub use errors::{AppError, AppResult, ErrorSeverity};
