//! 従業員の経費精算（請求書）モジュール
//!
//! - 請求書一覧: 日付の新しい順での表示と証憑プレビュー
//! - 新規請求書: 証憑ファイルの検証・アップロードと請求書の保存
//!
//! ストア・画面遷移・セッションはすべて外部から注入する。

pub mod features;
pub mod shared;

pub use features::auth::{Session, SessionStorage, UserType};
pub use features::bills::{Bill, BillDraft, BillStatus, BillsController, BillsPage};
pub use features::navigation::{Navigator, Route};
pub use features::new_bill::{NewBillController, UploadState};
pub use features::store::{BillStore, HttpStore, InMemoryStore, StoreError};
pub use shared::{AppError, AppResult};

/// アプリケーション起動時の共通初期化
///
/// .envの読み込みとログシステムの初期化を行う
pub fn initialize() {
    shared::load_environment_variables();
    shared::initialize_logging_system();

    let env_config = shared::EnvironmentConfig::from_env();
    log::info!(
        "初期化が完了しました: environment={}, debug_mode={}",
        env_config.environment,
        env_config.debug_mode
    );
}
