/// 機能別モジュール
///
/// 各機能モジュールは、その機能に関連するモデル・コントローラー・検証処理を含む
/// 自己完結型のユニットです。
pub mod auth;
pub mod bills;
pub mod navigation;
pub mod new_bill;
pub mod store;
