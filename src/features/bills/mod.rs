/// 請求書一覧機能モジュール
///
/// このモジュールは請求書一覧画面に関連する機能を提供します：
/// - 請求書データモデル
/// - 日付の新しい順での並べ替えと表示用の行モデル
/// - 証憑画像のプレビュー
pub mod controller;
pub mod models;
pub mod view;

pub use controller::BillsController;
pub use models::{Bill, BillDraft, BillStatus};
pub use view::{
    proof_preview_html, rows, sort_by_date_desc, BillRow, BillsPage, EyeIcon, ProofModal,
    BILL_URL_ATTRIBUTE,
};
