/// 新規請求書機能モジュール
///
/// このモジュールは新規請求書の作成に関連するすべての機能を提供します：
/// - 証憑ファイルの形式検証（JPG/JPEG/PNG）
/// - 証憑の非同期アップロードと状態管理
/// - フォーム入力からの請求書の組み立てと保存
pub mod controller;
pub mod models;
pub mod validation;

pub use controller::NewBillController;
pub use models::{
    Alert, BillForm, FileChangeEvent, FileInput, NewBillPhase, SelectedFile, SubmitEvent,
    UploadState, UploadedProof, DEFAULT_VAT_PCT, EXPENSE_TYPES,
};
pub use validation::{
    content_type_for, validate_proof_file, ALLOWED_PROOF_EXTENSIONS, INVALID_PROOF_MESSAGE,
};
