/// 請求書ストア機能モジュール
///
/// 請求書レコードと証憑ファイルを保存する外部サービスへのインターフェースを定義します。
/// - `HttpStore`: 請求書APIへのHTTPクライアント
/// - `InMemoryStore`: 開発・テスト用のメモリ上のストア
pub mod http;
pub mod memory;

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::bills::{Bill, BillDraft};
use crate::features::new_bill::SelectedFile;

pub use http::HttpStore;
pub use memory::InMemoryStore;

/// ストア操作のエラー
///
/// 表示文字列はエラーページにそのまま出力される
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Erreur {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Erreur réseau: {0}")]
    Network(String),

    #[error("Réponse invalide: {0}")]
    Decode(String),

    #[error("{0}")]
    Rejected(String),
}

impl StoreError {
    /// HTTPステータスを持つエラーの場合はその値
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 証憑アップロードのペイロード（multipart: `file`と`email`）
#[derive(Debug, Clone, PartialEq)]
pub struct ProofUpload {
    pub file: SelectedFile,
    pub email: String,
}

/// 証憑アップロードの応答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProof {
    pub file_url: String,
    /// 作成された請求書のID
    pub key: String,
}

/// 請求書の保存要求
///
/// `selector`がある場合は既存レコードの更新、ない場合は新規作成
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub bill: BillDraft,
    pub selector: Option<String>,
}

/// 請求書ストア
pub trait BillStore: Send + Sync {
    /// 請求書一覧を取得する（順序は保証されない）
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<Bill>>>;

    /// 証憑ファイルをアップロードし、請求書レコードを作成する
    ///
    /// # 引数
    /// * `upload` - 証憑ファイルと所有者のメールアドレス
    ///
    /// # 戻り値
    /// 保存先URLと作成された請求書のID
    fn create(&self, upload: ProofUpload) -> BoxFuture<'_, StoreResult<CreatedProof>>;

    /// 請求書を保存する
    ///
    /// # 引数
    /// * `request` - 保存する請求書と、更新対象のID（新規作成時は`None`）
    ///
    /// # 戻り値
    /// 保存後の請求書レコード
    fn update(&self, request: UpdateRequest) -> BoxFuture<'_, StoreResult<Bill>>;
}

impl<T: BillStore + ?Sized> BillStore for Arc<T> {
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<Bill>>> {
        (**self).list()
    }

    fn create(&self, upload: ProofUpload) -> BoxFuture<'_, StoreResult<CreatedProof>> {
        (**self).create(upload)
    }

    fn update(&self, request: UpdateRequest) -> BoxFuture<'_, StoreResult<Bill>> {
        (**self).update(request)
    }
}
