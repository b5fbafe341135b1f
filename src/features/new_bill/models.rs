use std::path::Path;

use serde::{Deserialize, Serialize};

use super::validation::content_type_for;
use crate::shared::errors::AppResult;

/// 新規請求書フォームの経費種別
pub const EXPENSE_TYPES: [&str; 7] = [
    "Transports",
    "Restaurants et bars",
    "Hôtel et logement",
    "Services en ligne",
    "IT et électronique",
    "Equipement et matériel",
    "Fournitures de bureau",
];

/// VAT率が未入力の場合の既定値
pub const DEFAULT_VAT_PCT: i64 = 20;

/// ファイル入力で選択された証憑ファイル
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    /// 選択時のファイル名（`C:\fakepath\facture.png`のようなパスを含む場合がある）
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new<N: Into<String>, C: Into<String>>(name: N, content_type: C, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// ディスク上のファイルを読み込む。Content-Typeは拡張子から推定する
    pub fn from_path<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path.to_string_lossy().into_owned();
        let content_type = content_type_for(&name).to_string();

        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    /// パス区切り（`\`と`/`）を除いたファイル名
    pub fn base_name(&self) -> &str {
        self.name
            .rsplit(|c| c == '\\' || c == '/')
            .next()
            .unwrap_or(self.name.as_str())
    }
}

/// ファイル入力コントロール
pub trait FileInput {
    /// 入力値を空にする
    fn clear(&mut self);
}

/// ユーザーへの警告表示（ブラウザのalert相当）
pub trait Alert: Send + Sync {
    fn alert(&self, message: &str);
}

/// ファイル選択イベント
pub struct FileChangeEvent<'a> {
    pub file: Option<SelectedFile>,
    pub input: &'a mut dyn FileInput,
}

impl<'a> FileChangeEvent<'a> {
    pub fn new(file: Option<SelectedFile>, input: &'a mut dyn FileInput) -> Self {
        Self { file, input }
    }
}

/// 新規請求書フォームの入力値（すべて文字列のまま）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillForm {
    pub expense_type: String,
    pub name: String,
    pub amount: String,
    pub date: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

/// フォーム送信イベント
#[derive(Debug, Clone)]
pub struct SubmitEvent {
    pub form: BillForm,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(form: BillForm) -> Self {
        Self {
            form,
            default_prevented: false,
        }
    }

    /// ブラウザ既定の画面遷移を抑止する
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// アップロード完了後に得られる証憑情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedProof {
    pub file_url: String,
    pub file_name: String,
    pub bill_id: String,
}

/// 証憑アップロードの状態
///
/// `previous`には直前に完了したアップロードを保持し、
/// 進行中・失敗中でも既存の証憑情報を失わない
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UploadState {
    #[default]
    NotStarted,
    InFlight {
        file_name: String,
        previous: Option<UploadedProof>,
    },
    Completed(UploadedProof),
    Failed {
        error: String,
        previous: Option<UploadedProof>,
    },
}

impl UploadState {
    /// 送信時に使用する証憑情報
    pub fn proof(&self) -> Option<&UploadedProof> {
        match self {
            UploadState::NotStarted => None,
            UploadState::Completed(proof) => Some(proof),
            UploadState::InFlight { previous, .. } | UploadState::Failed { previous, .. } => {
                previous.as_ref()
            }
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, UploadState::InFlight { .. })
    }
}

/// 新規請求書画面の進行状況
///
/// 直近のイベントで決まる。形式エラー・アップロード失敗はどちらも`Idle`に戻すが、
/// 以前に完了した証憑は`UploadState`側に残り、送信時に使用される
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewBillPhase {
    Idle,
    FileSelected,
    FileUploaded,
    Submitted,
}
