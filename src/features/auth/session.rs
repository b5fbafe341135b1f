use serde::{Deserialize, Serialize};

use crate::shared::errors::{AppError, AppResult};

/// セッションストレージ内でログインユーザーを保持するキー
pub const USER_STORAGE_KEY: &str = "user";

/// ログインユーザーの種別
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Employee,
    Admin,
}

/// ログイン中のユーザー情報（読み取り専用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub email: String,
}

/// ログイン情報を保持するストレージ（ブラウザのlocalStorage相当）
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;
}

impl Session {
    pub fn new<S: Into<String>>(user_type: UserType, email: S) -> Self {
        Self {
            user_type,
            email: email.into(),
        }
    }

    /// 保存されたJSON文字列からセッションを復元する
    ///
    /// `password`や`status`など、その他のフィールドは無視する
    pub fn from_storage_value(value: &str) -> AppResult<Self> {
        let session: Session = serde_json::from_str(value).map_err(|e| {
            AppError::configuration(format!("セッション情報の解析に失敗しました: {e}"))
        })?;

        if session.email.trim().is_empty() {
            return Err(AppError::configuration(
                "セッションにメールアドレスがありません",
            ));
        }

        Ok(session)
    }

    /// ストレージからログインユーザーを読み込む
    pub fn load(storage: &dyn SessionStorage) -> AppResult<Self> {
        let value = storage.get_item(USER_STORAGE_KEY).ok_or_else(|| {
            AppError::configuration("ログインユーザーがストレージに見つかりません")
        })?;

        let session = Self::from_storage_value(&value)?;
        log::debug!(
            "セッションを読み込みました: type={:?}, email={}",
            session.user_type,
            session.email
        );
        Ok(session)
    }
}
