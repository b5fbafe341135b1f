// メモリ上の請求書ストア（開発・テスト用）

use std::sync::{Mutex, MutexGuard};

use futures::future::{self, BoxFuture};
use log::debug;

use super::{BillStore, CreatedProof, ProofUpload, StoreError, StoreResult, UpdateRequest};
use crate::features::bills::{Bill, BillStatus};

const DEFAULT_FILE_BASE_URL: &str = "https://localhost:3456/images";

/// 各操作に注入する失敗
#[derive(Debug, Default, Clone)]
struct InjectedFailures {
    list: Option<StoreError>,
    create: Option<StoreError>,
    update: Option<StoreError>,
}

/// 受け付けたアップロードの記録
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpload {
    pub file_name: String,
    pub content_type: String,
    pub email: String,
}

#[derive(Debug, Default)]
struct StoreState {
    bills: Vec<Bill>,
    uploads: Vec<RecordedUpload>,
    updates: Vec<UpdateRequest>,
    failures: InjectedFailures,
}

/// メモリ上で請求書を保持するストア
#[derive(Debug)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    file_base_url: String,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            file_base_url: DEFAULT_FILE_BASE_URL.to_string(),
        }
    }

    /// 既存の請求書を持つストアを作成する
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        let store = Self::new();
        store.lock().bills = bills;
        store
    }

    /// 証憑URLのベースを変更する
    pub fn with_file_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.file_base_url = base_url.into();
        self
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // テスト中のパニックで汚染されても内容はそのまま使う
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 一覧取得を失敗させる（`None`で解除）
    pub fn fail_list(&self, error: Option<StoreError>) {
        self.lock().failures.list = error;
    }

    /// 証憑アップロードを失敗させる（`None`で解除）
    pub fn fail_create(&self, error: Option<StoreError>) {
        self.lock().failures.create = error;
    }

    /// 請求書の保存を失敗させる（`None`で解除）
    pub fn fail_update(&self, error: Option<StoreError>) {
        self.lock().failures.update = error;
    }

    pub fn bills(&self) -> Vec<Bill> {
        self.lock().bills.clone()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.lock().uploads.clone()
    }

    pub fn updates(&self) -> Vec<UpdateRequest> {
        self.lock().updates.clone()
    }

    fn list_now(&self) -> StoreResult<Vec<Bill>> {
        let state = self.lock();
        if let Some(error) = &state.failures.list {
            return Err(error.clone());
        }
        Ok(state.bills.clone())
    }

    fn create_now(&self, upload: ProofUpload) -> StoreResult<CreatedProof> {
        let mut state = self.lock();
        if let Some(error) = &state.failures.create {
            return Err(error.clone());
        }

        let key = uuid::Uuid::new_v4().to_string();
        let file_name = upload.file.base_name().to_string();
        let file_url = format!("{}/{}/{}", self.file_base_url, key, file_name);

        state.uploads.push(RecordedUpload {
            file_name: file_name.clone(),
            content_type: upload.file.content_type.clone(),
            email: upload.email.clone(),
        });

        // アップロード時点で証憑のみを持つ請求書が作られる
        state.bills.push(Bill {
            id: key.clone(),
            email: upload.email,
            bill_type: String::new(),
            name: String::new(),
            amount: 0,
            date: String::new(),
            vat: String::new(),
            pct: 0,
            commentary: String::new(),
            file_url: Some(file_url.clone()),
            file_name: Some(file_name),
            status: BillStatus::Pending,
            comment_admin: None,
        });

        debug!("証憑を保存しました: key={key}");
        Ok(CreatedProof { file_url, key })
    }

    fn update_now(&self, request: UpdateRequest) -> StoreResult<Bill> {
        let mut state = self.lock();
        if let Some(error) = &state.failures.update {
            return Err(error.clone());
        }
        state.updates.push(request.clone());

        match request.selector {
            Some(id) => {
                let existing = state
                    .bills
                    .iter_mut()
                    .find(|bill| bill.id == id)
                    .ok_or_else(|| StoreError::Http {
                        status: 404,
                        message: format!("Bill {id} not found"),
                    })?;

                let updated = request
                    .bill
                    .into_bill(id, existing.comment_admin.clone());
                *existing = updated.clone();
                Ok(updated)
            }
            None => {
                let bill = request
                    .bill
                    .into_bill(uuid::Uuid::new_v4().to_string(), None);
                state.bills.push(bill.clone());
                Ok(bill)
            }
        }
    }
}

impl BillStore for InMemoryStore {
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<Bill>>> {
        Box::pin(future::ready(self.list_now()))
    }

    fn create(&self, upload: ProofUpload) -> BoxFuture<'_, StoreResult<CreatedProof>> {
        Box::pin(future::ready(self.create_now(upload)))
    }

    fn update(&self, request: UpdateRequest) -> BoxFuture<'_, StoreResult<Bill>> {
        Box::pin(future::ready(self.update_now(request)))
    }
}
