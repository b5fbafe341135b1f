use std::sync::Arc;

use log::{debug, error, info, warn};

use super::models::{
    Alert, BillForm, FileChangeEvent, NewBillPhase, SubmitEvent, UploadState, UploadedProof,
    DEFAULT_VAT_PCT,
};
use super::validation::{validate_proof_file, INVALID_PROOF_MESSAGE};
use crate::features::auth::Session;
use crate::features::bills::{BillDraft, BillStatus};
use crate::features::navigation::{Navigator, Route};
use crate::features::store::{BillStore, CreatedProof, ProofUpload, StoreResult, UpdateRequest};
use crate::shared::errors::{log_error, AppError, AppResult};
use crate::shared::utils::parse_int_prefix;

/// 新規請求書画面のコントローラー
///
/// 証憑のアップロード状態はインスタンスごとに保持し、永続化しない
pub struct NewBillController {
    store: Option<Arc<dyn BillStore>>,
    navigator: Arc<dyn Navigator>,
    alert: Arc<dyn Alert>,
    session: Session,
    upload: UploadState,
    phase: NewBillPhase,
}

impl NewBillController {
    /// 新しいコントローラーを作成する
    ///
    /// # 引数
    /// * `store` - 請求書ストア（`None`の場合はアップロードと保存を行わず、送信時に一覧へ戻るだけ）
    /// * `navigator` - 画面遷移
    /// * `alert` - 形式エラー時の警告表示
    /// * `session` - ログイン中の従業員
    pub fn new(
        store: Option<Arc<dyn BillStore>>,
        navigator: Arc<dyn Navigator>,
        alert: Arc<dyn Alert>,
        session: Session,
    ) -> Self {
        Self {
            store,
            navigator,
            alert,
            session,
            upload: UploadState::NotStarted,
            phase: NewBillPhase::Idle,
        }
    }

    pub fn upload_state(&self) -> &UploadState {
        &self.upload
    }

    /// 直近に完了したアップロードの証憑
    pub fn proof(&self) -> Option<&UploadedProof> {
        self.upload.proof()
    }

    pub fn phase(&self) -> NewBillPhase {
        self.phase
    }

    /// ファイル選択を検証し、アップロードを開始する
    ///
    /// 不正な形式の場合は入力を空にして警告を表示し、`None`を返す。
    /// 受け付けた場合は状態を`InFlight`にし、ストアへ送るペイロードを返す
    ///
    /// # 引数
    /// * `event` - 選択されたファイルとファイル入力欄
    ///
    /// # 戻り値
    /// アップロードするペイロード。ファイルなし・形式エラーの場合は`None`
    pub fn begin_upload(&mut self, event: FileChangeEvent<'_>) -> Option<ProofUpload> {
        let FileChangeEvent { file, input } = event;
        let Some(file) = file else {
            debug!("ファイルが選択されていません");
            return None;
        };

        if let Err(e) = validate_proof_file(file.base_name()) {
            warn!("証憑ファイルを拒否しました: {} ({e})", file.base_name());
            input.clear();
            self.alert.alert(INVALID_PROOF_MESSAGE);
            self.phase = NewBillPhase::Idle;
            return None;
        }

        let file_name = file.base_name().to_string();
        info!("証憑のアップロードを開始します: {file_name}");

        self.upload = UploadState::InFlight {
            file_name,
            previous: self.upload.proof().cloned(),
        };
        self.phase = NewBillPhase::FileSelected;

        Some(ProofUpload {
            file,
            email: self.session.email.clone(),
        })
    }

    /// アップロード結果を反映する
    ///
    /// 失敗時は直前に完了していた証憑情報をそのまま残す
    ///
    /// # 引数
    /// * `result` - ストアからのアップロード結果
    pub fn finish_upload(&mut self, result: StoreResult<CreatedProof>) {
        let (file_name, previous) = match std::mem::take(&mut self.upload) {
            UploadState::InFlight {
                file_name,
                previous,
            } => (file_name, previous),
            other => {
                warn!("進行中のアップロードがないため、結果を破棄します");
                self.upload = other;
                return;
            }
        };

        match result {
            Ok(created) => {
                info!(
                    "証憑のアップロードが完了しました: bill_id={}, file={file_name}",
                    created.key
                );
                self.upload = UploadState::Completed(UploadedProof {
                    file_url: created.file_url,
                    file_name,
                    bill_id: created.key,
                });
                self.phase = NewBillPhase::FileUploaded;
            }
            Err(e) => {
                error!("証憑のアップロードに失敗しました: {e}");
                self.upload = UploadState::Failed {
                    error: e.to_string(),
                    previous,
                };
                self.phase = NewBillPhase::Idle;
            }
        }
    }

    /// 進行中のアップロードを取り消し、直前の状態に戻す
    fn abandon_upload(&mut self) {
        if let UploadState::InFlight { previous, .. } = std::mem::take(&mut self.upload) {
            (self.upload, self.phase) = match previous {
                Some(proof) => (UploadState::Completed(proof), NewBillPhase::FileUploaded),
                None => (UploadState::NotStarted, NewBillPhase::Idle),
            };
        }
    }

    /// ファイル選択イベントのハンドラー
    pub async fn handle_change_file(&mut self, event: FileChangeEvent<'_>) {
        let Some(upload) = self.begin_upload(event) else {
            return;
        };

        let Some(store) = self.store.clone() else {
            info!("ストアが設定されていないため、アップロードをスキップします");
            self.abandon_upload();
            return;
        };

        let result = store.create(upload).await;
        self.finish_upload(result);
    }

    /// フォームの値と現在の証憑から保存要求を組み立てる
    ///
    /// アップロードが未完了・失敗でも送信は許可する（証憑なしの請求書になる）
    ///
    /// # 引数
    /// * `form` - フォームの入力値
    ///
    /// # 戻り値
    /// 保存要求。金額が数値でない場合はバリデーションエラー
    pub fn assemble_bill(&self, form: &BillForm) -> AppResult<UpdateRequest> {
        let amount = parse_int_prefix(&form.amount).ok_or_else(|| {
            AppError::validation(format!("Montant invalide: \"{}\"", form.amount))
        })?;
        let pct = parse_int_prefix(&form.pct).unwrap_or(DEFAULT_VAT_PCT);

        if self.upload.is_in_flight() {
            warn!("証憑のアップロード中に送信されました。直前の証憑情報を使用します");
        }
        let proof = self.upload.proof();
        if proof.is_none() {
            warn!("証憑なしで請求書を送信します");
        }

        let bill = BillDraft {
            email: self.session.email.clone(),
            bill_type: form.expense_type.clone(),
            name: form.name.clone(),
            amount,
            date: form.date.clone(),
            vat: form.vat.clone(),
            pct,
            commentary: form.commentary.clone(),
            file_url: proof.map(|p| p.file_url.clone()),
            file_name: proof.map(|p| p.file_name.clone()),
            status: BillStatus::Pending,
        };

        Ok(UpdateRequest {
            bill,
            selector: proof.map(|p| p.bill_id.clone()),
        })
    }

    /// 請求書を保存し、一覧画面へ戻る
    ///
    /// 保存に失敗した場合は遷移せず、状態も変えない
    pub async fn submit(&mut self, form: &BillForm) -> AppResult<()> {
        let request = self.assemble_bill(form)?;

        match &self.store {
            Some(store) => {
                let saved = store.update(request).await?;
                info!("請求書を保存しました: id={}", saved.id);
            }
            None => {
                info!("ストアが設定されていないため、保存をスキップします");
            }
        }

        self.phase = NewBillPhase::Submitted;
        self.navigator.navigate(Route::Bills);
        Ok(())
    }

    /// フォーム送信イベントのハンドラー
    pub async fn handle_submit(&mut self, event: &mut SubmitEvent) {
        event.prevent_default();

        if let Err(e) = self.submit(&event.form).await {
            log_error("請求書の送信に失敗しました", &e);
        }
    }
}
