use std::sync::Arc;

use log::{debug, info, warn};

use super::models::Bill;
use super::view::{
    proof_image_width, proof_preview_html, rows, BillsPage, EyeIcon, ProofModal, BILL_URL_ATTRIBUTE,
};
use crate::features::navigation::{Navigator, Route};
use crate::features::store::{BillStore, StoreResult};
use crate::shared::errors::{log_error, AppError};
use crate::shared::utils::format_date;

/// 請求書一覧画面のコントローラー
pub struct BillsController {
    store: Option<Arc<dyn BillStore>>,
    navigator: Arc<dyn Navigator>,
}

impl BillsController {
    /// 新しいコントローラーを作成する
    ///
    /// # 引数
    /// * `store` - 請求書ストア（`None`の場合、一覧は常に空になる）
    /// * `navigator` - 画面遷移
    pub fn new(store: Option<Arc<dyn BillStore>>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// 新規請求書画面へ遷移する
    pub fn handle_click_new_bill(&self) {
        debug!("新規請求書画面へ遷移します");
        self.navigator.navigate(Route::NewBill);
    }

    /// 目のアイコンがクリックされたとき、証憑画像をモーダルに表示する
    ///
    /// URLが欠けていても不正でも失敗せず、取得できた内容でモーダルを開く
    ///
    /// # 引数
    /// * `icon` - クリックされたアイコン（`data-bill-url`属性に証憑URLを持つ）
    /// * `modal` - 証憑を表示するモーダル
    pub fn handle_click_icon_eye(&self, icon: &EyeIcon, modal: &mut dyn ProofModal) {
        let bill_url = match icon.get_attribute(BILL_URL_ATTRIBUTE) {
            Some(url) => {
                if let Err(e) = url::Url::parse(url) {
                    warn!("証憑URLが不正です ({url}): {e}");
                }
                url
            }
            None => {
                warn!("証憑URLが設定されていないアイコンです");
                ""
            }
        };

        let image_width = proof_image_width(modal.width());
        modal.set_body(proof_preview_html(bill_url, image_width));
        modal.show();
    }

    /// ストアから請求書を取得し、日付を表示用に整形する
    ///
    /// 日付を整形できないレコードは元の値のまま返す
    ///
    /// # 戻り値
    /// 表示用に整形された請求書（並び順はストアのまま）
    pub async fn get_bills(&self) -> StoreResult<Vec<Bill>> {
        let Some(store) = &self.store else {
            debug!("ストアが設定されていないため、空の一覧を返します");
            return Ok(Vec::new());
        };

        let bills = store.list().await?;
        info!("請求書を{}件取得しました", bills.len());

        Ok(bills
            .into_iter()
            .map(|mut bill| {
                match format_date(&bill.date) {
                    Ok(display) => bill.date = display,
                    Err(e) => warn!("{e} (bill id={})", bill.id),
                }
                bill
            })
            .collect())
    }

    /// 一覧画面の状態を組み立てる
    ///
    /// 取得に失敗した場合はエラーメッセージをそのまま表示する。再試行はしない
    ///
    /// # 戻り値
    /// 日付の新しい順に並んだ一覧、またはエラー画面
    pub async fn load(&self) -> BillsPage {
        match self.get_bills().await {
            Ok(bills) => BillsPage::Loaded(rows(&bills)),
            Err(e) => {
                let error = AppError::from(e);
                log_error("請求書一覧の取得に失敗しました", &error);
                BillsPage::Error(error.user_message())
            }
        }
    }
}
