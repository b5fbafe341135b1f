// 請求書一覧の表示モデルと証憑プレビュー

use std::cmp::Reverse;
use std::collections::HashMap;

use super::models::Bill;
use crate::shared::utils::{format_status, parse_display_date};

/// 目のアイコンが証憑URLを保持する属性名
pub const BILL_URL_ATTRIBUTE: &str = "data-bill-url";

/// 一覧の一行
#[derive(Debug, Clone, PartialEq)]
pub struct BillRow {
    pub bill_type: String,
    pub name: String,
    pub date: String,
    pub amount: String,
    pub status: String,
    pub file_url: Option<String>,
}

impl BillRow {
    pub fn from_bill(bill: &Bill) -> Self {
        Self {
            bill_type: bill.bill_type.clone(),
            name: bill.name.clone(),
            date: bill.date.clone(),
            amount: format!("{} €", bill.amount),
            status: format_status(bill.status).to_string(),
            file_url: bill.file_url.clone(),
        }
    }

    /// この行のプレビュー用アイコン
    pub fn eye_icon(&self) -> EyeIcon {
        let icon = EyeIcon::new();
        match &self.file_url {
            Some(url) => icon.with_attribute(BILL_URL_ATTRIBUTE, url),
            None => icon,
        }
    }
}

/// 一覧画面の状態
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BillsPage {
    #[default]
    Loading,
    Error(String),
    Loaded(Vec<BillRow>),
}

/// 表示用日付の新しい順に並べ替える
///
/// 安定ソート。日付を解析できない要素は末尾に元の順序のまま残る
pub fn sort_by_date_desc<T, F>(items: &mut [T], date_of: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| Reverse(parse_display_date(date_of(item))));
}

/// 一覧の行を組み立てる（新しい順）
pub fn rows(bills: &[Bill]) -> Vec<BillRow> {
    let mut rows: Vec<BillRow> = bills.iter().map(BillRow::from_bill).collect();
    sort_by_date_desc(&mut rows, |row| row.date.as_str());
    rows
}

/// 証憑プレビューを開くアイコン
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EyeIcon {
    attributes: HashMap<String, String>,
}

impl EyeIcon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// 証憑を表示するモーダルダイアログ
pub trait ProofModal {
    /// ダイアログの表示幅（px）
    fn width(&self) -> f64;
    /// 本文を置き換える
    fn set_body(&mut self, html: String);
    fn show(&mut self);
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// プレビュー画像の幅（ダイアログ幅の半分、切り捨て）
pub fn proof_image_width(modal_width: f64) -> u32 {
    // NaNや負の値は0になる
    (modal_width * 0.5).floor() as u32
}

/// モーダル本文のHTML
pub fn proof_preview_html(file_url: &str, image_width: u32) -> String {
    format!(
        "<div style='text-align: center;' class=\"bill-proof-container\"><img width={image_width} src=\"{}\" alt=\"Bill\" /></div>",
        escape_attribute(file_url)
    )
}
