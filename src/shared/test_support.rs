// テスト用の記録型とフィクスチャ

use std::sync::Mutex;

use crate::features::bills::{Bill, BillStatus, ProofModal};
use crate::features::navigation::{Navigator, Route};
use crate::features::new_bill::{Alert, FileInput};

/// 遷移先を記録するナビゲーター
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

/// 表示された警告を記録する
#[derive(Debug, Default)]
pub struct RecordingAlert {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlert {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Alert for RecordingAlert {
    fn alert(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// 値を保持するファイル入力
#[derive(Debug, Default)]
pub struct FakeFileInput {
    pub value: String,
}

impl FakeFileInput {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

impl FileInput for FakeFileInput {
    fn clear(&mut self) {
        self.value.clear();
    }
}

/// 本文と表示状態を記録するモーダル
#[derive(Debug)]
pub struct RecordingModal {
    pub width: f64,
    pub body: String,
    pub shown: bool,
}

impl RecordingModal {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            body: String::new(),
            shown: false,
        }
    }
}

impl ProofModal for RecordingModal {
    fn width(&self) -> f64 {
        self.width
    }

    fn set_body(&mut self, html: String) {
        self.body = html;
    }

    fn show(&mut self) {
        self.shown = true;
    }
}

fn fixture_bill(id: &str, name: &str, date: &str, status: BillStatus) -> Bill {
    Bill {
        id: id.to_string(),
        email: "a@a".to_string(),
        bill_type: "Hôtel et logement".to_string(),
        name: name.to_string(),
        amount: 400,
        date: date.to_string(),
        vat: "80".to_string(),
        pct: 20,
        commentary: "séminaire billed".to_string(),
        file_url: Some(format!("https://test.storage.tld/v0/b/billable/{id}.jpg")),
        file_name: Some(format!("preview-facture-{id}.jpg")),
        status,
        comment_admin: None,
    }
}

/// ストア上の請求書（ISO日付、順不同）
pub fn fixture_bills() -> Vec<Bill> {
    vec![
        fixture_bill("47qAXb6fIm2zOKkLzMro", "encore", "2004-04-04", BillStatus::Pending),
        fixture_bill("BeKy5Mo4jkmdfPGYpTxZ", "test1", "2001-01-01", BillStatus::Refused),
        fixture_bill("UIUZtnPQvnbFnB0ozvJh", "test3", "2003-03-03", BillStatus::Accepted),
        fixture_bill("qcCK3SzECmaZAGRrHjaC", "test2", "2002-02-02", BillStatus::Refused),
    ]
}
