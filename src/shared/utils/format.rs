// 表示用の日付・ステータス整形と、フォーム入力の数値変換

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::features::bills::BillStatus;
use crate::shared::errors::{AppError, AppResult};

/// 月の略記（フランス語）。インデックスが月-1に対応する
///
/// 解析時は大文字小文字・句読点まで完全一致で照合する
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan.", "Fév.", "Mar.", "Avr.", "Mai.", "Juin.", "Juil.", "Aoû.", "Sep.", "Oct.", "Nov.",
    "Déc.",
];

/// 表示用日付 `DD Mon. YY` の形式
static DISPLAY_DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}) (\S+) (\d{2})$").expect("表示用日付の正規表現が不正です")
});

/// ISO形式（YYYY-MM-DD）の日付を表示用の `DD Mon. YY` に整形する
///
/// # 例
/// `2004-04-04` -> `04 Avr. 04`
pub fn format_date(iso_date: &str) -> AppResult<String> {
    let date = NaiveDate::parse_from_str(iso_date, "%Y-%m-%d").map_err(|e| {
        AppError::validation(format!("日付の形式が正しくありません ({iso_date}): {e}"))
    })?;

    let month = MONTH_ABBREVIATIONS[date.month0() as usize];
    Ok(format!(
        "{:02} {} {:02}",
        date.day(),
        month,
        date.year().rem_euclid(100)
    ))
}

/// 表示用日付を暦日に戻す
///
/// 年は二桁で、2000年代として解釈する。
/// 月の略記が表にない場合や存在しない日付の場合は`None`
pub fn parse_display_date(display_date: &str) -> Option<NaiveDate> {
    let captures = DISPLAY_DATE_PATTERN.captures(display_date)?;

    let day: u32 = captures[1].parse().ok()?;
    let month = MONTH_ABBREVIATIONS
        .iter()
        .position(|abbr| *abbr == &captures[2])?;
    let year: i32 = captures[3].parse().ok()?;

    NaiveDate::from_ymd_opt(2000 + year, month as u32 + 1, day)
}

/// ステータスの表示ラベル
pub fn format_status(status: BillStatus) -> &'static str {
    match status {
        BillStatus::Pending => "En attente",
        BillStatus::Accepted => "Accepté",
        BillStatus::Refused => "Refusé",
    }
}

/// 文字列先頭の整数部分を読み取る
///
/// 先頭の空白と符号を許容し、数字以降の文字は無視する。
/// 数字が一つもない場合は`None`
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 {
        return None;
    }

    let value: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -value } else { value })
}
