/// 日付・ステータス・数値の整形ユーティリティ
pub mod format;

pub use format::{
    format_date, format_status, parse_display_date, parse_int_prefix, MONTH_ABBREVIATIONS,
};
