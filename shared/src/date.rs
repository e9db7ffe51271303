//! 时间格式化
//!
//! 后端返回 RFC 3339 时间戳和 `YYYY-MM-DD` 日期，界面统一按 UTC 显示。

use chrono::{DateTime, NaiveDate, Utc};

/// `YYYY-MM-DD`
#[inline]
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 时间戳的日期部分
#[inline]
pub fn format_day(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD HH:MM UTC`
#[inline]
pub fn format_datetime(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn format_dob(dob: Option<&NaiveDate>) -> String {
    dob.map(format_date).unwrap_or_else(|| "Not set".to_string())
}
