pub mod ip;
pub mod password;

use base64::Engine;
use chrono::{NaiveDate, Utc};
use rand::RngExt;

use crate::errors::{LinkhubError, Result};

/// 生成 URL-safe 随机 token（`bytes` 字节熵）
pub fn generate_secure_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill(&mut buf[..]);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

/// 解析 `YYYY-MM-DD`
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        LinkhubError::date_parse(format!("Invalid date '{}', expected YYYY-MM-DD", s))
    })
}

/// 当前 UTC 日期
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// 去掉首尾空白，空串视为 None
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
