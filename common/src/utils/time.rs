use chrono::prelude::*;

pub const SIGN_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// ISO-8601 UTC timestamp used when signing vendor requests.
pub fn sign_date() -> String {
    format_sign_date(&Utc::now())
}

pub fn format_sign_date(dt: &DateTime<Utc>) -> String {
    dt.format(SIGN_DATE_FORMAT).to_string()
}

pub fn now_millis() -> u64 {
    Local::now().timestamp_millis() as u64
}
