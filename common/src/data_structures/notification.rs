use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::phone::PhoneNumber;
use crate::utils::phone::{normalize_kor, only_digits};

pub const EMPTY_FIELD: &str = "-";

/// A validated booking notification, immutable for the rest of the request.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub site: Option<String>,
    pub visit_date: String,
    pub time_label: Option<String>,
    pub name: String,
    /// only ever rendered into the body, never a send target
    pub customer_phone: PhoneNumber,
    pub memo: Option<String>,
    /// empty when the active policy does not route to caller recipients
    pub recipients: Vec<PhoneNumber>,
    pub sender: Option<PhoneNumber>,
}

/// Sender and recipients decided for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRoute {
    pub from: PhoneNumber,
    pub to: Vec<PhoneNumber>,
    /// true when `from` came out of the approved sender registry
    pub registered_hit: bool,
}

impl ResolvedRoute {
    pub fn new(from: PhoneNumber, to: Vec<PhoneNumber>) -> Self {
        ResolvedRoute {
            from,
            to,
            registered_hit: false,
        }
    }
}

/// Fixed layout text sent to the administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

fn or_dash(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => EMPTY_FIELD,
    }
}

fn bracket_site(site: &str) -> String {
    if site.starts_with('[') && site.ends_with(']') {
        site.to_string()
    } else {
        format!("[{}]", site)
    }
}

impl MessageBody {
    pub fn render(request: &NotificationRequest, include_memo: bool) -> Self {
        let site = match or_dash(request.site.as_deref()) {
            EMPTY_FIELD => EMPTY_FIELD.to_string(),
            site => bracket_site(site),
        };
        let mut lines = vec![
            format!("현장 : {}", site),
            format!("날짜 : {}", or_dash(Some(&request.visit_date))),
            format!("시간 : {}", or_dash(request.time_label.as_deref())),
            format!("이름 : {}", or_dash(Some(&request.name))),
            format!("연락처 : {}", request.customer_phone),
        ];
        if include_memo {
            if let Some(memo) = request.memo.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
                lines.push(format!("메모 : {}", memo));
            }
        }
        MessageBody(lines.join("\n"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sender identities the vendor currently accepts, fetched per request.
///
/// Holds both the raw digits and the locale normalized form of every
/// record so a lookup matches whichever form the vendor returned.
#[derive(Debug, Clone, Default)]
pub struct ApprovedSenderSet {
    numbers: HashSet<String>,
    /// the registry could not be read and this set stands in for it
    unavailable: bool,
}

impl ApprovedSenderSet {
    /// Keep records whose status matches one of `approved_statuses`,
    /// compared case-insensitively.
    pub fn from_records<'a, I>(records: I, approved_statuses: &[String]) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut numbers = HashSet::new();
        for (number, status) in records {
            let status = status.trim();
            if !approved_statuses.iter().any(|s| s.trim().eq_ignore_ascii_case(status)) {
                continue;
            }
            let digits = only_digits(number);
            if digits.is_empty() {
                continue;
            }
            numbers.insert(normalize_kor(&digits));
            numbers.insert(digits);
        }
        ApprovedSenderSet {
            numbers,
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        ApprovedSenderSet {
            numbers: HashSet::new(),
            unavailable: true,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    pub fn contains(&self, phone: &PhoneNumber) -> bool {
        self.numbers.contains(phone.as_str())
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn numbers(&self) -> Vec<&str> {
        let mut numbers: Vec<&str> = self.numbers.iter().map(String::as_str).collect();
        numbers.sort_unstable();
        numbers
    }
}
