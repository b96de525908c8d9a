use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error_code::ValidationError;
use crate::utils::phone::normalize_kor;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\d{9,12}$").unwrap();
}

/// A normalized phone number, always 9 to 12 ascii digits.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Strip, locale normalize and validate `raw` as the value of `field`.
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::MissingField(field));
        }
        let normalized = normalize_kor(raw);
        if !PHONE_RE.is_match(&normalized) {
            return Err(ValidationError::MalformedPhone {
                field,
                value: raw.to_string(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse("phone", &value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
