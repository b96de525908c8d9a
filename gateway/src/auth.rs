//! HMAC-SHA256 Authorization header expected by the Solapi REST api
//!
//! signature = hex(hmac_sha256(api_secret, date + salt)), a new date/salt
//! pair for every call.

use common::hash::hmac_sha256_hex;
use common::utils::time::sign_date;
use uuid::Uuid;

pub const AUTH_SCHEME: &str = "HMAC-SHA256";

#[derive(Debug, Clone, PartialEq)]
pub struct AuthHeader {
    pub api_key: String,
    pub date: String,
    pub salt: String,
    pub signature: String,
}

impl AuthHeader {
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        Self::with_date_salt(api_key, api_secret, sign_date(), salt)
    }

    pub fn with_date_salt(api_key: &str, api_secret: &str, date: String, salt: String) -> Self {
        let signature = hmac_sha256_hex(api_secret, &format!("{}{}", date, salt));
        AuthHeader {
            api_key: api_key.to_string(),
            date,
            salt,
            signature,
        }
    }

    pub fn value(&self) -> String {
        format!(
            "{} apiKey={}, date={}, salt={}, signature={}",
            AUTH_SCHEME, self.api_key, self.date, self.salt, self.signature
        )
    }
}
