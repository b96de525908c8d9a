use std::str::FromStr;
use std::{env, fmt, fs};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data_structures::{MessageType, SendPolicy};
use crate::error_code::ConfigError;
use crate::utils::phone::normalize_kor;

pub const DEFAULT_SOLAPI_BASE_URL: &str = "https://api.solapi.com";

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    Product,
    Dev,
    Local,
    Test, //for testcase
}

impl Default for ServiceMode {
    fn default() -> Self {
        ServiceMode::Product
    }
}

impl std::str::FromStr for ServiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(ServiceMode::Product),
            "dev" => Ok(ServiceMode::Dev),
            "local" => Ok(ServiceMode::Local),
            "test" => Ok(ServiceMode::Test),
            _ => Err("Don't support this service mode".to_string()),
        }
    }
}

impl fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            ServiceMode::Product => "product",
            ServiceMode::Dev => "dev",
            ServiceMode::Local => "local",
            ServiceMode::Test => "test",
        };
        write!(f, "{}", description)
    }
}

/// Solapi account used for both the sender registry and message sends.
#[derive(Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SolapiConf {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    /// bound for each outbound call
    pub timeout_secs: u64,
}

impl Default for SolapiConf {
    fn default() -> Self {
        SolapiConf {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: DEFAULT_SOLAPI_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

//never print the secret
impl fmt::Debug for SolapiConf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolapiConf")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

///read config data for env
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EnvConf {
    /// dev or product
    pub service_mode: ServiceMode,
    /// http service port
    pub api_port: u16,
    pub solapi: SolapiConf,
    /// default sender, must be registered with the vendor
    pub sender: String,
    /// administrator identity for the fixed admin policy, falls back to `sender`
    pub admin_phone: Option<String>,
    pub policy: SendPolicy,
    /// fixed admin policy sends without consulting the sender registry
    pub skip_verification: bool,
    /// when not empty the resolved sender must be one of these
    pub sender_allow_list: Vec<String>,
    /// registry statuses that count as approved, case-insensitive
    pub approved_statuses: Vec<String>,
    pub cors_origins: Vec<String>,
    /// forces the message type instead of picking it from the text length
    pub message_type: Option<MessageType>,
    pub include_memo: bool,
    /// answer with a preview instead of sending for the test customer number
    pub allow_dev_echo: bool,
    /// exposes `/debug/senders`
    pub debug_routes: bool,
}

impl Default for EnvConf {
    fn default() -> Self {
        EnvConf {
            service_mode: ServiceMode::default(),
            api_port: 8080,
            solapi: SolapiConf::default(),
            sender: String::new(),
            admin_phone: None,
            policy: SendPolicy::default(),
            skip_verification: false,
            sender_allow_list: vec![],
            approved_statuses: ["APPROVED", "ACTIVE", "REGISTERED", "CONFIRMED", "VERIFIED"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cors_origins: vec!["*".to_string()],
            message_type: None,
            include_memo: false,
            allow_dev_echo: false,
            debug_routes: false,
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn valid_phone(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let normalized = normalize_kor(value);
    if !(9..=12).contains(&normalized.len()) {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("{:?} is not 9 to 12 digits", value),
        });
    }
    Ok(normalized)
}

impl EnvConf {
    /// Defaults, then the toml file named by `CONFIG`, then environment
    /// overrides, then validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut conf = match env::var("CONFIG") {
            Ok(path) => {
                info!("loading configuration from {}", path);
                let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                Self::from_toml_str(&content)?
            }
            Err(_) => EnvConf::default(),
        };
        conf.apply_overrides(|key| env::var(key).ok())?;
        conf.validate()?;
        debug!("effective configuration {:?}", conf);
        Ok(conf)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("SOLAPI_API_KEY") {
            self.solapi.api_key = value;
        }
        if let Some(value) = lookup("SOLAPI_API_SECRET") {
            self.solapi.api_secret = value;
        }
        if let Some(value) = lookup("SOLAPI_BASE_URL") {
            self.solapi.base_url = value;
        }
        if let Some(value) = lookup("SOLAPI_SENDER") {
            self.sender = value;
        }
        if let Some(value) = lookup("ADMIN_PHONE") {
            self.admin_phone = Some(value);
        }
        if let Some(value) = lookup("SEND_POLICY") {
            self.policy = SendPolicy::from_str(value.trim()).map_err(|_| ConfigError::Invalid {
                name: "SEND_POLICY",
                reason: format!("unknown policy {:?}", value),
            })?;
        }
        if let Some(value) = lookup("SKIP_VERIFICATION") {
            self.skip_verification = parse_bool(&value);
        }
        if let Some(value) = lookup("SENDER_ALLOW_LIST") {
            self.sender_allow_list = parse_list(&value);
        }
        if let Some(value) = lookup("APPROVED_STATUSES") {
            self.approved_statuses = parse_list(&value);
        }
        if let Some(value) = lookup("CORS_ORIGINS") {
            let origins = parse_list(&value);
            self.cors_origins = if origins.is_empty() {
                vec!["*".to_string()]
            } else {
                origins
            };
        }
        if let Some(value) = lookup("ALLOW_DEV_ECHO") {
            self.allow_dev_echo = parse_bool(&value);
        }
        if let Some(value) = lookup("API_PORT") {
            self.api_port = value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "API_PORT",
                reason: format!("{:?} is not a port", value),
            })?;
        }
        if let Some(value) = lookup("SERVICE_MODE") {
            self.service_mode = ServiceMode::from_str(value.trim())
                .map_err(|reason| ConfigError::Invalid {
                    name: "SERVICE_MODE",
                    reason,
                })?;
        }
        Ok(())
    }

    /// Required settings present and every phone setting normalized.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.solapi.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("SOLAPI_API_KEY"));
        }
        if self.solapi.api_secret.trim().is_empty() {
            return Err(ConfigError::Missing("SOLAPI_API_SECRET"));
        }
        if self.sender.trim().is_empty() {
            return Err(ConfigError::Missing("SOLAPI_SENDER"));
        }
        self.sender = valid_phone("SOLAPI_SENDER", &self.sender)?;
        self.admin_phone = match self.admin_phone.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() => Some(valid_phone("ADMIN_PHONE", phone)?),
            _ => None,
        };
        self.sender_allow_list = self
            .sender_allow_list
            .iter()
            .map(|phone| valid_phone("SENDER_ALLOW_LIST", phone))
            .collect::<Result<_, _>>()?;
        if self.solapi.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "solapi.timeout_secs",
                reason: "must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    /// The administrator identity used by the fixed admin policy.
    pub fn admin_phone(&self) -> &str {
        self.admin_phone.as_deref().unwrap_or(&self.sender)
    }

    /// Dev echo is never honored in product mode.
    pub fn dev_echo_enabled(&self) -> bool {
        self.allow_dev_echo && self.service_mode != ServiceMode::Product
    }
}
