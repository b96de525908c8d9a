//! 对接 solapi.com 短信发送服务
//!
//! Both endpoints take the HMAC Authorization header from [`crate::auth`].
//! Every call is a single attempt bounded by the configured timeout.
//!
//! SMS carries up to 90 bytes (hangul counts 2), longer text must go out as
//! LMS, the caller decides the type.

use std::time::Duration;

use async_trait::async_trait;
use common::env::SolapiConf;
use common::error_code::DispatchError;
use common::utils::time::now_millis;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::auth::AuthHeader;
use crate::{GatewayError, OutboundMessage, SendReceipt, SenderRegistry, SmsGateway};

/// registered sender id list
const SENDERS_PATH: &str = "/senderid/v1/senders";
/// message submission, one message per call from this client
const SEND_PATH: &str = "/messages/v4/send-many";

#[derive(Serialize)]
struct Payload<'a> {
    messages: Vec<&'a OutboundMessage>,
}

pub struct SolapiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl SolapiClient {
    pub fn new(conf: &SolapiConf) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(conf.timeout_secs))
            .build()?;
        Ok(SolapiClient {
            client,
            base_url: conf.base_url.trim_end_matches('/').to_string(),
            api_key: conf.api_key.clone(),
            api_secret: conf.api_secret.clone(),
        })
    }

    fn authorization(&self) -> String {
        AuthHeader::new(&self.api_key, &self.api_secret).value()
    }
}

#[async_trait]
impl SmsGateway for SolapiClient {
    async fn sender_registry(&self) -> Result<SenderRegistry, GatewayError> {
        let url = format!("{}{}", self.base_url, SENDERS_PATH);
        let res = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        let body = res
            .text()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        if status / 100 != 2 {
            return Err(GatewayError::Status { status, body });
        }
        if !content_type.contains("application/json") {
            return Err(GatewayError::NotJson(content_type));
        }
        let raw: Value =
            serde_json::from_str(&body).map_err(|err| GatewayError::Decode(err.to_string()))?;
        Ok(SenderRegistry { status, raw })
    }

    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, DispatchError> {
        let url = format!("{}{}", self.base_url, SEND_PATH);
        let payload = Payload {
            messages: vec![message],
        };
        let started = now_millis();
        let res = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, self.authorization())
            .json(&payload)
            .send()
            .await
            .map_err(|err| DispatchError::Transport(err.to_string()))?;

        let status = res.status().as_u16();
        let text = res
            .text()
            .await
            .map_err(|err| DispatchError::Transport(err.to_string()))?;
        debug!(
            "solapi send to {} answered {} in {}ms",
            message.to,
            status,
            now_millis().saturating_sub(started)
        );

        match (status / 100, serde_json::from_str::<Value>(&text)) {
            (2, Ok(raw)) => Ok(SendReceipt::from_raw(raw)),
            (2, Err(err)) => Err(DispatchError::Transport(format!(
                "malformed vendor response: {}",
                err
            ))),
            (_, parsed) => {
                let detail = parsed.unwrap_or_else(|_| json!({ "raw": text }));
                warn!("solapi rejected send with {} {}", status, detail);
                Err(DispatchError::Rejected { status, detail })
            }
        }
    }
}
