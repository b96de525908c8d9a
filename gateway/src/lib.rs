//! sms vendor boundary: registered sender lookup and message submission

pub mod auth;
pub mod registry;
pub mod solapi;

use async_trait::async_trait;
use common::data_structures::MessageType;
use common::error_code::DispatchError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use registry::{parse_sender_records, SenderIdentity};
pub use solapi::SolapiClient;

/// Failures reading the sender registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("sender registry unreachable: {0}")]
    Transport(String),
    #[error("sender registry answered with status {status}")]
    Status { status: u16, body: String },
    #[error("sender registry answered with non json content type {0:?}")]
    NotJson(String),
    #[error("sender registry body could not be decoded: {0}")]
    Decode(String),
}

/// One message as submitted to the vendor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub to: String,
    pub from: String,
    pub text: String,
    #[serde(rename = "type")]
    pub typ: MessageType,
}

/// Vendor acknowledgement of a send.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SendReceipt {
    /// vendor assigned group id when the response carries one
    pub group_id: Option<String>,
    pub raw: serde_json::Value,
}

impl SendReceipt {
    pub fn from_raw(raw: serde_json::Value) -> Self {
        let group_id = raw
            .get("groupId")
            .or_else(|| raw.get("groupInfo").and_then(|info| info.get("groupId")))
            .and_then(|id| id.as_str())
            .map(str::to_string);
        SendReceipt { group_id, raw }
    }
}

/// Raw sender registry answer, kept whole for the debug route.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SenderRegistry {
    pub status: u16,
    pub raw: serde_json::Value,
}

impl SenderRegistry {
    pub fn identities(&self) -> Result<Vec<SenderIdentity>, GatewayError> {
        parse_sender_records(&self.raw)
    }
}

/// Outbound calls the relay makes, one attempt each, no retries.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Live read of the sender identities registered with the vendor.
    async fn sender_registry(&self) -> Result<SenderRegistry, GatewayError>;

    /// Submit a single message.
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, DispatchError>;
}
