use common::data_structures::notification::MessageBody;
use common::data_structures::SendPolicy;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::notification::dispatcher::Dispatcher;
use crate::notification::normalize::{self, SendSmsRequest};
use crate::notification::resolver::Resolver;
use crate::utils::respond::ApiRes;
use crate::utils::AppState;

/// Customer number that only renders a preview when dev echo is on.
pub const DEV_ECHO_PHONE: &str = "00000000000";

#[derive(Serialize, Debug)]
pub struct SentSummary {
    /// vendor raw response, a list when there was more than one recipient
    pub result: Value,
    pub from_used: String,
    pub to: Vec<String>,
    pub registered_hit: bool,
    pub policy: SendPolicy,
    pub message: String,
}

#[derive(Serialize, Debug)]
pub struct EchoPreview {
    pub dev_echo: bool,
    pub message_preview: String,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum SendSmsOutcome {
    Sent(SentSummary),
    Echo(EchoPreview),
}

pub async fn req(state: &AppState, request_data: SendSmsRequest) -> ApiRes<SendSmsOutcome> {
    let conf = &state.conf;
    let gateway = state.gateway.as_ref();

    if conf.dev_echo_enabled() {
        let preview = normalize::parse_preview(request_data.clone())?;
        if preview.customer_phone.as_str() == DEV_ECHO_PHONE {
            info!("dev echo, nothing sent");
            return Ok(SendSmsOutcome::Echo(EchoPreview {
                dev_echo: true,
                message_preview: MessageBody::render(&preview, conf.include_memo).to_string(),
            }));
        }
    }

    let request = normalize::parse(request_data, conf.policy)?;
    let body = MessageBody::render(&request, conf.include_memo);

    let route = Resolver::new(conf, gateway).resolve(&request).await?;
    let mut receipts = Dispatcher::new(conf, gateway).dispatch(&route, &body).await?;

    let result = if receipts.len() == 1 {
        receipts.remove(0).raw
    } else {
        Value::Array(receipts.into_iter().map(|receipt| receipt.raw).collect())
    };
    Ok(SendSmsOutcome::Sent(SentSummary {
        result,
        from_used: route.from.to_string(),
        to: route.to.iter().map(ToString::to_string).collect(),
        registered_hit: route.registered_hit,
        policy: conf.policy,
        message: body.to_string(),
    }))
}
