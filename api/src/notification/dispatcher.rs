use common::data_structures::notification::{MessageBody, ResolvedRoute};
use common::data_structures::MessageType;
use common::env::EnvConf;
use common::error_code::ApiError;
use gateway::{OutboundMessage, SendReceipt, SmsGateway};
use tracing::{debug, info, warn};

/// One send per recipient, in order, each attempted exactly once.
pub struct Dispatcher<'a> {
    gateway: &'a dyn SmsGateway,
    message_type: Option<MessageType>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(conf: &'a EnvConf, gateway: &'a dyn SmsGateway) -> Self {
        Dispatcher {
            gateway,
            message_type: conf.message_type,
        }
    }

    pub fn message_type(&self, body: &MessageBody) -> MessageType {
        self.message_type
            .unwrap_or_else(|| MessageType::for_text(body.as_str()))
    }

    /// Stops at the first failure, recipients after it are not attempted.
    pub async fn dispatch(
        &self,
        route: &ResolvedRoute,
        body: &MessageBody,
    ) -> Result<Vec<SendReceipt>, ApiError> {
        let typ = self.message_type(body);
        let mut receipts = Vec::with_capacity(route.to.len());
        for to in &route.to {
            let message = OutboundMessage {
                to: to.to_string(),
                from: route.from.to_string(),
                text: body.to_string(),
                typ,
            };
            match self.gateway.send(&message).await {
                Ok(receipt) => {
                    debug!("sent {} from {} to {}", typ, message.from, message.to);
                    info!("{} accepted, group {:?}", typ, receipt.group_id);
                    receipts.push(receipt);
                }
                Err(source) => {
                    debug!("send to {} failed", message.to);
                    warn!("send failed after {} delivered: {}", receipts.len(), source);
                    return Err(ApiError::Dispatch {
                        source,
                        delivered: receipts.len(),
                    });
                }
            }
        }
        Ok(receipts)
    }
}
