//! Sender/Recipient Resolver
//!
//! Picks `from` and `to` for a validated request under the configured
//! [`SendPolicy`]. The only I/O is the live sender registry read, whose
//! failure degrades to an empty approved set.

use common::data_structures::notification::{
    ApprovedSenderSet, NotificationRequest, ResolvedRoute,
};
use common::data_structures::phone::PhoneNumber;
use common::data_structures::SendPolicy;
use common::env::EnvConf;
use common::error_code::{ApiCommonError, ApiError, RouteError};
use gateway::SmsGateway;
use tracing::{debug, warn};

pub struct Resolver<'a> {
    conf: &'a EnvConf,
    gateway: &'a dyn SmsGateway,
}

fn configured_phone(name: &'static str, raw: &str) -> Result<PhoneNumber, ApiError> {
    PhoneNumber::parse(name, raw)
        .map_err(|err| ApiCommonError::Internal(format!("configured {}: {}", name, err)).into())
}

impl<'a> Resolver<'a> {
    pub fn new(conf: &'a EnvConf, gateway: &'a dyn SmsGateway) -> Self {
        Resolver { conf, gateway }
    }

    /// Live, uncached read of the approved sender identities.
    pub async fn approved_senders(&self) -> ApprovedSenderSet {
        let identities = self
            .gateway
            .sender_registry()
            .await
            .and_then(|registry| registry.identities());
        match identities {
            Ok(identities) => {
                let approved = ApprovedSenderSet::from_records(
                    identities
                        .iter()
                        .map(|id| (id.number.as_str(), id.status.as_str())),
                    &self.conf.approved_statuses,
                );
                debug!(
                    "sender registry returned {} records, {} approved numbers",
                    identities.len(),
                    approved.len()
                );
                approved
            }
            Err(err) => {
                warn!("sender registry unavailable, falling back to default sender: {}", err);
                ApprovedSenderSet::unavailable()
            }
        }
    }

    /// An empty allow list permits every sender.
    fn sender_allowed(&self, phone: &PhoneNumber) -> bool {
        self.conf.sender_allow_list.is_empty()
            || self
                .conf
                .sender_allow_list
                .iter()
                .any(|allowed| allowed == phone.as_str())
    }

    pub async fn resolve(&self, request: &NotificationRequest) -> Result<ResolvedRoute, ApiError> {
        let default_sender = configured_phone("sender", &self.conf.sender)?;

        let route = match self.conf.policy {
            SendPolicy::FixedSender => {
                //a caller sender is only taken from a configured allow list
                let from = match &request.sender {
                    Some(sender)
                        if !self.conf.sender_allow_list.is_empty()
                            && self.sender_allowed(sender) =>
                    {
                        sender.clone()
                    }
                    Some(sender) => {
                        debug!("caller sender {} not allow listed, using default", sender);
                        default_sender
                    }
                    None => default_sender,
                };
                ResolvedRoute::new(from, request.recipients.clone())
            }
            SendPolicy::FixedAdmin => {
                let admin = configured_phone("admin_phone", self.conf.admin_phone())?;
                let mut route = ResolvedRoute::new(admin.clone(), vec![admin.clone()]);
                if self.conf.skip_verification {
                    debug!("admin identity verification skipped by configuration");
                } else {
                    let approved = self.approved_senders().await;
                    route.registered_hit = approved.contains(&admin);
                    //an unreadable registry does not block the send
                    if !approved.is_unavailable() && !route.registered_hit {
                        return Err(RouteError::SenderNotApproved(admin.to_string()).into());
                    }
                }
                route
            }
            SendPolicy::VerifiedSender => {
                let approved = self.approved_senders().await;
                let hit = request
                    .recipients
                    .iter()
                    .find(|recipient| approved.contains(recipient) && self.sender_allowed(recipient))
                    .cloned();
                let mut route = ResolvedRoute::new(
                    hit.clone().unwrap_or(default_sender),
                    request.recipients.clone(),
                );
                route.registered_hit = hit.is_some();
                route
            }
        };

        if route.to.is_empty() {
            return Err(ApiCommonError::Internal("resolved route has no recipient".to_string()).into());
        }
        if !self.sender_allowed(&route.from) {
            return Err(RouteError::SenderNotAllowed(route.from.to_string()).into());
        }
        debug!(
            "policy {} resolved from={} to={:?} registered_hit={}",
            self.conf.policy, route.from, route.to, route.registered_hit
        );
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::api_test::{test_conf, MockGateway, CUSTOMER, DEFAULT_SENDER, RECIPIENT};
    use gateway::{GatewayError, SenderRegistry};
    use serde_json::json;

    fn phone(raw: &str) -> PhoneNumber {
        PhoneNumber::parse("test", raw).unwrap()
    }

    fn request(recipients: &[&str]) -> NotificationRequest {
        NotificationRequest {
            site: Some("보라매".to_string()),
            visit_date: "2025-11-06".to_string(),
            time_label: None,
            name: "홍길동".to_string(),
            customer_phone: phone(CUSTOMER),
            memo: None,
            recipients: recipients.iter().map(|r| phone(r)).collect(),
            sender: None,
        }
    }

    #[tokio::test]
    async fn test_fixed_sender() {
        let conf = test_conf(SendPolicy::FixedSender);
        let gateway = MockGateway::with_approved(&[RECIPIENT]);
        let route = Resolver::new(&conf, &gateway)
            .resolve(&request(&[RECIPIENT]))
            .await
            .unwrap();
        assert_eq!(route.from, phone(DEFAULT_SENDER));
        assert_eq!(route.to, vec![phone(RECIPIENT)]);
        assert_eq!(gateway.registry_calls(), 0);
    }

    #[tokio::test]
    async fn test_fixed_sender_ignores_caller_sender_without_allow_list() {
        let conf = test_conf(SendPolicy::FixedSender);
        let gateway = MockGateway::with_approved(&[]);
        let mut req = request(&[RECIPIENT, "01033334444"]);
        req.sender = Some(phone("01055556666"));
        let route = Resolver::new(&conf, &gateway).resolve(&req).await.unwrap();
        assert_eq!(route.from, phone(DEFAULT_SENDER));
        assert_eq!(route.to.len(), 2);
    }

    #[tokio::test]
    async fn test_fixed_sender_allow_listed_caller_sender() {
        let mut conf = test_conf(SendPolicy::FixedSender);
        conf.sender_allow_list = vec![DEFAULT_SENDER.to_string(), "01055556666".to_string()];
        let gateway = MockGateway::with_approved(&[]);

        let mut req = request(&[RECIPIENT]);
        req.sender = Some(phone("01055556666"));
        let route = Resolver::new(&conf, &gateway).resolve(&req).await.unwrap();
        assert_eq!(route.from, phone("01055556666"));

        req.sender = Some(phone("01077778888"));
        let route = Resolver::new(&conf, &gateway).resolve(&req).await.unwrap();
        assert_eq!(route.from, phone(DEFAULT_SENDER));
    }

    #[tokio::test]
    async fn test_fixed_admin_ignores_recipient() {
        let mut conf = test_conf(SendPolicy::FixedAdmin);
        conf.skip_verification = true;
        let gateway = MockGateway::with_approved(&[]);
        let route = Resolver::new(&conf, &gateway)
            .resolve(&request(&[]))
            .await
            .unwrap();
        assert_eq!(route.from, phone(DEFAULT_SENDER));
        assert_eq!(route.to, vec![phone(DEFAULT_SENDER)]);
        assert_eq!(gateway.registry_calls(), 0);
    }

    #[tokio::test]
    async fn test_fixed_admin_verified() {
        let conf = test_conf(SendPolicy::FixedAdmin);
        let gateway = MockGateway::with_approved(&["+82 10 9999 8888"]);
        let route = Resolver::new(&conf, &gateway)
            .resolve(&request(&[]))
            .await
            .unwrap();
        assert_eq!(route.to, vec![phone(DEFAULT_SENDER)]);
        assert!(route.registered_hit);
        assert_eq!(gateway.registry_calls(), 1);
    }

    #[tokio::test]
    async fn test_fixed_admin_not_approved() {
        let conf = test_conf(SendPolicy::FixedAdmin);
        let gateway = MockGateway::with_approved(&[RECIPIENT]);
        let err = Resolver::new(&conf, &gateway)
            .resolve(&request(&[]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Route(RouteError::SenderNotApproved(_))
        ));
    }

    #[tokio::test]
    async fn test_fixed_admin_unexpected_registry_shape_still_sends() {
        let conf = test_conf(SendPolicy::FixedAdmin);
        for raw in [json!({"message": "unexpected"}), json!({"data": null})] {
            let gateway = MockGateway::with_registry(Ok(SenderRegistry { status: 200, raw }));
            let route = Resolver::new(&conf, &gateway)
                .resolve(&request(&[]))
                .await
                .unwrap();
            assert_eq!(route.from, phone(DEFAULT_SENDER));
            assert_eq!(route.to, vec![phone(DEFAULT_SENDER)]);
            assert!(!route.registered_hit);
        }
    }

    #[tokio::test]
    async fn test_fixed_admin_registry_down_still_sends() {
        let conf = test_conf(SendPolicy::FixedAdmin);
        let gateway =
            MockGateway::with_registry(Err(GatewayError::Transport("timed out".to_string())));
        let route = Resolver::new(&conf, &gateway)
            .resolve(&request(&[]))
            .await
            .unwrap();
        assert_eq!(route.from, phone(DEFAULT_SENDER));
        assert!(!route.registered_hit);
    }

    #[tokio::test]
    async fn test_verified_sender_hit() {
        let conf = test_conf(SendPolicy::VerifiedSender);
        let gateway = MockGateway::with_approved(&[RECIPIENT]);
        let route = Resolver::new(&conf, &gateway)
            .resolve(&request(&[RECIPIENT]))
            .await
            .unwrap();
        assert_eq!(route.from, phone(RECIPIENT));
        assert_eq!(route.to, vec![phone(RECIPIENT)]);
        assert!(route.registered_hit);
        assert_eq!(gateway.registry_calls(), 1);
    }

    #[tokio::test]
    async fn test_verified_sender_miss() {
        let conf = test_conf(SendPolicy::VerifiedSender);
        let gateway = MockGateway::with_approved(&["01044445555"]);
        let route = Resolver::new(&conf, &gateway)
            .resolve(&request(&[RECIPIENT]))
            .await
            .unwrap();
        assert_eq!(route.from, phone(DEFAULT_SENDER));
        assert_eq!(route.to, vec![phone(RECIPIENT)]);
        assert!(!route.registered_hit);
    }

    #[tokio::test]
    async fn test_verified_sender_matches_international_form() {
        let conf = test_conf(SendPolicy::VerifiedSender);
        let gateway = MockGateway::with_approved(&["821022223333"]);
        let route = Resolver::new(&conf, &gateway)
            .resolve(&request(&[RECIPIENT]))
            .await
            .unwrap();
        assert_eq!(route.from, phone(RECIPIENT));
    }

    #[tokio::test]
    async fn test_verified_sender_fallback_on_registry_failure() {
        let conf = test_conf(SendPolicy::VerifiedSender);
        let failures = vec![
            GatewayError::Transport("connection refused".to_string()),
            GatewayError::NotJson("text/html".to_string()),
            GatewayError::Decode("expected value".to_string()),
            GatewayError::Status {
                status: 500,
                body: String::new(),
            },
        ];
        for failure in failures {
            let gateway = MockGateway::with_registry(Err(failure));
            let route = Resolver::new(&conf, &gateway)
                .resolve(&request(&[RECIPIENT]))
                .await
                .unwrap();
            assert_eq!(route.from, phone(DEFAULT_SENDER));
            assert_eq!(route.to, vec![phone(RECIPIENT)]);
        }

        //json but not the expected shape
        let gateway = MockGateway::with_registry(Ok(SenderRegistry {
            status: 200,
            raw: json!({"message": "unexpected"}),
        }));
        let route = Resolver::new(&conf, &gateway)
            .resolve(&request(&[RECIPIENT]))
            .await
            .unwrap();
        assert_eq!(route.from, phone(DEFAULT_SENDER));
    }

    #[tokio::test]
    async fn test_allow_list() {
        let mut conf = test_conf(SendPolicy::FixedSender);
        conf.sender_allow_list = vec![DEFAULT_SENDER.to_string()];
        let gateway = MockGateway::with_approved(&[]);
        assert!(Resolver::new(&conf, &gateway)
            .resolve(&request(&[RECIPIENT]))
            .await
            .is_ok());

        //default sender itself outside the list
        conf.sender_allow_list = vec!["01055556666".to_string()];
        let err = Resolver::new(&conf, &gateway)
            .resolve(&request(&[RECIPIENT]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Route(RouteError::SenderNotAllowed(_))));
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_verified_sender_hit_outside_allow_list_falls_back() {
        let mut conf = test_conf(SendPolicy::VerifiedSender);
        conf.sender_allow_list = vec![DEFAULT_SENDER.to_string()];
        let gateway = MockGateway::with_approved(&[RECIPIENT]);
        let route = Resolver::new(&conf, &gateway)
            .resolve(&request(&[RECIPIENT]))
            .await
            .unwrap();
        assert_eq!(route.from, phone(DEFAULT_SENDER));
        assert_eq!(route.to, vec![phone(RECIPIENT)]);
        assert!(!route.registered_hit);
    }
}
