//! liveness, build info and operator diagnostics
use actix_web::{get, web, HttpResponse, Responder};
use common::data_structures::notification::ApprovedSenderSet;
use common::data_structures::{MessageType, SendPolicy};
use common::env::ServiceMode;
use common::error_code::{ApiCommonError, ApiError};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::utils::respond::{gen_extra_respond, ApiRes};
use crate::utils::AppState;

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({"ok": true}))
}

#[get("/version")]
async fn version() -> impl Responder {
    gen_extra_respond::<Value>(Ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Effective settings without credentials.
#[derive(Serialize, Debug)]
pub struct PublicConfig {
    pub service_mode: ServiceMode,
    pub policy: SendPolicy,
    pub sender: String,
    pub admin_phone: String,
    pub skip_verification: bool,
    pub sender_allow_list: Vec<String>,
    pub approved_statuses: Vec<String>,
    pub message_type: Option<MessageType>,
    pub include_memo: bool,
    pub dev_echo: bool,
    pub solapi_base_url: String,
}

#[get("/config")]
async fn config(state: web::Data<AppState>) -> impl Responder {
    let conf = &state.conf;
    gen_extra_respond::<PublicConfig>(Ok(PublicConfig {
        service_mode: conf.service_mode,
        policy: conf.policy,
        sender: conf.sender.clone(),
        admin_phone: conf.admin_phone().to_string(),
        skip_verification: conf.skip_verification,
        sender_allow_list: conf.sender_allow_list.clone(),
        approved_statuses: conf.approved_statuses.clone(),
        message_type: conf.message_type,
        include_memo: conf.include_memo,
        dev_echo: conf.dev_echo_enabled(),
        solapi_base_url: conf.solapi.base_url.clone(),
    }))
}

#[derive(Serialize, Debug)]
pub struct SendersDump {
    pub status: u16,
    pub approved: Vec<String>,
    /// set when the body has no recognizable sender list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    pub raw: Value,
}

async fn senders_dump(state: &AppState) -> ApiRes<SendersDump> {
    let registry = state
        .gateway
        .sender_registry()
        .await
        .map_err(|err| ApiError::from(ApiCommonError::Upstream(err.to_string())))?;
    let (identities, parse_error) = match registry.identities() {
        Ok(identities) => (identities, None),
        Err(err) => (vec![], Some(err.to_string())),
    };
    let approved = ApprovedSenderSet::from_records(
        identities
            .iter()
            .map(|id| (id.number.as_str(), id.status.as_str())),
        &state.conf.approved_statuses,
    );
    debug!("{} sender records, {} approved", identities.len(), approved.len());
    Ok(SendersDump {
        status: registry.status,
        approved: approved.numbers().into_iter().map(str::to_string).collect(),
        parse_error,
        raw: registry.raw,
    })
}

#[get("/debug/senders")]
async fn debug_senders(state: web::Data<AppState>) -> impl Responder {
    if !state.conf.debug_routes {
        return HttpResponse::NotFound().finish();
    }
    gen_extra_respond(senders_dump(&state).await)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(version)
        .service(config)
        .service(debug_senders);
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_service_call;
    use crate::utils::api_test::{test_conf, MockGateway, DEFAULT_SENDER, RECIPIENT};
    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::http::header;
    use actix_web::{test, App, Error};
    use common::env::EnvConf;
    use gateway::{GatewayError, SmsGateway};
    use std::sync::Arc;

    fn init(
        conf: EnvConf,
        gateway: MockGateway,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = Error,
            InitError = (),
        >,
    > {
        let gateway: Arc<dyn SmsGateway> = Arc::new(gateway);
        App::new()
            .app_data(web::Data::new(AppState::new(conf, gateway)))
            .configure(configure_routes)
    }

    #[actix_web::test]
    async fn test_health_and_version() {
        let service = test::init_service(init(
            test_conf(SendPolicy::FixedSender),
            MockGateway::with_approved(&[]),
        ))
        .await;

        let (status, res) = test_service_call!(service, "get", "/health", None::<String>);
        assert_eq!(status, 200);
        assert_eq!(res, json!({"ok": true}));

        let (status, res) = test_service_call!(service, "get", "/version", None::<String>);
        assert_eq!(status, 200);
        assert_eq!(res["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(res["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn test_config_hides_credentials() {
        let service = test::init_service(init(
            test_conf(SendPolicy::FixedAdmin),
            MockGateway::with_approved(&[]),
        ))
        .await;

        let (status, res) = test_service_call!(service, "get", "/config", None::<String>);
        assert_eq!(status, 200);
        assert_eq!(res["policy"], "fixed_admin");
        assert_eq!(res["sender"], DEFAULT_SENDER);
        assert_eq!(res["admin_phone"], DEFAULT_SENDER);
        let text = res.to_string();
        assert!(!text.contains("secret"));
        assert!(!text.contains("api_key"));
    }

    #[actix_web::test]
    async fn test_debug_senders_hidden_by_default() {
        let service = test::init_service(init(
            test_conf(SendPolicy::FixedSender),
            MockGateway::with_approved(&[RECIPIENT]),
        ))
        .await;
        let (status, _) = test_service_call!(service, "get", "/debug/senders", None::<String>);
        assert_eq!(status, 404);
    }

    #[actix_web::test]
    async fn test_debug_senders() {
        let mut conf = test_conf(SendPolicy::FixedSender);
        conf.debug_routes = true;
        let service = test::init_service(init(
            conf,
            MockGateway::with_approved(&["+82 10 2222 3333"]),
        ))
        .await;
        let (status, res) = test_service_call!(service, "get", "/debug/senders", None::<String>);
        assert_eq!(status, 200);
        assert_eq!(res["status"], 200);
        assert!(res["approved"]
            .as_array()
            .unwrap()
            .contains(&json!(RECIPIENT)));
        assert_eq!(res["raw"]["data"][0]["status"], "APPROVED");
        assert!(res.get("parse_error").is_none());
    }

    #[actix_web::test]
    async fn test_debug_senders_unexpected_shape() {
        let mut conf = test_conf(SendPolicy::FixedSender);
        conf.debug_routes = true;
        let service = test::init_service(init(
            conf,
            MockGateway::with_registry(Ok(gateway::SenderRegistry {
                status: 200,
                raw: json!({"message": "unexpected"}),
            })),
        ))
        .await;
        let (status, res) = test_service_call!(service, "get", "/debug/senders", None::<String>);
        assert_eq!(status, 200);
        assert_eq!(res["approved"], json!([]));
        assert!(res["parse_error"].is_string());
        assert_eq!(res["raw"]["message"], "unexpected");
    }

    #[actix_web::test]
    async fn test_debug_senders_upstream_failure() {
        let mut conf = test_conf(SendPolicy::FixedSender);
        conf.debug_routes = true;
        let service = test::init_service(init(
            conf,
            MockGateway::with_registry(Err(GatewayError::Status {
                status: 401,
                body: "unauthorized".to_string(),
            })),
        ))
        .await;
        let (status, res) = test_service_call!(service, "get", "/debug/senders", None::<String>);
        assert_eq!(status, 500);
        assert_eq!(res["ok"], false);
        assert_eq!(res["error"], "upstream");
    }
}
