//! booking notification sms relay service

pub mod general;
pub mod notification;
pub mod utils;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http, middleware, web, App, HttpServer};
use common::env::EnvConf;
use gateway::solapi::SolapiClient;
use tracing::info;

use utils::AppState;

fn cors(origins: &[String]) -> Cors {
    let cors = if origins.iter().any(|origin| origin == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };
    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![http::header::AUTHORIZATION, http::header::ACCEPT])
        .allowed_header(http::header::CONTENT_TYPE)
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    common::log::init_logger();
    let conf = EnvConf::load()?;
    let gateway = SolapiClient::new(&conf.solapi)?;
    let service: String = format!("0.0.0.0:{}", conf.api_port);
    info!(
        "starting {} mode={} policy={} on {}",
        env!("CARGO_PKG_NAME"),
        conf.service_mode,
        conf.policy,
        service
    );
    let state = web::Data::new(AppState::new(conf, Arc::new(gateway)));

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors(&state.conf.cors_origins))
            .app_data(state.clone())
            .configure(general::configure_routes)
            .configure(notification::configure_routes)
    })
    .bind(service)?
    .run()
    .await?;
    Ok(())
}
