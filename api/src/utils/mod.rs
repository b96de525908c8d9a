use std::sync::Arc;

use common::env::EnvConf;
use gateway::SmsGateway;

pub mod respond;

/// Built once at startup and shared read-only by every worker.
pub struct AppState {
    pub conf: EnvConf,
    pub gateway: Arc<dyn SmsGateway>,
}

impl AppState {
    pub fn new(conf: EnvConf, gateway: Arc<dyn SmsGateway>) -> Self {
        AppState { conf, gateway }
    }
}
