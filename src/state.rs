use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::stats::StatsRecorder;
use crate::transport::ProxyTransport;

// app's shared state
pub struct AppState {
    pub config: GatewayConfig,
    pub transport: ProxyTransport,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Self {
        let transport = ProxyTransport::from_config(&config);
        Self {
            config,
            transport,
            started_at: Utc::now(),
        }
    }

    pub fn stats(&self) -> &Arc<StatsRecorder> {
        self.transport.stats()
    }
}
