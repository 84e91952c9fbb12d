use axum::{
    extract::{ConnectInfo, Request, State},
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::state::AppState;

// Everything that is not a local page goes through admission control
pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
) -> Response {
    state.transport.round_trip(&addr.to_string(), request).await
}
