//! Client-visible failures and their JSON-RPC rendering

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use thiserror::Error;

use crate::models::RpcErrorResponse;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GatewayError {
    #[error("You hit the request limit")]
    RateLimited,

    #[error("You are not authorized to make this request")]
    NotAuthorized,

    #[error("Internal error")]
    Upstream { status: Option<StatusCode> },
}

impl GatewayError {
    pub fn code(&self) -> i32 {
        match self {
            Self::RateLimited => -32000,
            Self::NotAuthorized => -32601,
            Self::Upstream { .. } => -32603,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::NotAuthorized => StatusCode::UNAUTHORIZED,
            Self::Upstream { status } => status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

/// A failure attributed to one call's id.
#[derive(Debug)]
pub struct RpcRejection {
    pub id: Option<Value>,
    pub error: GatewayError,
}

impl RpcRejection {
    pub fn new(id: Option<Value>, error: GatewayError) -> Self {
        Self { id, error }
    }
}

impl IntoResponse for RpcRejection {
    fn into_response(self) -> Response {
        let body = RpcErrorResponse::new(self.id, self.error.code(), self.error.to_string());
        (self.error.status(), Json(body)).into_response()
    }
}
