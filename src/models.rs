use serde::{Deserialize, Serialize};
use serde_json::Value;

// One logical RPC call extracted from an inbound HTTP request.
// A batch body yields one of these per array element.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedRequest {
    pub path: String,        // RPC method name, or the raw URL path as fallback
    pub remote_addr: String, // client IP, port stripped
    pub id: Option<Value>,   // echoed back in error responses
}

// JSON-RPC call as seen on the wire - only the fields we route on
#[derive(Deserialize, Debug)]
pub struct RpcCall {
    #[serde(default, alias = "Method")]
    pub method: Option<String>, // null or absent -> empty method
    #[serde(default)]
    pub id: Option<Value>,
}

// JSON-RPC 2.0 error envelope
#[derive(Serialize, Debug)]
pub struct RpcErrorResponse {
    pub jsonrpc: &'static str,
    pub id: Option<Value>,
    pub error: RpcErrorBody,
}

#[derive(Serialize, Debug)]
pub struct RpcErrorBody {
    pub code: i32,
    pub message: String,
}

impl RpcErrorResponse {
    pub fn new(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            error: RpcErrorBody {
                code,
                message: message.into(),
            },
        }
    }
}
