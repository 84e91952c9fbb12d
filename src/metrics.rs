use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("gatekeeper_requests_total", "Total number of inbound HTTP requests").unwrap();
    pub static ref CALLS_TOTAL: Counter =
        register_counter!("gatekeeper_calls_total", "Total number of classified RPC calls").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("gatekeeper_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref UNAUTHORIZED_TOTAL: Counter =
        register_counter!("gatekeeper_unauthorized_total", "Requests rejected by the method allow-list").unwrap();
    pub static ref UPSTREAM_ERRORS: Counter =
        register_counter!("gatekeeper_upstream_errors_total", "Upstream transport failures").unwrap();
    pub static ref FORWARD_LATENCY: Histogram = register_histogram!(
        "gatekeeper_forward_latency_seconds",
        "Latency of successfully forwarded requests in seconds"
    )
    .unwrap();
}
