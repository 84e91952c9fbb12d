//! Admission control and forwarding for a single inbound HTTP request.
//!
//! ```text
//! Classifying -> RateChecking -> RuleChecking -> Forwarding -> Success
//!                     |               |              |
//!                     +-> Rejected <--+              +-> UpstreamError
//! ```
//!
//! Every path ends in exactly one HTTP response. The upstream is called at most
//! once per inbound request, so a batch travels upstream the way it arrived.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::{
        HeaderMap, HeaderName, HeaderValue, Uri,
        header::{CONNECTION, CONTENT_LENGTH, HOST},
        request::Parts,
    },
    response::{IntoResponse, Response},
};
use reqwest::Url;
use std::sync::Arc;
use std::time::Instant;

use crate::admission::Admission;
use crate::classifier::{classify, client_ip};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, RpcRejection};
use crate::metrics::{
    CALLS_TOTAL, FORWARD_LATENCY, RATE_LIMITED_TOTAL, REQUEST_TOTAL, UNAUTHORIZED_TOTAL,
    UPSTREAM_ERRORS,
};
use crate::models::ModifiedRequest;
use crate::rate_limit::RateLimiter;
use crate::rules::RuleMatcher;
use crate::stats::StatsRecorder;

const HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

pub struct ProxyTransport {
    client: reqwest::Client,
    target: Url,
    limiter: Arc<dyn Admission>,
    matcher: Arc<dyn Admission>,
    stats: Arc<StatsRecorder>,
    verbose: bool,
    host_override: bool,
}

impl ProxyTransport {
    pub fn new(
        config: &GatewayConfig,
        limiter: Arc<dyn Admission>,
        matcher: Arc<dyn Admission>,
        stats: Arc<StatsRecorder>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            target: config.target.clone(),
            limiter,
            matcher,
            stats,
            verbose: config.verbose,
            host_override: config.host_override,
        }
    }

    // Standard wiring: rpm limiter + allow-list matcher from the config
    pub fn from_config(config: &GatewayConfig) -> Self {
        let limiter = RateLimiter::new(config.requests_per_minute, config.no_limit_ips.clone());
        let matcher = RuleMatcher::new(&config.allowed_paths);
        Self::new(
            config,
            Arc::new(limiter),
            Arc::new(matcher),
            Arc::new(StatsRecorder::new()),
        )
    }

    pub fn stats(&self) -> &Arc<StatsRecorder> {
        &self.stats
    }

    pub async fn round_trip(&self, remote_addr: &str, request: Request) -> Response {
        let start = Instant::now();
        REQUEST_TOTAL.inc();

        let (parts, body) = request.into_parts();
        let body = match to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, client = remote_addr, "cannot read body");
                Bytes::new()
            }
        };

        let calls = classify(parts.uri.path(), remote_addr, &body);
        CALLS_TOTAL.inc_by(calls.len() as f64);

        if let Err(rejection) = self.admit(&calls) {
            return rejection.into_response();
        }

        match self.forward(&parts, remote_addr, body).await {
            Ok(response) => {
                let elapsed = start.elapsed();
                FORWARD_LATENCY.observe(elapsed.as_secs_f64());
                for call in &calls {
                    self.stats.update_stats(call, elapsed);
                    if self.verbose {
                        tracing::info!(
                            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                            path = %call.path,
                            client = %call.remote_addr,
                            "response time"
                        );
                    }
                }
                response
            }
            Err(error) => {
                UPSTREAM_ERRORS.inc();
                // only the first call's id is echoed, whichever call actually failed
                let id = calls.first().and_then(|c| c.id.clone());
                RpcRejection::new(id, error).into_response()
            }
        }
    }

    // All rate checks run before any rule check; the first failing call decides the error.
    fn admit(&self, calls: &[ModifiedRequest]) -> Result<(), RpcRejection> {
        for call in calls {
            if !self.limiter.admits(call) {
                RATE_LIMITED_TOTAL.inc();
                if self.verbose {
                    tracing::info!(path = %call.path, client = %call.remote_addr, "user hit the limit");
                }
                return Err(RpcRejection::new(call.id.clone(), GatewayError::RateLimited));
            }
        }

        for call in calls {
            if !self.matcher.admits(call) {
                UNAUTHORIZED_TOTAL.inc();
                if self.verbose {
                    tracing::info!(path = %call.path, client = %call.remote_addr, "not allowed");
                }
                return Err(RpcRejection::new(call.id.clone(), GatewayError::NotAuthorized));
            }
        }

        Ok(())
    }

    async fn forward(
        &self,
        parts: &Parts,
        remote_addr: &str,
        body: Bytes,
    ) -> Result<Response, GatewayError> {
        let url = upstream_url(&self.target, &parts.uri);

        let mut headers = strip_hop_headers(&parts.headers);
        headers.remove(HOST);
        headers.remove(CONTENT_LENGTH);
        append_forwarded_for(&mut headers, &client_ip(remote_addr));
        if self.host_override {
            // the front-line proxy rewrites Host otherwise
            match HeaderValue::from_str(remote_addr) {
                Ok(value) => {
                    headers.insert(HOST, value);
                }
                Err(e) => tracing::debug!(error = %e, remote_addr, "remote address is not a valid host header"),
            }
        }

        let upstream = self
            .client
            .request(parts.method.clone(), url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, %url, "error response from upstream");
                GatewayError::Upstream { status: e.status() }
            })?;

        let status = upstream.status();
        let headers = strip_hop_headers(upstream.headers());
        let bytes = upstream.bytes().await.map_err(|e| {
            tracing::error!(error = %e, %url, %status, "cannot read upstream body");
            GatewayError::Upstream {
                status: Some(status),
            }
        })?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response.headers_mut().remove(CONTENT_LENGTH);
        Ok(response)
    }
}

/// Target joined with the inbound path and query, single-host reverse proxy style.
pub fn upstream_url(target: &Url, uri: &Uri) -> Url {
    let base = target.path();
    let path = uri.path();
    let joined = match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    };

    let query = match (target.query().filter(|q| !q.is_empty()), uri.query().filter(|q| !q.is_empty())) {
        (Some(a), Some(b)) => Some(format!("{}&{}", a, b)),
        (Some(a), None) => Some(a.to_string()),
        (None, Some(b)) => Some(b.to_string()),
        (None, None) => None,
    };

    let mut url = target.clone();
    url.set_path(&joined);
    url.set_query(query.as_deref());
    url
}

// Copy of `headers` without hop-by-hop headers, including any named in Connection
fn strip_hop_headers(headers: &HeaderMap) -> HeaderMap {
    let named: Vec<String> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let mut out = headers.clone();
    for name in HOP_HEADERS.iter().copied().chain(named.iter().map(String::as_str)) {
        out.remove(name);
    }
    out
}

fn append_forwarded_for(headers: &mut HeaderMap, ip: &str) {
    let prior: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    let value = if prior.is_empty() {
        ip.to_string()
    } else {
        format!("{}, {}", prior.join(", "), ip)
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR.clone(), value);
    }
}
