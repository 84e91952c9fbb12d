use std::net::SocketAddr;

use crate::models::{ModifiedRequest, RpcCall};

// Strip the port from "ip:port". Anything unparsable is used as-is.
pub fn client_ip(remote_addr: &str) -> String {
    match remote_addr.parse::<SocketAddr>() {
        Ok(addr) => addr.ip().to_string(),
        Err(_) => remote_addr.to_string(),
    }
}

// First non-whitespace byte decides: '[' is a batch
pub fn is_batch(body: &[u8]) -> bool {
    body.iter()
        .find(|c| !matches!(**c, b' ' | b'\t' | b'\n' | b'\r'))
        .is_some_and(|c| *c == b'[')
}

/// Splits an inbound request into the logical calls it carries.
///
/// Never returns an empty vec: when the body is empty, not JSON, or fails to
/// parse, the single fallback call is keyed by the raw URL path and has no id.
pub fn classify(url_path: &str, remote_addr: &str, body: &[u8]) -> Vec<ModifiedRequest> {
    let ip = client_ip(remote_addr);
    let mut calls = Vec::new();

    if is_batch(body) {
        match serde_json::from_slice::<Vec<RpcCall>>(body) {
            Ok(batch) => {
                calls.extend(batch.into_iter().map(|call| ModifiedRequest {
                    path: call.method.unwrap_or_default(),
                    remote_addr: ip.clone(),
                    id: call.id,
                }));
            }
            Err(e) => tracing::warn!(error = %e, path = url_path, client = %ip, "cannot parse JSON batch request"),
        }
    } else if !body.is_empty() {
        match serde_json::from_slice::<RpcCall>(body) {
            Ok(call) => calls.push(ModifiedRequest {
                path: call.method.unwrap_or_default(),
                remote_addr: ip.clone(),
                id: call.id,
            }),
            Err(e) => tracing::warn!(error = %e, path = url_path, client = %ip, "cannot parse JSON single request"),
        }
    }

    if calls.is_empty() {
        calls.push(ModifiedRequest {
            path: url_path.to_string(),
            remote_addr: ip,
            id: None,
        });
    }

    calls
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn batch_detection_skips_leading_whitespace() {
        assert!(is_batch(b"[]"));
        assert!(is_batch(b" \t\r\n[{\"method\":\"eth_call\"}]"));
        assert!(!is_batch(b"{\"method\":\"eth_call\"}"));
        assert!(!is_batch(b"  \n {\"a\": [1]}"));
        assert!(!is_batch(b""));
        assert!(!is_batch(b" \t\r\n"));
        // form feed is not whitespace here
        assert!(!is_batch(b"\x0c["));
    }

    #[test]
    fn client_ip_strips_port() {
        assert_eq!(client_ip("1.2.3.4:5678"), "1.2.3.4");
        assert_eq!(client_ip("[::1]:8080"), "::1");
        assert_eq!(client_ip("not-an-address"), "not-an-address");
        assert_eq!(client_ip("1.2.3.4"), "1.2.3.4");
    }

    #[test]
    fn batch_yields_one_call_per_element_in_order() {
        let body = br#"[
            {"jsonrpc":"2.0","method":"eth_a","id":1},
            {"jsonrpc":"2.0","method":"net_b","id":"two","params":[]},
            {"jsonrpc":"2.0","method":"eth_c"}
        ]"#;
        let calls = classify("/", "10.0.0.1:9000", body);

        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].path, "eth_a");
        assert_eq!(calls[0].id, Some(json!(1)));
        assert_eq!(calls[1].path, "net_b");
        assert_eq!(calls[1].id, Some(json!("two")));
        assert_eq!(calls[2].path, "eth_c");
        assert_eq!(calls[2].id, None);
        assert!(calls.iter().all(|c| c.remote_addr == "10.0.0.1"));
    }

    #[test]
    fn single_call_maps_method_and_id() {
        let calls = classify(
            "/",
            "1.2.3.4:1",
            br#"{"jsonrpc":"2.0","method":"eth_getBalance","params":["0x0","latest"],"id":42}"#,
        );
        assert_eq!(
            calls,
            vec![ModifiedRequest {
                path: "eth_getBalance".into(),
                remote_addr: "1.2.3.4".into(),
                id: Some(json!(42)),
            }]
        );
    }

    #[test]
    fn empty_body_falls_back_to_url_path() {
        let calls = classify("/some/path", "1.2.3.4:1", b"");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "/some/path");
        assert_eq!(calls[0].id, None);
    }

    #[test]
    fn malformed_bodies_fall_back_to_url_path() {
        for body in [
            &b"not json"[..],
            &b"[{\"method\": \"eth_call\""[..],
            &b"{\"method\": 5}"[..],
            &b"[1, 2, 3]"[..],
        ] {
            let calls = classify("/rpc", "1.2.3.4:1", body);
            assert_eq!(calls.len(), 1, "body {:?}", String::from_utf8_lossy(body));
            assert_eq!(calls[0].path, "/rpc");
            assert_eq!(calls[0].id, None);
        }
    }

    #[test]
    fn null_method_keeps_the_id() {
        let calls = classify("/rpc", "1.2.3.4:1", br#"{"method":null,"id":5}"#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "");
        assert_eq!(calls[0].id, Some(json!(5)));

        let calls = classify("/rpc", "1.2.3.4:1", br#"[{"id":6},{"Method":"eth_call","id":7}]"#);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].path, "");
        assert_eq!(calls[0].id, Some(json!(6)));
        assert_eq!(calls[1].path, "eth_call");
    }

    #[test]
    fn empty_batch_falls_back_to_url_path() {
        let calls = classify("/", "1.2.3.4:1", b"[]");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "/");
    }
}
