use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::state::AppState;

pub async fn home_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let config = &state.config;
    let patterns = config
        .allowed_paths
        .iter()
        .map(|p| format!("<li><code>{}</code></li>", escape(p)))
        .collect::<String>();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>RPC gatekeeper</title></head>
<body>
<h1>RPC gatekeeper</h1>
<p>JSON-RPC requests sent to this host are checked and forwarded to the node.</p>
<p>Requests per minute per IP: {rpm}</p>
<p>Allowed methods:</p>
<ul>{patterns}</ul>
<p>Running since {since}. Call statistics: <a href="/stats">/stats</a></p>
</body>
</html>"#,
        rpm = config.requests_per_minute,
        since = state.started_at.to_rfc3339(),
    ))
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
