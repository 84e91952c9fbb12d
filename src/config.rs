use anyhow::Context;
use clap::{ArgAction, Parser};
use reqwest::Url;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "rpc-gatekeeper")]
#[command(about = "Rate limiting, method filtering proxy for JSON-RPC nodes")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8888)]
    pub port: u16,

    // Upstream node the calls are redirected to
    #[arg(short, long, default_value = "http://127.0.0.1:8588")]
    pub url: String,

    // Allowed methods (comma-separated), a trailing * matches any suffix
    // Example: "eth*,net_*,web3_clientVersion"
    #[arg(short, long, default_value = "eth*,net_*")]
    pub allow: String,

    // Requests per minute from a single IP
    #[arg(long, default_value_t = 1000)]
    pub rpm: u32,

    // IPs with unlimited requests (comma-separated)
    #[arg(short, long)]
    pub nolimit: Option<String>,

    // Log allow/deny decisions and response timings
    #[arg(long)]
    pub verbose: bool,

    // Send the client address as the upstream Host header
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub host_override: bool,
}

/// Startup configuration, immutable once built.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub target: Url,
    pub allowed_paths: Vec<String>,
    pub requests_per_minute: u32,
    pub no_limit_ips: Vec<String>,
    pub verbose: bool,
    pub host_override: bool,
}

impl GatewayConfig {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let target = Url::parse(&args.url)
            .with_context(|| format!("invalid redirect url {:?}", args.url))?;
        if !matches!(target.scheme(), "http" | "https") {
            anyhow::bail!("redirect url must be http or https, got {:?}", args.url);
        }

        Ok(Self {
            port: args.port,
            target,
            allowed_paths: split_list(&args.allow),
            requests_per_minute: args.rpm,
            no_limit_ips: split_list(args.nolimit.as_deref().unwrap_or_default()),
            verbose: args.verbose,
            host_override: args.host_override,
        })
    }
}

// "a, b,,c" -> ["a", "b", "c"]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim()) // remove spaces
        .filter(|s| !s.is_empty()) // remove empty strings
        .map(str::to_string)
        .collect()
}
