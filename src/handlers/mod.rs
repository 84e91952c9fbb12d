mod home;
mod metrics;
mod proxy;
mod stats;

pub use home::home_page;
pub use metrics::metrics_handler;
pub use proxy::proxy_handler;
pub use stats::stats_handler;
