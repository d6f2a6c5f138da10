use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Carehub";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `CAREHUB_LOG`/`RUST_LOG` is unset
pub fn default_log_filter() -> String {
    "info,carehub=debug".to_string()
}

/// Get the application data directory (~/.carehub unless overridden)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".carehub")
}

/// Database path: `CAREHUB_DB` or `<data dir>/carehub.db`
pub fn database_path() -> PathBuf {
    std::env::var("CAREHUB_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| app_data_dir().join("carehub.db"))
}

/// Listen address: `CAREHUB_ADDR` or 127.0.0.1:8080
pub fn listen_addr() -> SocketAddr {
    std::env::var("CAREHUB_ADDR")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)))
}

/// Payment gateway base URL; unset → offline sessions
pub fn payment_gateway_url() -> Option<String> {
    std::env::var("CAREHUB_PAYMENT_URL").ok().filter(|v| !v.is_empty())
}

/// Payment gateway API secret
pub fn payment_secret() -> Option<String> {
    std::env::var("CAREHUB_PAYMENT_SECRET").ok().filter(|v| !v.is_empty())
}
