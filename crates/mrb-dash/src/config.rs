use crate::error::DashError;
use crate::transport::ReconnectPolicy;
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_RECONNECT_MS: u64 = 3000;
pub const DEFAULT_REFRESH_SECS: u64 = 30;
pub const WS_ENDPOINT_PATH: &str = "/api/ws";

/// Resolved runtime configuration for the live client.
#[derive(Debug, Clone)]
pub struct DashConfig {
    pub base_url: Url,
    pub ws_url: Url,
    pub reconnect: ReconnectPolicy,
    pub refresh_interval: Duration,
    pub log_dir: String,
}

impl DashConfig {
    pub fn new(
        base_url: Url,
        reconnect: ReconnectPolicy,
        refresh_interval: Duration,
        log_dir: String,
    ) -> Result<Self, DashError> {
        let ws_url = derive_ws_url(&base_url)?;
        Ok(Self {
            base_url,
            ws_url,
            reconnect,
            refresh_interval,
            log_dir,
        })
    }
}

/// Duplex endpoint derived from the dashboard's base URL: same host, scheme
/// mirrored onto the websocket variant (`https` pages get `wss`), fixed
/// `/api/ws` path.
pub fn derive_ws_url(base_url: &Url) -> Result<Url, DashError> {
    let scheme = match base_url.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    let mut ws_url = base_url.clone();
    ws_url
        .set_scheme(scheme)
        .map_err(|_| DashError::Transport(format!("cannot derive ws scheme from {base_url}")))?;
    ws_url.set_path(WS_ENDPOINT_PATH);
    ws_url.set_query(None);
    Ok(ws_url)
}

pub fn resolve_base_url(flag: &str) -> Result<Url, DashError> {
    if !flag.trim().is_empty() {
        return Ok(Url::parse(flag)?);
    }
    if let Ok(value) = env::var("MRB_BASE_URL") {
        if !value.trim().is_empty() {
            return Ok(Url::parse(&value)?);
        }
    }
    Ok(Url::parse(DEFAULT_BASE_URL)?)
}

pub fn resolve_log_dir(flag: &str) -> String {
    if !flag.trim().is_empty() {
        return flag.to_string();
    }
    if let Ok(value) = env::var("MRB_LOG_DIR") {
        if !value.trim().is_empty() {
            return value;
        }
    }
    String::new()
}
