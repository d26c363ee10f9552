use std::{net::SocketAddr, time::Duration};

use daycare_core::constants::DEFAULT_RESYNC_DEBOUNCE_MS;

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub static_dir: String,
    pub resync_debounce: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let listen_addr = std::env::var("DAYCARE_LISTEN_ADDR")
            .ok()
            .and_then(|raw| match raw.parse::<SocketAddr>() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    eprintln!("Invalid DAYCARE_LISTEN_ADDR '{}': {}", raw, e);
                    None
                }
            })
            .unwrap_or_else(default_listen_addr);
        let cors_allow = std::env::var("DAYCARE_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("DAYCARE_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let static_dir = std::env::var("DAYCARE_STATIC_DIR").unwrap_or_else(|_| "dist".into());
        let debounce_ms: u64 = std::env::var("DAYCARE_RESYNC_DEBOUNCE_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_RESYNC_DEBOUNCE_MS);
        Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            static_dir,
            resync_debounce: Duration::from_millis(debounce_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            static_dir: "dist".to_string(),
            resync_debounce: Duration::from_millis(DEFAULT_RESYNC_DEBOUNCE_MS),
        }
    }
}
