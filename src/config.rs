use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub backend: StorageBackend,
    pub upload_delay: Duration,
}

impl AppConfig {
    /// Reads configuration from the environment, falling back to local
    /// development defaults.
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://campus.db?mode=rwc".to_string());

        let host: IpAddr = env::var("HOST")
            .ok()
            .and_then(|h| h.parse().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let backend = match env::var("STORAGE").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            _ => StorageBackend::Sqlite,
        };

        let upload_delay = env::var("UPLOAD_PROCESSING_DELAY_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(2));

        Self {
            database_url,
            listen_addr: SocketAddr::new(host, port),
            backend,
            upload_delay,
        }
    }
}
