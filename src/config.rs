use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_QUIZ_SIZE: usize = 10;
pub const DEFAULT_RECOGNITION_SUCCESS_RATE: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub database_path: PathBuf,
    pub db_max_connections: u32,
    pub jwt_secret: Option<String>,
    pub jwt_expires_in: String,
    pub quiz_size: usize,
    pub recognition_success_rate: f64,
    pub study_session_ttl: Duration,
    pub frontend_url: String,
    pub workers_enabled: bool,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_parse::<u16>("PORT").unwrap_or(3000);

        let host = env_parse::<IpAddr>("HOST").unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let database_path = env_string("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let recognition_success_rate = env_parse::<f64>("RECOGNITION_SUCCESS_RATE")
            .filter(|rate| (0.0..=1.0).contains(rate))
            .unwrap_or(DEFAULT_RECOGNITION_SUCCESS_RATE);

        Self {
            host,
            port,
            log_level,
            database_path,
            db_max_connections: env_parse::<u32>("DB_MAX_CONNECTIONS")
                .filter(|n| *n > 0)
                .unwrap_or(5),
            jwt_secret: env_string("JWT_SECRET"),
            jwt_expires_in: env_string("JWT_EXPIRES_IN").unwrap_or_else(|| "24h".to_string()),
            quiz_size: env_parse::<usize>("QUIZ_SIZE")
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_QUIZ_SIZE),
            recognition_success_rate,
            study_session_ttl: Duration::from_secs(
                env_parse::<u64>("STUDY_SESSION_TTL_SECS").unwrap_or(3600),
            ),
            frontend_url: env_string("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:8081".to_string()),
            workers_enabled: env_bool("WORKERS_ENABLED").unwrap_or(true),
            production: env_string("APP_ENV").as_deref() == Some("production"),
        }
    }

    /// Configuration for tests and embedded use: everything defaulted, database at `path`.
    pub fn for_database(path: impl Into<PathBuf>) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            log_level: "info".to_string(),
            database_path: path.into(),
            db_max_connections: 5,
            jwt_secret: None,
            jwt_expires_in: "24h".to_string(),
            quiz_size: DEFAULT_QUIZ_SIZE,
            recognition_success_rate: DEFAULT_RECOGNITION_SUCCESS_RATE,
            study_session_ttl: Duration::from_secs(3600),
            frontend_url: "http://localhost:8081".to_string(),
            workers_enabled: false,
            production: false,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lexilist")
        .join("data.db")
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|value| value.parse::<T>().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    env_string(key).map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}
