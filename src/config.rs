use std::path::PathBuf;

use anyhow::Context;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub uploads: UploadConfig,
    pub cors_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match std::env::var("STORE").as_deref() {
            Ok("memory") => StoreKind::Memory,
            Ok("postgres") | Err(_) => StoreKind::Postgres,
            Ok(other) => anyhow::bail!("unknown STORE value: {other}"),
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if store == StoreKind::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when STORE=postgres");
        }

        let port = std::env::var("PORT")
            .ok()
            .map(|v| v.parse::<u16>().context("PORT must be a port number"))
            .transpose()?
            .unwrap_or(4000);

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            ttl_hours: parse_ttl_hours(std::env::var("JWT_TTL_HOURS").ok().as_deref())?,
        };

        let uploads = UploadConfig {
            dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./uploads")),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
        };

        Ok(Self {
            store,
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            jwt,
            uploads,
            cors_origin: std::env::var("CORS_ORIGIN").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Configuration for tests and local runs: in-memory store, fixed secret.
    pub fn for_tests(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreKind::Memory,
            database_url: None,
            host: "127.0.0.1".into(),
            port: 4000,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_hours: 24,
            },
            uploads: UploadConfig {
                dir: upload_dir.into(),
                public_base_url: "http://localhost:4000".into(),
            },
            cors_origin: None,
        }
    }
}

/// Session lifetime in hours; unset means 24, anything else must be positive.
fn parse_ttl_hours(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(24);
    };
    let hours = raw
        .trim()
        .parse::<i64>()
        .context("JWT_TTL_HOURS must be a whole number of hours")?;
    if hours <= 0 {
        anyhow::bail!("JWT_TTL_HOURS must be positive, got {hours}");
    }
    Ok(hours)
}
