//! Process configuration, read once from the environment at startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::{Context, bail};
use chrono::Duration;

use harvestgate_auth::SigningSecret;
use harvestgate_auth::codec::DEFAULT_TOKEN_TTL_SECS;

const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_PORT: u16 = 5000;

/// Upper bound for `TOKEN_TTL_SECS` (30 days).
const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Immutable API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub jwt_secret: SigningSecret,
    pub host: IpAddr,
    pub port: u16,
    pub token_ttl: Duration,
}

impl ApiConfig {
    /// Configuration with the given secret and defaults for everything else.
    pub fn with_secret(jwt_secret: SigningSecret) -> Self {
        Self {
            jwt_secret,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    /// Read `JWT_SECRET`, `HOST`, `PORT` and `TOKEN_TTL_SECS`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });
        let jwt_secret = SigningSecret::new(secret).context("JWT_SECRET")?;

        let mut config = Self::with_secret(jwt_secret);

        if let Some(host) = lookup("HOST") {
            config.host = host.parse().with_context(|| format!("HOST={host}"))?;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.parse().with_context(|| format!("PORT={port}"))?;
        }
        if let Some(ttl) = lookup("TOKEN_TTL_SECS") {
            let secs: i64 = ttl.parse().with_context(|| format!("TOKEN_TTL_SECS={ttl}"))?;
            if !(1..=MAX_TOKEN_TTL_SECS).contains(&secs) {
                bail!("TOKEN_TTL_SECS must be between 1 and {MAX_TOKEN_TTL_SECS}, got {secs}");
            }
            config.token_ttl = Duration::try_seconds(secs)
                .with_context(|| format!("TOKEN_TTL_SECS={secs} out of range"))?;
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
