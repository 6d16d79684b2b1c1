use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    str::FromStr,
};

use anyhow::Context;
use config::Environment;
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HEALTH_CACHE_TTL: Duration = Duration(std::time::Duration::from_secs(30));

/// Loads the configuration from the process environment (plus `.env`, if
/// present) and resolves all fallback chains once.
pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let raw: RawConfig = config::Config::builder()
        .add_source(Environment::default())
        .build()?
        .try_deserialize()
        .context("Failed to read configuration from the environment")?;

    raw.resolve()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub health: HealthConfig,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// `None` if any of `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASS`
    /// is absent. The server still starts in that case and every dispatch
    /// fails until the deployment is fixed.
    pub smtp: Option<SmtpConfig>,
    /// `CONTACT_RECIPIENT`, falling back to `SMTP_USER`.
    pub recipient: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// `SMTP_SECURE` if set ("true" selects SMTPS), otherwise `port == 465`.
    pub secure: bool,
    pub user: String,
    pub pass: String,
    /// `MAIL_FROM`, falling back to `SMTP_USER`.
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub status_cache_ttl: Duration,
}

/// Raw environment values. Everything stays a string here so that a missing
/// variable can downgrade gracefully while a malformed one fails loudly
/// during [`RawConfig::resolve`].
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    port: Option<String>,
    host: Option<String>,
    smtp_host: Option<String>,
    smtp_port: Option<String>,
    smtp_user: Option<String>,
    smtp_pass: Option<String>,
    smtp_secure: Option<String>,
    mail_from: Option<String>,
    contact_recipient: Option<String>,
    static_dir: Option<String>,
    health_cache_ttl: Option<String>,
}

impl RawConfig {
    fn resolve(self) -> anyhow::Result<Config> {
        let port = match &self.port {
            Some(value) => value
                .parse()
                .with_context(|| format!("Invalid PORT value {value:?}"))?,
            None => DEFAULT_PORT,
        };

        let host = match &self.host {
            Some(value) => value
                .parse()
                .with_context(|| format!("Invalid HOST value {value:?}"))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let recipient = self.contact_recipient.or_else(|| self.smtp_user.clone());

        let smtp = match (self.smtp_host, self.smtp_port, self.smtp_user, self.smtp_pass) {
            (Some(host), Some(smtp_port), Some(user), Some(pass)) => {
                let smtp_port: u16 = smtp_port
                    .parse()
                    .with_context(|| format!("Invalid SMTP_PORT value {smtp_port:?}"))?;
                let secure = match self.smtp_secure {
                    Some(value) => value.eq_ignore_ascii_case("true"),
                    None => smtp_port == 465,
                };
                let from = self.mail_from.unwrap_or_else(|| user.clone());
                Some(SmtpConfig {
                    host,
                    port: smtp_port,
                    secure,
                    user,
                    pass,
                    from,
                })
            }
            _ => None,
        };

        let status_cache_ttl = match &self.health_cache_ttl {
            Some(value) => value
                .parse()
                .map_err(|err: anyhow::Error| {
                    err.context(format!("Invalid HEALTH_CACHE_TTL value {value:?}"))
                })?,
            None => DEFAULT_HEALTH_CACHE_TTL,
        };

        Ok(Config {
            http: HttpConfig { host, port },
            email: EmailConfig { smtp, recipient },
            health: HealthConfig { status_cache_ttl },
            static_dir: self.static_dir.map(PathBuf::from).unwrap_or_else(|| ".".into()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl FromStr for Duration {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = std::time::Duration::default();
        for part in s.split_whitespace() {
            let mut bytes = part.bytes();
            let mut seconds = 0;
            for b in bytes.by_ref() {
                match b {
                    b'0'..=b'9' => seconds = seconds * 10 + (b - b'0') as u64,
                    b's' => break,
                    b'm' => {
                        seconds *= 60;
                        break;
                    }
                    b'h' => {
                        seconds *= 3600;
                        break;
                    }
                    b'd' => {
                        seconds *= 24 * 3600;
                        break;
                    }
                    _ => anyhow::bail!("Invalid duration"),
                }
            }
            if bytes.next().is_some() {
                anyhow::bail!("Invalid duration");
            }
            out += std::time::Duration::from_secs(seconds);
        }
        Ok(Self(out))
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}
