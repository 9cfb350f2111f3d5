// src/config.rs
use std::{str::FromStr, time::Duration};

use reqwest::Url;

use crate::error::{ClientError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/chat";

/// Where the session identifier comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSource {
    Fixed(String),
    Generate,
    Server,
}

impl FromStr for SessionSource {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s {
            "" => Err(ClientError::Config("session must not be empty".to_string())),
            "generate" => Ok(SessionSource::Generate),
            "server" => Ok(SessionSource::Server),
            _ => {
                let id = s.strip_prefix("fixed:").unwrap_or(s).trim();
                if id.is_empty() {
                    return Err(ClientError::Config(
                        "fixed session id must not be empty".to_string(),
                    ));
                }
                Ok(SessionSource::Fixed(id.to_string()))
            }
        }
    }
}

/// Order in which bot replies are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyOrder {
    /// Render each reply as soon as it resolves.
    #[default]
    Arrival,
    /// Hold replies back until every earlier request has rendered.
    Send,
}

impl FromStr for ReplyOrder {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arrival" => Ok(ReplyOrder::Arrival),
            "send" => Ok(ReplyOrder::Send),
            other => Err(ClientError::Config(format!(
                "unknown reply order '{other}', expected 'arrival' or 'send'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub session: SessionSource,
    pub reply_order: ReplyOrder,
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            session: SessionSource::Generate,
            reply_order: ReplyOrder::Arrival,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Reads `CHAT_*` variables from the process environment, after loading
    /// an optional `.env` file.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("CHAT_ENDPOINT") {
            let url = Url::parse(raw.trim())
                .map_err(|e| ClientError::Config(format!("invalid CHAT_ENDPOINT '{raw}': {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ClientError::Config(format!(
                    "CHAT_ENDPOINT must be http or https, got '{}'",
                    url.scheme()
                )));
            }
            config.endpoint = url;
        }

        if let Some(raw) = lookup("CHAT_SESSION") {
            config.session = raw.parse()?;
        }

        if let Some(raw) = lookup("CHAT_REPLY_ORDER") {
            config.reply_order = raw.parse()?;
        }

        if let Some(raw) = lookup("CHAT_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("invalid CHAT_REQUEST_TIMEOUT_SECS '{raw}'"))
            })?;
            if secs == 0 {
                return Err(ClientError::Config(
                    "CHAT_REQUEST_TIMEOUT_SECS must be positive".to_string(),
                ));
            }
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
