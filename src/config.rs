use crate::client::ClientVariant;
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub kibana: Kibana,
    pub http: Http,
}

#[derive(Debug, Clone)]
pub struct Kibana {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub insecure: bool,
    pub client: ClientVariant,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Http {
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        tracing::info!("Loading config from file");

        let config = std::fs::read_to_string(path)?;
        Ok(serde_norway::from_str(&config)?)
    }
}

impl Kibana {
    /// Create a new Kibana config, resolving the password from an environment variable if needed
    pub fn new(
        url: String,
        username: Option<String>,
        password: Option<String>,
        password_from: Option<String>,
        insecure: bool,
        client: ClientVariant,
        timeout_seconds: u64,
    ) -> anyhow::Result<Self> {
        let password = match (password, password_from) {
            (Some(password), _) => Some(password),
            (None, Some(var)) => Some(std::env::var(&var).map_err(|e| {
                anyhow::anyhow!("Failed to read password from environment variable '{var}': {e}")
            })?),
            (None, None) => None,
        };

        Ok(Self {
            url,
            username,
            password,
            insecure,
            client,
            timeout_seconds,
        })
    }
}

impl<'de> Deserialize<'de> for Kibana {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct KibanaRaw {
            url: String,
            username: Option<String>,
            password: Option<String>,
            #[serde(rename = "passwordFrom")]
            password_from: Option<String>,
            #[serde(default)]
            insecure: Option<bool>,
            #[serde(default)]
            client: ClientVariant,
            #[serde(rename = "timeoutSeconds")]
            timeout_seconds: Option<u64>,
        }

        let raw = KibanaRaw::deserialize(deserializer)?;
        Kibana::new(
            raw.url,
            raw.username,
            raw.password,
            raw.password_from,
            raw.insecure.unwrap_or(false),
            raw.client,
            raw.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
        .map_err(serde::de::Error::custom)
    }
}
