use dropvault_utils::version_info::RuntimeEnv;
use serde::Deserialize;
use std::env::vars;
use std::fmt::Display;
use std::time::Duration;
use tracing::{info, warn};

/// Download links of completed files are `{FILE_URL_BASE}/{id}`.
pub const DEFAULT_FILE_URL_BASE: &str = "https://dropvault.com/files";

const DEFAULT_RECORD_API_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub enum Env {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "test")]
    Test,
    #[serde(rename = "prod")]
    Prod,
}

impl From<&Env> for RuntimeEnv {
    fn from(env: &Env) -> Self {
        match env {
            Env::Local => RuntimeEnv::Local,
            Env::Test => RuntimeEnv::Test,
            Env::Prod => RuntimeEnv::Prod,
        }
    }
}

impl Display for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Env::Local => write!(f, "local"),
            Env::Test => write!(f, "test"),
            Env::Prod => write!(f, "prod"),
        }
    }
}

/// Connection settings for the record backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordApiSettings {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout: Duration,
}

// The final, validated configuration struct.
#[derive(Debug, Clone)]
pub struct Config {
    env: Env,
    server_addr: String,
    port: u16,
    // None leaves the record services without a client
    record_api: Option<RecordApiSettings>,
    file_url_base: String,
}

// Environment variables as read, before defaults and cross-field checks.
#[derive(Deserialize)]
struct RawConfig {
    env: Env,
    server_addr: Option<String>,
    port: Option<u16>,
    record_api_url: Option<String>,
    record_api_project_id: Option<String>,
    record_api_public_key: Option<String>,
    record_api_timeout_secs: Option<u64>,
    file_url_base: Option<String>,
}

impl Config {
    /// Create a test configuration with default values and no record backend.
    ///
    /// Available to integration tests as well; not for production use.
    pub fn new_for_test() -> Self {
        Self {
            env: Env::Local,
            server_addr: "127.0.0.1".to_owned(),
            port: 8080,
            record_api: None,
            file_url_base: DEFAULT_FILE_URL_BASE.to_owned(),
        }
    }

    /// Test configuration pointing at a record backend, e.g. a wiremock server.
    pub fn new_for_test_with_record_api(base_url: impl Into<String>) -> Self {
        Self {
            record_api: Some(RecordApiSettings {
                base_url: base_url.into(),
                project_id: "test-project".to_owned(),
                public_key: "test-public-key".to_owned(),
                timeout: Duration::from_secs(5),
            }),
            ..Self::new_for_test()
        }
    }

    pub fn environment(&self) -> &Env {
        &self.env
    }

    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_local(&self) -> bool {
        matches!(self.env, Env::Local)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self.env, Env::Prod)
    }

    pub fn record_api(&self) -> Option<&RecordApiSettings> {
        self.record_api.as_ref()
    }

    pub fn file_url_base(&self) -> &str {
        &self.file_url_base
    }

    /// Initializes configuration by reading from environment variables
    /// and applying environment-aware defaults.
    pub fn init() -> anyhow::Result<Self> {
        info!("Loading configuration from environment variables");

        let raw_config: RawConfig = serde_env::from_iter(vars())?;
        Self::from_raw(raw_config)
    }

    fn from_raw(raw_config: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            env,
            server_addr,
            port,
            record_api_url,
            record_api_project_id,
            record_api_public_key,
            record_api_timeout_secs,
            file_url_base,
        } = raw_config;

        let server_addr = match server_addr {
            Some(addr) => {
                info!("Using provided SERVER_ADDR: {}", addr);
                addr
            }
            None => {
                let default_addr = match env {
                    Env::Local => "127.0.0.1",
                    _ => "0.0.0.0",
                };
                info!(
                    "SERVER_ADDR not set, defaulting to {} for {} environment",
                    default_addr, env
                );
                default_addr.to_owned()
            }
        };

        let port = match port {
            Some(port) => port,
            None if matches!(env, Env::Local) => {
                info!("PORT not set, defaulting to 8080 for local environment");
                8080
            }
            None => anyhow::bail!("PORT must be set for {} environment", env),
        };

        let record_api = match record_api_url {
            Some(base_url) => {
                let Some(project_id) = record_api_project_id else {
                    anyhow::bail!("RECORD_API_PROJECT_ID must be set when RECORD_API_URL is set");
                };
                let Some(public_key) = record_api_public_key else {
                    anyhow::bail!("RECORD_API_PUBLIC_KEY must be set when RECORD_API_URL is set");
                };
                let timeout = Duration::from_secs(
                    record_api_timeout_secs.unwrap_or(DEFAULT_RECORD_API_TIMEOUT_SECS),
                );
                Some(RecordApiSettings {
                    base_url: base_url.trim_end_matches('/').to_owned(),
                    project_id,
                    public_key,
                    timeout,
                })
            }
            None if matches!(env, Env::Prod) => {
                anyhow::bail!("RECORD_API_URL must be set for {} environment", env)
            }
            None => {
                warn!(
                    "RECORD_API_URL not set, record services are unavailable in {} environment",
                    env
                );
                None
            }
        };

        let file_url_base = file_url_base
            .map(|base| base.trim_end_matches('/').to_owned())
            .unwrap_or_else(|| DEFAULT_FILE_URL_BASE.to_owned());

        Ok(Config {
            env,
            server_addr,
            port,
            record_api,
            file_url_base,
        })
    }
}
