use serde::Deserialize;

impl Config {
    pub fn init() -> Result<Self, config::ConfigError> {
        // get config toml dir from env, with default
        let config_path =
            std::env::var("JAVMETA_CONFIG_PATH").unwrap_or_else(|_| String::from("./config.toml"));

        let config = config::Config::builder()
            // Optional config toml; defaults cover the no-file case
            .add_source(config::File::with_name(&config_path).required(false))
            // Add in settings from the environment (with a prefix of JAVMETA)
            .add_source(config::Environment::with_prefix("JAVMETA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

// ================================================================================================
// Models
// ================================================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

// ===============================================================================
// Logs
// ===============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// ===============================================================================
// Site
// ===============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme + host of the metadata site, no trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for search/detail page requests, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Timeout for image downloads, in seconds.
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            image_timeout_secs: default_image_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.javdatabase.com".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_image_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0 Safari/537.36".to_string()
}
