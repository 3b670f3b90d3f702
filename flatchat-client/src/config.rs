/// Client configuration
///
/// Loaded from environment variables (and a `.env` file when present).
///
/// # Environment Variables
///
/// - `FLATCHAT_API_BASE_URL`: base URL for every resource family
///   (default: `http://localhost:3000/dev`)
/// - `FLATCHAT_BILLS_URL`, `FLATCHAT_TASKS_URL`, `FLATCHAT_RESERVATIONS_URL`,
///   `FLATCHAT_SHOPPING_LISTS_URL`, `FLATCHAT_NOTICES_URL`,
///   `FLATCHAT_POSTS_URL`: per-family base override (default: the API base)
/// - `FLATCHAT_READ_USER_URL`: identity lookup endpoint
///   (default: `<api base>/read-user`)
/// - `FLATCHAT_HOUSEHOLD_URL`: household directory base (default: the API base)
/// - `FLATCHAT_STATE_DIR`: directory for the persisted session tiers
///   (default: `<data dir>/flatchat`)
/// - `FLATCHAT_REQUEST_TIMEOUT_SECS`: optional per-request timeout; unset means
///   requests may wait indefinitely
///
/// # Example
///
/// ```no_run
/// use flatchat_client::config::ClientConfig;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::from_env()?;
/// println!("Bills live at {}", config.endpoints.bills);
/// # Ok(())
/// # }
/// ```

use flatchat_shared::models::ResourceFamily;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default API base used for local development
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/dev";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    /// A configured endpoint is not an absolute http(s) URL
    #[error("Invalid URL for {name}: {value}")]
    InvalidUrl { name: String, value: String },
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Complete client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Shared API base
    pub api_base_url: String,

    /// Base URL of each resource family
    pub endpoints: EndpointConfig,

    /// Identity lookup endpoint (`POST` with `{UserID}`)
    pub read_user_url: String,

    /// Household directory base
    pub household_url: String,

    /// Where the session tiers are persisted
    pub state_dir: PathBuf,

    /// Optional request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Per-family base URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub bills: String,
    pub tasks: String,
    pub reservations: String,
    pub shopping_lists: String,
    pub notices: String,
    pub posts: String,
}

impl EndpointConfig {
    /// Every family served from the same base
    pub fn uniform(base: &str) -> Self {
        let base = normalize(base);
        EndpointConfig {
            bills: base.clone(),
            tasks: base.clone(),
            reservations: base.clone(),
            shopping_lists: base.clone(),
            notices: base.clone(),
            posts: base,
        }
    }

    /// Base URL serving `family`
    pub fn base_for(&self, family: ResourceFamily) -> &str {
        match family {
            ResourceFamily::Bill => &self.bills,
            ResourceFamily::Task => &self.tasks,
            ResourceFamily::Reservation => &self.reservations,
            ResourceFamily::ShoppingList => &self.shopping_lists,
            ResourceFamily::Notice => &self.notices,
            ResourceFamily::Post => &self.posts,
        }
    }

    fn slot_mut(&mut self, family: ResourceFamily) -> &mut String {
        match family {
            ResourceFamily::Bill => &mut self.bills,
            ResourceFamily::Task => &mut self.tasks,
            ResourceFamily::Reservation => &mut self.reservations,
            ResourceFamily::ShoppingList => &mut self.shopping_lists,
            ResourceFamily::Notice => &mut self.notices,
            ResourceFamily::Post => &mut self.posts,
        }
    }
}

/// Environment variable overriding the base of `family`
fn family_var(family: ResourceFamily) -> &'static str {
    match family {
        ResourceFamily::Bill => "FLATCHAT_BILLS_URL",
        ResourceFamily::Task => "FLATCHAT_TASKS_URL",
        ResourceFamily::Reservation => "FLATCHAT_RESERVATIONS_URL",
        ResourceFamily::ShoppingList => "FLATCHAT_SHOPPING_LISTS_URL",
        ResourceFamily::Notice => "FLATCHAT_NOTICES_URL",
        ResourceFamily::Post => "FLATCHAT_POSTS_URL",
    }
}

fn normalize(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("flatchat"))
        .unwrap_or_else(|| PathBuf::from(".flatchat"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_API_BASE_URL)
    }
}

impl ClientConfig {
    /// Configuration with every endpoint derived from `base`
    pub fn with_base_url(base: &str) -> Self {
        let base = normalize(base);
        ClientConfig {
            endpoints: EndpointConfig::uniform(&base),
            read_user_url: format!("{}/read-user", base),
            household_url: base.clone(),
            api_base_url: base,
            state_dir: default_state_dir(),
            request_timeout_secs: None,
        }
    }

    /// Loads configuration from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Loads configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let base = get("FLATCHAT_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let mut config = Self::with_base_url(&base);

        for family in ResourceFamily::ALL {
            if let Some(url) = get(family_var(family)) {
                *config.endpoints.slot_mut(family) = normalize(&url);
            }
        }

        if let Some(url) = get("FLATCHAT_READ_USER_URL") {
            config.read_user_url = normalize(&url);
        }
        if let Some(url) = get("FLATCHAT_HOUSEHOLD_URL") {
            config.household_url = normalize(&url);
        }
        if let Some(dir) = get("FLATCHAT_STATE_DIR") {
            config.state_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("FLATCHAT_REQUEST_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: "FLATCHAT_REQUEST_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            config.request_timeout_secs = Some(secs);
        }

        Ok(config)
    }

    /// Request timeout, if one was configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Parsed base URL of `family`
    pub fn resource_base(&self, family: ResourceFamily) -> ConfigResult<Url> {
        parse_endpoint(family.as_str(), self.endpoints.base_for(family))
    }

    /// Parsed identity lookup endpoint
    pub fn read_user_endpoint(&self) -> ConfigResult<Url> {
        parse_endpoint("read_user", &self.read_user_url)
    }

    /// Parsed household directory base
    pub fn household_base(&self) -> ConfigResult<Url> {
        parse_endpoint("household", &self.household_url)
    }
}

fn parse_endpoint(name: &str, value: &str) -> ConfigResult<Url> {
    let invalid = || ConfigError::InvalidUrl {
        name: name.to_string(),
        value: value.to_string(),
    };

    let url = Url::parse(value).map_err(|_| invalid())?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(url)
}
