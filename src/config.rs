use super::*;

const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0/";

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
  #[error("invalid value `{value}` for {key}: {message}")]
  InvalidValue {
    key: &'static str,
    message: String,
    value: String,
  },
}

/// Client settings, passed explicitly to [`Client::new`].
#[derive(Clone, Debug)]
pub struct Config {
  /// Root of the API, e.g. `https://hacker-news.firebaseio.com/v0/`.
  pub base_url: Url,
  /// Upper bound on simultaneous transport calls across every batch of a
  /// client.
  pub max_concurrent_requests: usize,
  /// Deadline applied to each top-level batch, measured from its start.
  pub request_timeout: Duration,
  pub user_agent: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      base_url: Url::parse(DEFAULT_BASE_URL)
        .expect("default base url is valid"),
      max_concurrent_requests: 100,
      request_timeout: Duration::from_secs(10),
      user_agent: concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
      )
      .to_string(),
    }
  }
}

impl Config {
  pub const BASE_URL_VAR: &str = "HN_API_BASE_URL";
  pub const MAX_CONCURRENT_REQUESTS_VAR: &str = "HN_MAX_CONCURRENT_REQUESTS";
  pub const REQUEST_TIMEOUT_VAR: &str = "HN_REQUEST_TIMEOUT_MS";
  pub const USER_AGENT_VAR: &str = "HN_USER_AGENT";

  /// Defaults, overridden by any of the `HN_*` variables that are set.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| env::var(key).ok())
  }

  fn from_lookup(
    lookup: impl Fn(&'static str) -> Option<String>,
  ) -> Result<Self, ConfigError> {
    let mut config = Self::default();

    if let Some(value) = lookup(Self::BASE_URL_VAR) {
      config.base_url = Self::parse_base_url(&value)?;
    }

    if let Some(value) = lookup(Self::MAX_CONCURRENT_REQUESTS_VAR) {
      config.max_concurrent_requests =
        Self::parse_number(Self::MAX_CONCURRENT_REQUESTS_VAR, &value)?;
    }

    if let Some(value) = lookup(Self::REQUEST_TIMEOUT_VAR) {
      config.request_timeout = Duration::from_millis(Self::parse_number(
        Self::REQUEST_TIMEOUT_VAR,
        &value,
      )?);
    }

    if let Some(value) = lookup(Self::USER_AGENT_VAR) {
      config.user_agent = value;
    }

    config.validate()?;

    Ok(config)
  }

  pub fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
      key: Self::BASE_URL_VAR,
      message,
      value: value.to_string(),
    };

    let url = Url::parse(value.trim())
      .map_err(|error| invalid(error.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
      return Err(invalid("expected an http or https url".into()));
    }

    if url.cannot_be_a_base() {
      return Err(invalid("url cannot be used as a base".into()));
    }

    Ok(url)
  }

  fn parse_number<T: FromStr>(
    key: &'static str,
    value: &str,
  ) -> Result<T, ConfigError>
  where
    T::Err: Display,
  {
    value
      .trim()
      .parse()
      .map_err(|error: T::Err| ConfigError::InvalidValue {
        key,
        message: error.to_string(),
        value: value.to_string(),
      })
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    Self::parse_base_url(self.base_url.as_str())?;

    if self.max_concurrent_requests == 0 {
      return Err(ConfigError::InvalidValue {
        key: Self::MAX_CONCURRENT_REQUESTS_VAR,
        message: "at least one request must be allowed".into(),
        value: "0".into(),
      });
    }

    if self.max_concurrent_requests > Semaphore::MAX_PERMITS {
      return Err(ConfigError::InvalidValue {
        key: Self::MAX_CONCURRENT_REQUESTS_VAR,
        message: format!(
          "at most {} requests can be allowed",
          Semaphore::MAX_PERMITS
        ),
        value: self.max_concurrent_requests.to_string(),
      });
    }

    if self.request_timeout.is_zero() {
      return Err(ConfigError::InvalidValue {
        key: Self::REQUEST_TIMEOUT_VAR,
        message: "timeout must be positive".into(),
        value: "0".into(),
      });
    }

    Ok(())
  }
}
