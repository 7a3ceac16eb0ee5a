use super::*;

/// Outcome of one fetch. Failures are values, never panics.
pub type FetchResult<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
  #[error("the request was cancelled")]
  Cancelled,
  #[error("the server's JSON response could not be parsed: {0}")]
  Decode(String),
  #[error("the server's response body was empty")]
  EmptyResponse,
  #[error("the server's HTTP response status code was not expected: HTTP {0}")]
  InvalidStatus(u16),
  #[error("the server took too long to respond")]
  RequestTimedOut,
  #[error("network error: {0}")]
  Transport(String),
  #[error("unknown error")]
  Unknown,
}

impl From<reqwest::Error> for Error {
  fn from(error: reqwest::Error) -> Self {
    if error.is_timeout() {
      return Self::RequestTimedOut;
    }

    if let Some(status) = error.status() {
      return Self::InvalidStatus(status.as_u16());
    }

    if error.is_decode() {
      return Self::Decode(error.to_string());
    }

    Self::Transport(error.to_string())
  }
}

impl From<serde_json::Error> for Error {
  fn from(error: serde_json::Error) -> Self {
    Self::Decode(error.to_string())
  }
}
