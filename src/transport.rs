use super::*;

/// Performs one fetch of one resource.
///
/// Implementations must give up with [`Error::RequestTimedOut`] once
/// `deadline` has passed, report non-2xx answers as
/// [`Error::InvalidStatus`] and an empty body as [`Error::EmptyResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
  async fn fetch(
    &self,
    locator: &Url,
    deadline: Instant,
  ) -> FetchResult<Vec<u8>>;
}

