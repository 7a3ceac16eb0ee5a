use {
  super::*,
  reqwest::header::{ACCEPT, HeaderMap, HeaderValue},
};

/// [`Transport`] over HTTP(S) GET with JSON bodies.
#[derive(Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
}

impl HttpTransport {
  pub fn new(config: &Config) -> FetchResult<Self> {
    let mut headers = HeaderMap::new();

    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
      .default_headers(headers)
      .timeout(config.request_timeout)
      .user_agent(config.user_agent.clone())
      .build()?;

    Ok(Self { client })
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn fetch(
    &self,
    locator: &Url,
    deadline: Instant,
  ) -> FetchResult<Vec<u8>> {
    let request = async {
      let response = self.client.get(locator.clone()).send().await?;

      let status = response.status();

      if !status.is_success() {
        return Err(Error::InvalidStatus(status.as_u16()));
      }

      let body = response.bytes().await?;

      if body.is_empty() {
        return Err(Error::EmptyResponse);
      }

      Ok::<_, Error>(body.to_vec())
    };

    time::timeout_at(deadline, request)
      .await
      .map_err(|_| Error::RequestTimedOut)?
  }
}
