use super::*;

/// In-memory [`Transport`] serving canned payloads.
///
/// Routes are keyed by locator, so a transport only answers for the base url
/// it was created with. Unrouted locators answer `null`, like the real
/// service does for unknown ids. Clones share routes and counters.
#[derive(Clone)]
pub struct MemoryTransport {
  base_url: Url,
  state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
  calls: HashMap<Url, usize>,
  in_flight: usize,
  max_in_flight: usize,
  routes: HashMap<Url, Route>,
}

#[derive(Clone)]
struct Route {
  delay: Duration,
  response: FetchResult<Vec<u8>>,
}

struct InFlight<'a> {
  state: &'a Mutex<MemoryState>,
}

impl Drop for InFlight<'_> {
  fn drop(&mut self) {
    if let Ok(mut state) = self.state.lock() {
      state.in_flight -= 1;
    }
  }
}

impl Default for MemoryTransport {
  fn default() -> Self {
    Self::new(Config::default().base_url)
  }
}

impl MemoryTransport {
  /// Makes every later fetch of `endpoint` wait `delay` before answering.
  pub fn delay(&self, endpoint: &Endpoint, delay: Duration) -> &Self {
    let locator = endpoint.locator(&self.base_url);

    let mut state = self.lock();

    state
      .routes
      .entry(locator)
      .or_insert_with(|| Route {
        delay: Duration::ZERO,
        response: Ok(b"null".to_vec()),
      })
      .delay = delay;

    self
  }

  /// Makes fetches of `endpoint` fail with `error`.
  pub fn fail(&self, endpoint: &Endpoint, error: Error) -> &Self {
    self.route(endpoint, Err(error))
  }

  /// Number of fetches issued for `endpoint` so far.
  pub fn fetches(&self, endpoint: &Endpoint) -> usize {
    let locator = endpoint.locator(&self.base_url);

    self.lock().calls.get(&locator).copied().unwrap_or(0)
  }

  /// Serves a JSON item.
  pub fn item(&self, id: ItemId, value: Value) -> &Self {
    self.respond(&Endpoint::Item(id), value.to_string())
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
    self
      .state
      .lock()
      .unwrap_or_else(std::sync::PoisonError::into_inner)
  }

  /// Highest number of fetches that were running at the same time.
  pub fn max_in_flight(&self) -> usize {
    self.lock().max_in_flight
  }

  pub fn new(base_url: Url) -> Self {
    Self {
      base_url,
      state: Arc::default(),
    }
  }

  /// Serves a raw payload for `endpoint`.
  pub fn respond(
    &self,
    endpoint: &Endpoint,
    payload: impl Into<Vec<u8>>,
  ) -> &Self {
    self.route(endpoint, Ok(payload.into()))
  }

  fn route(
    &self,
    endpoint: &Endpoint,
    response: FetchResult<Vec<u8>>,
  ) -> &Self {
    let locator = endpoint.locator(&self.base_url);

    let mut state = self.lock();

    let delay = state
      .routes
      .get(&locator)
      .map_or(Duration::ZERO, |route| route.delay);

    state.routes.insert(locator, Route { delay, response });

    drop(state);

    self
  }

  /// Serves a ranked id list.
  pub fn stories(&self, kind: StoryListKind, ids: &[ItemId]) -> &Self {
    self.respond(
      &Endpoint::Stories(kind),
      Value::from(ids.to_vec()).to_string(),
    )
  }

  /// Total number of fetches issued.
  pub fn total_fetches(&self) -> usize {
    self.lock().calls.values().sum()
  }

  /// Serves a JSON user.
  pub fn user(&self, name: &str, value: Value) -> &Self {
    self.respond(&Endpoint::User(name.to_string()), value.to_string())
  }
}

#[async_trait]
impl Transport for MemoryTransport {
  async fn fetch(
    &self,
    locator: &Url,
    deadline: Instant,
  ) -> FetchResult<Vec<u8>> {
    let route = {
      let mut state = self.lock();

      *state.calls.entry(locator.clone()).or_default() += 1;

      state.in_flight += 1;
      state.max_in_flight = state.max_in_flight.max(state.in_flight);

      state.routes.get(locator).cloned()
    };

    let _in_flight = InFlight { state: &self.state };

    let Route { delay, response } = route.unwrap_or(Route {
      delay: Duration::ZERO,
      response: Ok(b"null".to_vec()),
    });

    if !delay.is_zero() {
      time::timeout_at(deadline, time::sleep(delay))
        .await
        .map_err(|_| Error::RequestTimedOut)?;
    }

    response
  }
}
