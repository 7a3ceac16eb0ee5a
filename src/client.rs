use super::*;

/// Hacker News API client.
///
/// Cheap to clone: clones share the transport, the request limiter and the
/// root cancellation token. Every method must be awaited inside a tokio
/// runtime.
#[derive(Clone)]
pub struct Client {
  cancellation: CancellationToken,
  config: Arc<Config>,
  limiter: Arc<Semaphore>,
  transport: Arc<dyn Transport>,
}

impl Client {
  /// Token whose cancellation stops every batch of this client and of its
  /// clones.
  pub fn cancellation_token(&self) -> &CancellationToken {
    &self.cancellation
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  fn deadline(&self) -> Instant {
    Instant::now() + self.config.request_timeout
  }

  async fn fetch(
    &self,
    endpoint: &Endpoint,
    deadline: Instant,
    token: &CancellationToken,
  ) -> FetchResult<Vec<u8>> {
    let locator = endpoint.locator(&self.config.base_url);

    let request = async {
      let _permit = time::timeout_at(deadline, self.limiter.acquire())
        .await
        .map_err(|_| Error::RequestTimedOut)?
        .map_err(|_| Error::Cancelled)?;

      trace!(%locator, "fetching");

      self.transport.fetch(&locator, deadline).await
    };

    tokio::select! {
      biased;
      () = token.cancelled() => Err(Error::Cancelled),
      result = request => result,
    }
  }

  /// Fetches the full reply tree under each direct child of `story`.
  ///
  /// Returns one entry per child id, in the story's order. A story without
  /// replies resolves to an empty list without touching the network.
  pub async fn fetch_comments(
    &self,
    story: &Story,
  ) -> Vec<FetchResult<Comment>> {
    if story.kid_ids.is_empty() {
      return Vec::new();
    }

    let deadline = self.deadline();

    let token = self.cancellation.child_token();

    let client = self.clone();

    let batch_token = token.clone();

    let batch = aggregate(story.kid_ids.clone(), move |id| {
      client.fetch_tree(id, deadline, batch_token.clone())
    });

    supervise(deadline, &token, batch)
      .await
      .unwrap_or_else(|error| vec![Err(error)])
  }

  async fn fetch_item<T: Item>(
    &self,
    id: ItemId,
    deadline: Instant,
    token: &CancellationToken,
  ) -> FetchResult<T> {
    let payload = self.fetch(&Endpoint::Item(id), deadline, token).await?;

    decode_item(&payload).inspect_err(|error| {
      debug!(id, %error, "failed to decode item");
    })
  }

  /// Fetches the stories of a ranked list.
  ///
  /// Only the first `count` ids of the list are fetched; the result is shorter
  /// when the list is. If the list itself cannot be loaded the result is that
  /// single failure.
  pub async fn fetch_stories(
    &self,
    kind: StoryListKind,
    count: usize,
  ) -> Vec<FetchResult<Story>> {
    if count == 0 {
      return Vec::new();
    }

    let deadline = self.deadline();

    let token = self.cancellation.child_token();

    let batch = async {
      let mut ids = self.fetch_story_ids_until(kind, deadline, &token).await?;

      ids.truncate(count);

      let client = self.clone();

      let batch_token = token.clone();

      Ok::<_, Error>(
        aggregate(ids, move |id| {
          let client = client.clone();
          let token = batch_token.clone();

          async move { client.fetch_item::<Story>(id, deadline, &token).await }
        })
        .await,
      )
    };

    supervise(deadline, &token, batch)
      .await
      .and_then(|stories| stories)
      .unwrap_or_else(|error| vec![Err(error)])
  }

  /// Fetches a single story, job or poll.
  pub async fn fetch_story(&self, id: ItemId) -> FetchResult<Story> {
    let deadline = self.deadline();

    let token = self.cancellation.child_token();

    supervise(deadline, &token, self.fetch_item(id, deadline, &token)).await?
  }

  /// Fetches the complete id list of a ranked story list.
  pub async fn fetch_story_ids(
    &self,
    kind: StoryListKind,
  ) -> FetchResult<Vec<ItemId>> {
    let deadline = self.deadline();

    let token = self.cancellation.child_token();

    supervise(
      deadline,
      &token,
      self.fetch_story_ids_until(kind, deadline, &token),
    )
    .await?
  }

  async fn fetch_story_ids_until(
    &self,
    kind: StoryListKind,
    deadline: Instant,
    token: &CancellationToken,
  ) -> FetchResult<Vec<ItemId>> {
    let payload = self
      .fetch(&Endpoint::Stories(kind), deadline, token)
      .await?;

    decode(&payload)
  }

  /// Fetches comment `id` and, recursively, every reply below it.
  ///
  /// Replies that fail to load are left out of the parent's materialized
  /// kids; [`Comment::has_missing_replies`] reports the gap.
  fn fetch_tree(
    &self,
    id: ItemId,
    deadline: Instant,
    token: CancellationToken,
  ) -> BoxFuture<'static, FetchResult<Comment>> {
    let client = self.clone();

    async move {
      let mut comment = client
        .fetch_item::<Comment>(id, deadline, &token)
        .await?;

      if comment.kid_ids.is_empty() {
        return Ok::<_, Error>(comment);
      }

      let children = {
        let client = client.clone();
        let token = token.clone();

        aggregate(comment.kid_ids.clone(), move |kid| {
          client.fetch_tree(kid, deadline, token.clone())
        })
        .await
      };

      let kids = children
        .into_iter()
        .zip(&comment.kid_ids)
        .filter_map(|(child, kid)| {
          child
            .inspect_err(|error| {
              debug!(
                parent = id,
                id = kid,
                %error,
                "dropping reply that failed to load"
              );
            })
            .ok()
        })
        .collect();

      comment.attach_kids(kids);

      Ok::<_, Error>(comment)
    }
    .boxed()
  }

  /// Fetches the profile of user `name`.
  pub async fn fetch_user(&self, name: &str) -> FetchResult<User> {
    let deadline = self.deadline();

    let token = self.cancellation.child_token();

    let request = async {
      let payload = self
        .fetch(&Endpoint::User(name.to_string()), deadline, &token)
        .await?;

      decode::<User>(&payload)
    };

    supervise(deadline, &token, request).await?
  }

  /// Client over HTTP(S) with the given settings, which are validated first.
  pub fn new(config: Config) -> FetchResult<Self> {
    config
      .validate()
      .map_err(|error| Error::Transport(error.to_string()))?;

    let transport = HttpTransport::new(&config)?;

    Ok(Self::with_transport(config, transport))
  }

  /// Clone of this client whose batches stop when `token` is cancelled.
  pub fn with_cancellation(&self, token: CancellationToken) -> Self {
    Self {
      cancellation: token,
      ..self.clone()
    }
  }

  /// Client over an arbitrary transport. The request limit is clamped into
  /// the range a semaphore supports.
  pub fn with_transport(
    config: Config,
    transport: impl Transport + 'static,
  ) -> Self {
    let permits = config
      .max_concurrent_requests
      .clamp(1, Semaphore::MAX_PERMITS);

    Self {
      cancellation: CancellationToken::new(),
      limiter: Arc::new(Semaphore::new(permits)),
      config: Arc::new(config),
      transport: Arc::new(transport),
    }
  }
}

#[cfg(test)]
mod tests {
  use {super::*, serde_json::json};

  fn story_json(id: ItemId, kids: &[ItemId]) -> Value {
    json!({
      "by": "author",
      "descendants": kids.len(),
      "id": id,
      "kids": kids,
      "score": 10,
      "time": 1_700_000_000,
      "title": format!("Story {id}"),
      "type": "story",
      "url": format!("https://example.com/{id}"),
    })
  }

  fn comment_json(id: ItemId, parent: ItemId, kids: &[ItemId]) -> Value {
    json!({
      "by": format!("user{id}"),
      "id": id,
      "kids": kids,
      "parent": parent,
      "text": format!("comment {id}"),
      "time": 1_700_000_000,
      "type": "comment",
    })
  }

  fn client(transport: &MemoryTransport) -> Client {
    Client::with_transport(Config::default(), transport.clone())
  }

  fn client_with(transport: &MemoryTransport, config: Config) -> Client {
    Client::with_transport(config, transport.clone())
  }

  fn story(transport: &MemoryTransport, id: ItemId, kids: &[ItemId]) -> Story {
    transport.item(id, story_json(id, kids));

    serde_json::from_value(story_json(id, kids)).unwrap()
  }

  fn ids<T: Item>(results: &[FetchResult<T>]) -> Vec<FetchResult<ItemId>> {
    results
      .iter()
      .map(|result| result.as_ref().map(Item::id).map_err(Clone::clone))
      .collect()
  }

  #[tokio::test(start_paused = true)]
  async fn fetch_stories_takes_a_prefix_of_the_ranked_list() {
    let transport = MemoryTransport::default();

    let ranked = (1..=1000).rev().collect::<Vec<ItemId>>();

    transport.stories(StoryListKind::Top, &ranked);

    for (position, id) in ranked.iter().take(10).enumerate() {
      transport
        .item(*id, story_json(*id, &[]))
        .delay(
          &Endpoint::Item(*id),
          Duration::from_millis(200 - 10 * position as u64),
        );
    }

    let stories =
      client(&transport).fetch_stories(StoryListKind::Top, 10).await;

    assert_eq!(
      ids(&stories),
      ranked.iter().take(10).map(|id| Ok(*id)).collect::<Vec<_>>()
    );

    assert_eq!(transport.fetches(&Endpoint::Stories(StoryListKind::Top)), 1);
    assert_eq!(transport.total_fetches(), 11);
    assert_eq!(transport.max_in_flight(), 10);
  }

  #[tokio::test]
  async fn fetch_stories_returns_fewer_when_the_list_is_short() {
    let transport = MemoryTransport::default();

    transport
      .stories(StoryListKind::Ask, &[5, 6])
      .item(5, story_json(5, &[]))
      .item(6, story_json(6, &[]));

    let stories =
      client(&transport).fetch_stories(StoryListKind::Ask, 30).await;

    assert_eq!(ids(&stories), vec![Ok(5), Ok(6)]);
  }

  #[tokio::test]
  async fn fetch_stories_keeps_failures_in_place() {
    let transport = MemoryTransport::default();

    transport
      .stories(StoryListKind::New, &[1, 2, 3])
      .item(1, story_json(1, &[]))
      .fail(&Endpoint::Item(2), Error::InvalidStatus(500))
      .item(3, story_json(3, &[]));

    let stories = client(&transport).fetch_stories(StoryListKind::New, 3).await;

    assert_eq!(
      ids(&stories),
      vec![Ok(1), Err(Error::InvalidStatus(500)), Ok(3)]
    );
  }

  #[tokio::test]
  async fn fetch_stories_surfaces_a_failed_list_as_one_entry() {
    let transport = MemoryTransport::default();

    transport.fail(
      &Endpoint::Stories(StoryListKind::Best),
      Error::Transport("connection reset".into()),
    );

    let stories =
      client(&transport).fetch_stories(StoryListKind::Best, 5).await;

    assert_eq!(
      ids(&stories),
      vec![Err(Error::Transport("connection reset".into()))]
    );
  }

  #[tokio::test]
  async fn fetch_stories_with_zero_count_skips_the_network() {
    let transport = MemoryTransport::default();

    assert!(
      client(&transport)
        .fetch_stories(StoryListKind::Top, 0)
        .await
        .is_empty()
    );
    assert_eq!(transport.total_fetches(), 0);
  }

  #[tokio::test]
  async fn fetch_comments_without_kids_issues_no_fetches() {
    let transport = MemoryTransport::default();

    let story = story(&transport, 1, &[]);

    assert!(client(&transport).fetch_comments(&story).await.is_empty());
    assert_eq!(transport.total_fetches(), 0);
  }

  #[tokio::test]
  async fn fetch_comments_drops_replies_that_fail_to_decode() {
    let transport = MemoryTransport::default();

    let story = story(&transport, 100, &[1]);

    transport
      .item(1, comment_json(1, 100, &[2, 3]))
      .item(2, comment_json(2, 1, &[]))
      .respond(&Endpoint::Item(3), "{\"id\": 3, \"type\": ");

    let comments = client(&transport).fetch_comments(&story).await;

    assert_eq!(ids(&comments), vec![Ok(1)]);

    let root = comments[0].as_ref().unwrap();

    assert_eq!(root.kids().len(), 1);
    assert_eq!(root.kids()[0].id(), 2);
    assert!(root.kids()[0].kids().is_empty());
    assert!(root.has_missing_replies());
  }

  #[tokio::test(start_paused = true)]
  async fn fetch_comments_materializes_deep_trees_in_order() {
    let transport = MemoryTransport::default();

    let story = story(&transport, 100, &[1, 4]);

    transport
      .item(1, comment_json(1, 100, &[2, 3]))
      .item(2, comment_json(2, 1, &[5]))
      .item(3, comment_json(3, 1, &[]))
      .item(4, comment_json(4, 100, &[]))
      .item(5, comment_json(5, 2, &[]))
      .delay(&Endpoint::Item(2), Duration::from_millis(50))
      .delay(&Endpoint::Item(1), Duration::from_millis(20));

    let comments = client(&transport).fetch_comments(&story).await;

    assert_eq!(ids(&comments), vec![Ok(1), Ok(4)]);

    let first = comments[0].as_ref().unwrap();

    assert_eq!(
      first.kids().iter().map(Item::id).collect::<Vec<_>>(),
      vec![2, 3]
    );
    assert_eq!(first.kids()[0].kids()[0].id(), 5);
    assert_eq!(first.descendant_count(), 3);
    assert!(!first.has_missing_replies());
  }

  #[tokio::test]
  async fn top_level_comment_failures_stay_visible() {
    let transport = MemoryTransport::default();

    let story = story(&transport, 100, &[1, 2]);

    transport.item(1, comment_json(1, 100, &[]));

    let comments = client(&transport).fetch_comments(&story).await;

    assert_eq!(ids(&comments), vec![Ok(1), Err(Error::EmptyResponse)]);
  }

  #[tokio::test(start_paused = true)]
  async fn timed_out_batches_deliver_a_single_failure() {
    let transport = MemoryTransport::default();

    let story = story(&transport, 100, &[1, 2]);

    transport
      .item(1, comment_json(1, 100, &[]))
      .item(2, comment_json(2, 100, &[3]))
      .item(3, comment_json(3, 2, &[]))
      .delay(&Endpoint::Item(3), Duration::from_secs(30));

    let client = client_with(
      &transport,
      Config {
        request_timeout: Duration::from_secs(1),
        ..Config::default()
      },
    );

    let comments = client.fetch_comments(&story).await;

    assert_eq!(ids(&comments), vec![Err(Error::RequestTimedOut)]);

    time::sleep(Duration::from_secs(60)).await;

    assert_eq!(transport.fetches(&Endpoint::Item(3)), 1);
    assert!(!client.cancellation_token().is_cancelled());
  }

  #[tokio::test(start_paused = true)]
  async fn timed_out_story_batches_deliver_a_single_failure() {
    let transport = MemoryTransport::default();

    transport
      .stories(StoryListKind::Show, &[1, 2])
      .item(1, story_json(1, &[]))
      .item(2, story_json(2, &[]))
      .delay(&Endpoint::Item(2), Duration::from_secs(20));

    let client = client_with(
      &transport,
      Config {
        request_timeout: Duration::from_secs(5),
        ..Config::default()
      },
    );

    let stories = client.fetch_stories(StoryListKind::Show, 2).await;

    assert_eq!(ids(&stories), vec![Err(Error::RequestTimedOut)]);
  }

  #[tokio::test(start_paused = true)]
  async fn cancelling_the_client_stops_descendant_fetches() {
    let transport = MemoryTransport::default();

    let story = story(&transport, 100, &[1]);

    transport
      .item(1, comment_json(1, 100, &[2]))
      .item(2, comment_json(2, 1, &[3]))
      .item(3, comment_json(3, 2, &[]))
      .delay(&Endpoint::Item(2), Duration::from_secs(2));

    let token = CancellationToken::new();

    let client = client(&transport).with_cancellation(token.clone());

    tokio::spawn(async move {
      time::sleep(Duration::from_secs(1)).await;
      token.cancel();
    });

    let comments = client.fetch_comments(&story).await;

    assert_eq!(ids(&comments), vec![Err(Error::Cancelled)]);

    time::sleep(Duration::from_secs(10)).await;

    assert_eq!(transport.fetches(&Endpoint::Item(3)), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn the_limiter_bounds_in_flight_fetches() {
    let transport = MemoryTransport::default();

    let kids = (1..=20).collect::<Vec<ItemId>>();

    let story = story(&transport, 100, &kids);

    for id in &kids {
      transport
        .item(*id, comment_json(*id, 100, &[]))
        .delay(&Endpoint::Item(*id), Duration::from_millis(100));
    }

    let client = client_with(
      &transport,
      Config {
        max_concurrent_requests: 4,
        ..Config::default()
      },
    );

    let comments = client.fetch_comments(&story).await;

    assert_eq!(comments.len(), 20);
    assert!(comments.iter().all(Result::is_ok));
    assert_eq!(transport.max_in_flight(), 4);
  }

  #[tokio::test]
  async fn a_single_permit_still_materializes_deep_chains() {
    let transport = MemoryTransport::default();

    let story = story(&transport, 100, &[1]);

    for id in 1..=30 {
      let kids = if id < 30 { vec![id + 1] } else { Vec::new() };

      transport.item(id, comment_json(id, id - 1, &kids));
    }

    let client = client_with(
      &transport,
      Config {
        max_concurrent_requests: 1,
        ..Config::default()
      },
    );

    let comments = client.fetch_comments(&story).await;

    assert_eq!(comments.len(), 1);

    let root = comments[0].as_ref().unwrap();

    assert_eq!(root.descendant_count(), 29);
    assert_eq!(transport.max_in_flight(), 1);
    assert_eq!(transport.total_fetches(), 30);
  }

  #[test]
  fn oversized_request_limits_are_clamped() {
    let client = client_with(
      &MemoryTransport::default(),
      Config {
        max_concurrent_requests: usize::MAX,
        ..Config::default()
      },
    );

    assert_eq!(client.limiter.available_permits(), Semaphore::MAX_PERMITS);
  }

  #[test]
  fn new_rejects_invalid_configs() {
    let result = Client::new(Config {
      base_url: Url::parse("mailto:someone@example.com").unwrap(),
      ..Config::default()
    });

    assert!(matches!(result, Err(Error::Transport(_))));

    let result = Client::new(Config {
      max_concurrent_requests: usize::MAX,
      ..Config::default()
    });

    assert!(matches!(result, Err(Error::Transport(_))));
  }

  #[tokio::test]
  async fn concurrent_fetches_of_the_same_id_are_not_deduplicated() {
    let transport = MemoryTransport::default();

    transport.item(7, story_json(7, &[]));

    let client = client(&transport);

    let (first, second) =
      tokio::join!(client.fetch_story(7), client.fetch_story(7));

    assert_eq!(first.unwrap().id(), 7);
    assert_eq!(second.unwrap().id(), 7);
    assert_eq!(transport.fetches(&Endpoint::Item(7)), 2);
  }

  #[tokio::test]
  async fn fetch_story_rejects_comments() {
    let transport = MemoryTransport::default();

    transport.item(1, comment_json(1, 100, &[]));

    assert!(matches!(
      client(&transport).fetch_story(1).await,
      Err(Error::Decode(_))
    ));
  }

  #[tokio::test]
  async fn fetch_story_ids_returns_the_whole_list() {
    let transport = MemoryTransport::default();

    transport.stories(StoryListKind::Job, &[9, 8, 7]);

    assert_eq!(
      client(&transport).fetch_story_ids(StoryListKind::Job).await,
      Ok(vec![9, 8, 7])
    );
  }

  #[tokio::test]
  async fn fetch_user_decodes_the_profile() {
    let transport = MemoryTransport::default();

    transport.user(
      "jl",
      json!({
        "about": "This is a test",
        "created": 1_173_923_446,
        "id": "jl",
        "karma": 2937,
      }),
    );

    let client = client(&transport);

    let user = client.fetch_user("jl").await.unwrap();

    assert_eq!(user.id(), "jl");
    assert_eq!(user.karma(), 2937);

    assert_eq!(
      client.fetch_user("nobody").await,
      Err(Error::EmptyResponse)
    );
  }

  #[tokio::test]
  async fn http_client_fetches_stories_end_to_end() {
    use wiremock::{
      Mock, MockServer, ResponseTemplate,
      matchers::{method, path},
    };

    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/v0/topstories.json"))
      .respond_with(ResponseTemplate::new(200).set_body_string("[2, 1, 3]"))
      .mount(&server)
      .await;

    for id in [1, 2] {
      Mock::given(method("GET"))
        .and(path(format!("/v0/item/{id}.json")))
        .respond_with(
          ResponseTemplate::new(200).set_body_json(story_json(id, &[])),
        )
        .mount(&server)
        .await;
    }

    let client = Client::new(Config {
      base_url: Url::parse(&format!("{}/v0/", server.uri())).unwrap(),
      ..Config::default()
    })
    .unwrap();

    let stories = client.fetch_stories(StoryListKind::Top, 2).await;

    assert_eq!(ids(&stories), vec![Ok(2), Ok(1)]);
    assert_eq!(stories[0].as_ref().unwrap().title(), "Story 2");
  }
}
