use super::*;

/// Fetches every key concurrently and returns the outcomes in key order.
///
/// One task per key is spawned on the current tokio runtime, so the call
/// must happen inside one. Tasks only report `(index, outcome)` pairs; the
/// drain loop below is the single writer of the result slots. A failing or
/// panicking fetch fills its own slot and never disturbs its siblings.
/// Dropping the returned future aborts every task that is still running.
pub async fn aggregate<K, V, F, Fut>(
  keys: Vec<K>,
  fetch_one: F,
) -> Vec<FetchResult<V>>
where
  F: Fn(K) -> Fut,
  Fut: Future<Output = FetchResult<V>> + Send + 'static,
  V: Send + 'static,
{
  if keys.is_empty() {
    return Vec::new();
  }

  let mut slots = Vec::with_capacity(keys.len());
  slots.resize_with(keys.len(), || None);

  let mut tasks = JoinSet::new();

  for (index, key) in keys.into_iter().enumerate() {
    let fetch = AssertUnwindSafe(fetch_one(key)).catch_unwind();

    tasks.spawn(async move {
      let outcome = fetch.await.unwrap_or_else(|_| {
        warn!(index, "fetch task panicked");
        Err(Error::Unknown)
      });

      (index, outcome)
    });
  }

  while let Some(joined) = tasks.join_next().await {
    match joined {
      Ok((index, outcome)) => slots[index] = Some(outcome),
      Err(error) => warn!(%error, "fetch task did not complete"),
    }
  }

  slots
    .into_iter()
    .map(|slot| slot.unwrap_or(Err(Error::Unknown)))
    .collect()
}
