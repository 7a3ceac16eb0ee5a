use super::*;

/// Runs one top-level batch under a single deadline.
///
/// Resolves exactly once: with the batch output, or with
/// [`Error::RequestTimedOut`] if `deadline` passes first, or with
/// [`Error::Cancelled`] if `token` is cancelled first. A batch that finishes
/// at the deadline itself counts as timed out. On timeout the token
/// is cancelled, and the batch future is dropped in both cases, so no work
/// done on its behalf outlives the call and no late result can surface.
pub(crate) async fn supervise<T>(
  deadline: Instant,
  token: &CancellationToken,
  batch: impl Future<Output = T>,
) -> FetchResult<T> {
  tokio::select! {
    biased;
    () = time::sleep_until(deadline) => {
      warn!("batch deadline elapsed, cancelling outstanding fetches");
      token.cancel();
      Err(Error::RequestTimedOut)
    }
    () = token.cancelled() => Err(Error::Cancelled),
    output = batch => Ok(output),
  }
}
