use super::*;

/// Decodes one JSON payload.
///
/// An empty body and the literal `null` (what the service answers for ids it
/// does not know) are [`Error::EmptyResponse`]; anything unparseable or
/// missing a required field is [`Error::Decode`].
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> FetchResult<T> {
  let payload = payload.trim_ascii();

  if payload.is_empty() || payload == b"null" {
    return Err(Error::EmptyResponse);
  }

  Ok(serde_json::from_slice(payload)?)
}

/// Decodes an item payload and checks that its `type` is one `T` accepts.
pub fn decode_item<T: Item>(payload: &[u8]) -> FetchResult<T> {
  let item = decode::<T>(payload)?;

  if T::accepts(item.kind()) {
    Ok(item)
  } else {
    Err(Error::Decode(format!(
      "item {} has unexpected type `{}`",
      item.id(),
      item.kind()
    )))
  }
}
