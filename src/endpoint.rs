use super::*;

/// A logical API request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Endpoint {
  Item(ItemId),
  Stories(StoryListKind),
  User(String),
}

impl Endpoint {
  /// Resource locator of this request below `base`.
  ///
  /// Path segments are appended to `base`, so a base of
  /// `https://hacker-news.firebaseio.com/v0` yields
  /// `https://hacker-news.firebaseio.com/v0/item/8863.json`. User names are
  /// percent-encoded as a single segment.
  pub fn locator(&self, base: &Url) -> Url {
    let mut url = base.clone();

    url.set_query(None);
    url.set_fragment(None);

    if let Ok(mut segments) = url.path_segments_mut() {
      segments.pop_if_empty();

      match self {
        Self::Item(id) => {
          segments.extend(["item", format!("{id}.json").as_str()])
        }
        Self::Stories(kind) => {
          segments.push(&format!("{}.json", kind.endpoint()))
        }
        Self::User(name) => {
          segments.extend(["user", format!("{name}.json").as_str()])
        }
      };
    }

    url
  }
}

impl Display for Endpoint {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Self::Item(id) => write!(f, "item/{id}"),
      Self::Stories(kind) => f.write_str(kind.endpoint()),
      Self::User(name) => write!(f, "user/{name}"),
    }
  }
}
