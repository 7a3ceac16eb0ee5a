use super::*;

/// Server-assigned item identifier.
pub type ItemId = u64;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
  Comment,
  Job,
  Poll,
  Pollopt,
  Story,
}

impl ItemKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Comment => "comment",
      Self::Job => "job",
      Self::Poll => "poll",
      Self::Pollopt => "pollopt",
      Self::Story => "story",
    }
  }
}

impl Display for ItemKind {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Shared contract of every record decoded from an `item/{id}` resource.
pub trait Item: DeserializeOwned + Send + 'static {
  /// Whether a payload of this `kind` may be decoded as `Self`.
  fn accepts(kind: ItemKind) -> bool;

  fn id(&self) -> ItemId;

  fn kind(&self) -> ItemKind;

  fn time(&self) -> DateTime<Utc>;
}
