use {super::*, crate::utils::deserialize_optional_url};

static WWW_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^www[0-9]*\.").expect("www prefix pattern is valid")
});

/// A ranked submission: a link, a text post, a job or a poll.
#[derive(Clone, Debug, Deserialize)]
pub struct Story {
  #[serde(rename = "by")]
  pub(crate) author: String,
  pub(crate) descendants: Option<u64>,
  pub(crate) id: ItemId,
  #[serde(default, rename = "kids")]
  pub(crate) kid_ids: Vec<ItemId>,
  #[serde(rename = "type")]
  pub(crate) kind: ItemKind,
  pub(crate) score: u64,
  pub(crate) text: Option<String>,
  #[serde(with = "chrono::serde::ts_seconds")]
  pub(crate) time: DateTime<Utc>,
  pub(crate) title: String,
  #[serde(default, deserialize_with = "deserialize_optional_url")]
  pub(crate) url: Option<Url>,
}

impl Story {
  const GRAVITY: f64 = 1.8;

  pub fn author(&self) -> &str {
    &self.author
  }

  /// Orders two stories by [`Story::rank`] at the same instant.
  pub fn cmp_rank(&self, other: &Self, now: DateTime<Utc>) -> Ordering {
    self.rank(now).total_cmp(&other.rank(now))
  }

  pub fn descendant_count(&self) -> Option<u64> {
    self.descendants
  }

  /// Direct child comment ids, in server order.
  pub fn kid_ids(&self) -> &[ItemId] {
    &self.kid_ids
  }

  /// Front-page style score that decays with age.
  #[allow(clippy::cast_precision_loss)]
  pub fn rank(&self, now: DateTime<Utc>) -> f64 {
    let base = self.score as f64 - 1.0;

    let adjusted = if base > 0.0 { base.powf(0.8) } else { base };

    let hours = (now - self.time).num_seconds().unsigned_abs() as f64 / 3600.0;

    adjusted / (hours + 2.0).powf(Self::GRAVITY)
  }

  pub fn score(&self) -> u64 {
    self.score
  }

  /// Host of the story link without a leading `www.` label.
  pub fn short_url(&self) -> Option<String> {
    let host = self.url.as_ref()?.host_str()?;

    Some(WWW_PREFIX.replace(host, "").into_owned())
  }

  pub fn text(&self) -> Option<&str> {
    self.text.as_deref()
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn url(&self) -> Option<&Url> {
    self.url.as_ref()
  }
}

impl Item for Story {
  fn accepts(kind: ItemKind) -> bool {
    matches!(kind, ItemKind::Job | ItemKind::Poll | ItemKind::Story)
  }

  fn id(&self) -> ItemId {
    self.id
  }

  fn kind(&self) -> ItemKind {
    self.kind
  }

  fn time(&self) -> DateTime<Utc> {
    self.time
  }
}

impl PartialEq for Story {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for Story {}
