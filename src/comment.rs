use super::*;

/// A reply in a discussion thread, optionally carrying its materialized
/// subtree.
#[derive(Clone, Debug, Deserialize)]
pub struct Comment {
  #[serde(rename = "by")]
  pub(crate) author: Option<String>,
  #[serde(default)]
  pub(crate) dead: bool,
  #[serde(default)]
  pub(crate) deleted: bool,
  pub(crate) id: ItemId,
  #[serde(default, rename = "kids")]
  pub(crate) kid_ids: Vec<ItemId>,
  #[serde(skip)]
  pub(crate) kids: Vec<Comment>,
  #[serde(rename = "type")]
  pub(crate) kind: ItemKind,
  pub(crate) parent: ItemId,
  pub(crate) text: Option<String>,
  #[serde(with = "chrono::serde::ts_seconds")]
  pub(crate) time: DateTime<Utc>,
}

impl Comment {
  pub(crate) fn attach_kids(&mut self, kids: Vec<Comment>) {
    debug_assert!(self.kids.is_empty(), "replies are attached once");
    debug_assert!(kids.len() <= self.kid_ids.len());

    self.kids = kids;
  }

  pub fn author(&self) -> Option<&str> {
    self.author.as_deref()
  }

  /// Number of comments in the materialized subtree, excluding `self`.
  pub fn descendant_count(&self) -> usize {
    self
      .kids
      .iter()
      .map(|kid| 1 + kid.descendant_count())
      .sum()
  }

  /// Whether fewer replies were materialized than the server declared.
  pub fn has_missing_replies(&self) -> bool {
    self.kids.len() < self.kid_ids.len()
  }

  pub fn is_dead(&self) -> bool {
    self.dead
  }

  pub fn is_deleted(&self) -> bool {
    self.deleted
  }

  /// Direct reply ids, in server order.
  pub fn kid_ids(&self) -> &[ItemId] {
    &self.kid_ids
  }

  /// Materialized direct replies that loaded successfully, in server order.
  pub fn kids(&self) -> &[Comment] {
    &self.kids
  }

  pub fn parent(&self) -> ItemId {
    self.parent
  }

  pub fn text(&self) -> Option<&str> {
    self.text.as_deref()
  }
}

impl Item for Comment {
  fn accepts(kind: ItemKind) -> bool {
    kind == ItemKind::Comment
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

impl PartialEq for Comment {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for Comment {}
