use super::*;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct User {
  pub(crate) about: Option<String>,
  #[serde(with = "chrono::serde::ts_seconds")]
  pub(crate) created: DateTime<Utc>,
  pub(crate) id: String,
  pub(crate) karma: i64,
}

impl User {
  pub fn about(&self) -> Option<&str> {
    self.about.as_deref()
  }

  pub fn created(&self) -> DateTime<Utc> {
    self.created
  }

  /// The user's handle.
  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn karma(&self) -> i64 {
    self.karma
  }
}
