use super::*;

/// A page on the Hacker News website.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WebPage {
  Item(ItemId),
  User(String),
}

impl WebPage {
  const BASE_URL: &str = "https://news.ycombinator.com";

  pub fn url(&self) -> String {
    match self {
      Self::Item(id) => format!("{}/item?id={id}", Self::BASE_URL),
      Self::User(name) => {
        format!("{}/user?id={}", Self::BASE_URL, urlencoding::encode(name))
      }
    }
  }
}

impl From<&Comment> for WebPage {
  fn from(comment: &Comment) -> Self {
    Self::Item(comment.id)
  }
}

impl From<&Story> for WebPage {
  fn from(story: &Story) -> Self {
    Self::Item(story.id)
  }
}

impl From<&User> for WebPage {
  fn from(user: &User) -> Self {
    Self::User(user.id.clone())
  }
}
