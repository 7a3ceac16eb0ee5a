use super::*;

/// One of the server's pre-ranked story lists.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StoryListKind {
  Ask,
  Best,
  Job,
  New,
  Show,
  Top,
}

impl StoryListKind {
  pub const ALL: [StoryListKind; 6] = [
    Self::Top,
    Self::Best,
    Self::New,
    Self::Ask,
    Self::Show,
    Self::Job,
  ];

  /// Name of the list resource, e.g. `topstories`.
  pub fn endpoint(self) -> &'static str {
    match self {
      Self::Ask => "askstories",
      Self::Best => "beststories",
      Self::Job => "jobstories",
      Self::New => "newstories",
      Self::Show => "showstories",
      Self::Top => "topstories",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Ask => "ask",
      Self::Best => "best",
      Self::Job => "job",
      Self::New => "new",
      Self::Show => "show",
      Self::Top => "top",
    }
  }
}

impl Display for StoryListKind {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for StoryListKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let label = s.trim().to_ascii_lowercase();

    let label = label.strip_suffix("stories").unwrap_or(&label);

    Self::ALL
      .into_iter()
      .find(|kind| {
        kind.label() == label || (label == "jobs" && *kind == Self::Job)
      })
      .ok_or_else(|| {
        format!(
          "unknown story list `{s}`, expected one of: {}",
          Self::ALL.map(Self::label).join(", ")
        )
      })
  }
}
