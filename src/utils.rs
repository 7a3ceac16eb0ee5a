use super::*;

pub(crate) fn deserialize_optional_url<'de, D>(
  deserializer: D,
) -> Result<Option<Url>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<String>::deserialize(deserializer)?;

  Ok(
    value
      .as_deref()
      .map(str::trim)
      .filter(|raw| !raw.is_empty())
      .and_then(parse_item_url),
  )
}

/// Abbreviates karma past a thousand, e.g. `1.2K` or `3.4M`. Rounding
/// happens before the unit is picked, so 999,950 reads `1.0M`.
pub fn format_karma(karma: i64) -> String {
  if karma.abs() < 1000 {
    return karma.to_string();
  }

  #[allow(clippy::cast_precision_loss)]
  let karma = karma as f64;

  let thousands = (karma / 100.0).round() / 10.0;

  if thousands.abs() < 1000.0 {
    return format!("{thousands:.1}K");
  }

  format!("{:.1}M", (karma / 100_000.0).round() / 10.0)
}

pub fn format_points(score: u64) -> String {
  match score {
    1 => "1 point".to_string(),
    _ => format!("{score} points"),
  }
}

/// The WHATWG parser already percent-encodes spaces and non-ASCII characters,
/// so whatever it still rejects (bad hosts, missing schemes) is dropped.
pub(crate) fn parse_item_url(raw: &str) -> Option<Url> {
  Url::parse(raw)
    .inspect_err(|error| {
      debug!(url = raw, %error, "dropping unparseable url");
    })
    .ok()
}

/// Strips markup tags from item text, decodes entities and collapses
/// whitespace.
pub fn plain_text(text: &str) -> String {
  let mut cleaned = String::with_capacity(text.len());
  let mut inside_tag = false;
  let mut last_was_space = false;

  for ch in text.chars() {
    match ch {
      '<' => {
        inside_tag = true;

        if !last_was_space {
          cleaned.push(' ');
          last_was_space = true;
        }
      }
      '>' => {
        inside_tag = false;
      }
      _ if inside_tag => {}
      _ if ch.is_whitespace() => {
        if !last_was_space {
          cleaned.push(' ');
          last_was_space = true;
        }
      }
      _ => {
        cleaned.push(ch);
        last_was_space = false;
      }
    }
  }

  let decoded = html_escape::decode_html_entities(cleaned.trim());

  decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  if text.is_empty() {
    return Vec::new();
  }

  let mut lines = Vec::new();
  let mut current = String::new();
  let mut current_width = 0;

  for word in text.split_whitespace() {
    let word_width = word.chars().count();

    if current.is_empty() {
      current.push_str(word);
      current_width = word_width;
    } else if current_width + 1 + word_width <= width {
      current.push(' ');
      current.push_str(word);
      current_width += 1 + word_width;
    } else {
      lines.push(current);
      current = word.to_string();
      current_width = word_width;
    }
  }

  if !current.is_empty() {
    lines.push(current);
  }

  if lines.is_empty() {
    vec![text.to_string()]
  } else {
    lines
  }
}
