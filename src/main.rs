use {
  anyhow::{Context, anyhow},
  clap::{Parser, Subcommand},
  crossterm::style::Stylize,
  hn_client::{
    Client, Comment, Config, FetchResult, ItemId, Story, StoryListKind, User,
    WebPage, format_karma, format_points, plain_text, wrap_text,
  },
  std::{
    backtrace::BacktraceStatus,
    io::{self, IsTerminal},
    process,
    time::Duration,
  },
  tracing_subscriber::EnvFilter,
  url::Url,
};

const INDENT: &str = "  ";

const LOG_ENV: &str = "HN_LOG";

const TEXT_WIDTH: usize = 100;

type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;

#[derive(Parser)]
#[command(
  name = "hn",
  version,
  about = "Fetch stories, comment threads and users from Hacker News"
)]
struct Arguments {
  #[arg(long, value_parser = Config::parse_base_url)]
  base_url: Option<Url>,
  #[command(subcommand)]
  command: Command,
  /// Maximum number of simultaneous requests
  #[arg(long)]
  concurrency: Option<usize>,
  /// Deadline for a whole command, in milliseconds
  #[arg(long)]
  timeout_ms: Option<u64>,
}

impl Arguments {
  /// Layers the command line flags over `config`.
  fn apply(&self, mut config: Config) -> Result<Config> {
    if let Some(base_url) = &self.base_url {
      config.base_url = base_url.clone();
    }

    if let Some(concurrency) = self.concurrency {
      config.max_concurrent_requests = concurrency;
    }

    if let Some(timeout_ms) = self.timeout_ms {
      config.request_timeout = Duration::from_millis(timeout_ms);
    }

    config.validate().context("invalid configuration")?;

    Ok(config)
  }

  fn config(&self) -> Result<Config> {
    self.apply(Config::from_env().context("invalid configuration")?)
  }
}

#[derive(Subcommand)]
enum Command {
  /// Print the comment tree of a story
  Comments { story: ItemId },
  /// Print the stories of a ranked list
  Stories {
    #[arg(default_value = "top")]
    kind: StoryListKind,
    #[arg(long, short, default_value_t = 30)]
    count: usize,
  },
  /// Print a user's profile
  User { name: String },
}

fn initialize_tracing() {
  let filter = EnvFilter::try_from_env(LOG_ENV)
    .unwrap_or_else(|_| EnvFilter::new("warn"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

fn print_comment(comment: &Comment, depth: usize) {
  let indent = INDENT.repeat(depth);

  let author = if comment.is_deleted() {
    "[deleted]"
  } else if comment.is_dead() {
    "[dead]"
  } else {
    comment.author().unwrap_or("unknown")
  };

  println!(
    "{indent}{} {}",
    author.bold(),
    WebPage::from(comment).url().dark_grey()
  );

  if let Some(text) = comment.text() {
    let width = TEXT_WIDTH.saturating_sub(indent.len()).max(20);

    for line in wrap_text(&plain_text(text), width) {
      println!("{indent}{line}");
    }
  }

  if comment.has_missing_replies() {
    println!("{indent}{}", "(some replies failed to load)".dark_grey());
  }

  println!();

  for kid in comment.kids() {
    print_comment(kid, depth + 1);
  }
}

fn print_failure(prefix: &str, error: &hn_client::Error) {
  eprintln!("{prefix}{} {error}", "error:".bold().red());
}

fn print_story(rank: usize, story: &Story) {
  let host = story
    .short_url()
    .map(|host| format!(" ({host})"))
    .unwrap_or_default();

  println!("{rank:>3}. {}{}", story.title().bold(), host.dark_grey());

  let comments = story
    .descendant_count()
    .map(|count| format!(" | {count} comments"))
    .unwrap_or_default();

  println!(
    "     {} by {}{comments} | {}",
    format_points(story.score()),
    story.author(),
    WebPage::from(story).url()
  );
}

fn print_user(user: &User) {
  println!("{}", user.id().bold());
  println!("karma:   {}", format_karma(user.karma()));
  println!("created: {}", user.created().format("%Y-%m-%d"));
  println!("profile: {}", WebPage::from(user).url());

  if let Some(about) = user.about() {
    println!();

    for line in wrap_text(&plain_text(about), TEXT_WIDTH) {
      println!("{line}");
    }
  }
}

/// Fails when not a single entry of a batch loaded.
fn require_any<T>(results: &[FetchResult<T>], what: &str) -> Result {
  if results.iter().any(|result| result.is_ok()) {
    return Ok(());
  }

  match results.first() {
    Some(Err(error)) => {
      Err(anyhow!(error.clone()).context(format!("failed to load {what}")))
    }
    _ => Ok(()),
  }
}

async fn run() -> Result {
  let arguments = Arguments::parse();

  initialize_tracing();

  let client =
    Client::new(arguments.config()?).context("could not create client")?;

  match arguments.command {
    Command::Comments { story } => {
      let story = client
        .fetch_story(story)
        .await
        .with_context(|| format!("failed to load story {story}"))?;

      println!("{}", story.title().bold());
      println!("{}", WebPage::from(&story).url().dark_grey());
      println!();

      let comments = client.fetch_comments(&story).await;

      require_any(&comments, "comments")?;

      for comment in &comments {
        match comment {
          Ok(comment) => print_comment(comment, 0),
          Err(error) => print_failure("", error),
        }
      }
    }
    Command::Stories { kind, count } => {
      let stories = client.fetch_stories(kind, count).await;

      require_any(&stories, &format!("{kind} stories"))?;

      for (index, story) in stories.iter().enumerate() {
        match story {
          Ok(story) => print_story(index + 1, story),
          Err(error) => print_failure(&format!("{:>3}. ", index + 1), error),
        }
      }
    }
    Command::User { name } => {
      let user = client
        .fetch_user(&name)
        .await
        .with_context(|| format!("failed to load user {name}"))?;

      print_user(&user);
    }
  }

  Ok(())
}

#[tokio::main]
async fn main() {
  if let Err(error) = run().await {
    let use_color = io::stderr().is_terminal();

    if use_color {
      eprintln!("{} {error}", "error:".bold().red());
    } else {
      eprintln!("error: {error}");
    }

    for (i, error) in error.chain().skip(1).enumerate() {
      if i == 0 {
        eprintln!();

        if use_color {
          eprintln!("{}", "because:".bold().red());
        } else {
          eprintln!("because:");
        }
      }

      if use_color {
        eprintln!("{} {error}", "-".bold().red());
      } else {
        eprintln!("- {error}");
      }
    }

    let backtrace = error.backtrace();

    if backtrace.status() == BacktraceStatus::Captured {
      if use_color {
        eprintln!("{}", "backtrace:".bold().red());
      } else {
        eprintln!("backtrace:");
      }

      eprintln!("{backtrace}");
    }

    process::exit(1);
  }
}
