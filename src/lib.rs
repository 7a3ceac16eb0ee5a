//! Concurrent client for the Hacker News item API.
//!
//! [`Client`] resolves ranked story lists, fans out one fetch per item and
//! materializes whole comment trees, always returning results in the order of
//! the ids that produced them. Individual failures stay in their own slot;
//! a batch that outlives its deadline resolves to a single
//! [`Error::RequestTimedOut`] entry.

pub use {
  aggregate::aggregate,
  client::Client,
  comment::Comment,
  config::{Config, ConfigError},
  decode::{decode, decode_item},
  endpoint::Endpoint,
  error::{Error, FetchResult},
  http_transport::HttpTransport,
  item::{Item, ItemId, ItemKind},
  memory_transport::MemoryTransport,
  story::Story,
  story_list_kind::StoryListKind,
  transport::Transport,
  user::User,
  utils::{format_karma, format_points, plain_text, wrap_text},
  web_page::WebPage,
};

use {
  async_trait::async_trait,
  chrono::{DateTime, Utc},
  futures::{FutureExt, future::BoxFuture},
  regex::Regex,
  serde::{Deserialize, Deserializer, de::DeserializeOwned},
  serde_json::Value,
  std::{
    cmp::Ordering,
    collections::HashMap,
    env,
    fmt::{self, Display, Formatter},
    future::Future,
    panic::AssertUnwindSafe,
    str::FromStr,
    sync::{Arc, LazyLock, Mutex},
    time::Duration,
  },
  supervisor::supervise,
  tokio::{
    sync::Semaphore,
    task::JoinSet,
    time::{self, Instant},
  },
  tokio_util::sync::CancellationToken,
  tracing::{debug, trace, warn},
  url::Url,
};

mod aggregate;
mod client;
mod comment;
mod config;
mod decode;
mod endpoint;
mod error;
mod http_transport;
mod item;
mod memory_transport;
mod story;
mod story_list_kind;
mod supervisor;
mod transport;
mod user;
mod utils;
mod web_page;

type Result<T = (), E = Error> = std::result::Result<T, E>;
