//! Herald: guild configuration, engagement statistics and command rate
//! limiting for community Discord bots.
//!
//! This crate wires the component crates together:
//!
//! - [`HeraldSettings`] loads layered settings (bundled defaults, user files,
//!   environment).
//! - [`Herald`] builds the resolver, statistics aggregator, rate limiter and
//!   rollover scheduler from those settings and manages their lifecycle.
//! - [`EventDispatcher`] is the entry point for member join/leave events and
//!   user commands.
//! - [`init_tracing`] installs structured logging.
//!
//! # Example
//!
//! ```no_run
//! use herald::{Herald, HeraldSettings, ObservabilityConfig, init_tracing};
//! use herald_core::{GuildId, UserId};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! init_tracing(ObservabilityConfig::new("herald"))?;
//! let herald = Herald::build(HeraldSettings::load()?).await?;
//! herald.start().await;
//!
//! let dispatcher = herald.dispatcher();
//! let notice = dispatcher.handle_member_join(GuildId(1), UserId(2)).await;
//! for delivery in &notice.deliveries {
//!     println!("{:?} -> {}", delivery.channel_id, delivery.embed.title);
//! }
//!
//! herald.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod dispatcher;
mod observability;
mod runtime;
mod settings;

pub use dispatcher::{CommandGate, EventDispatcher, MemberNotice};
pub use observability::{ObservabilityConfig, init_tracing};
pub use runtime::{Herald, RATE_LIMIT_PURGE_JOB};
pub use settings::{HeraldSettings, PersistenceSettings, RateLimitSettings, StatsSettings};

pub use herald_core as core;
pub use herald_error as error;
