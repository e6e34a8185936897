//! Core data model for Herald.
//!
//! This crate provides the documents shared by every Herald component: guild
//! configuration and its partial patches, the merged effective view handed to
//! notification renderers, engagement statistics with bounded history, and the
//! clock abstraction used to make time-dependent code testable.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
mod defaults;
mod effective;
mod ids;
mod mode;
mod patch;
mod serde_helpers;
mod stats;
mod validate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    CanvasSettings, ChannelOverride, EmbedSettings, FooterSettings, GuildConfig, MessageSection,
    RolesConfig,
};
pub use defaults::{DEFAULT_LEAVE_TEXT, DEFAULT_PREFIX, DEFAULT_WELCOME_TEXT};
pub use effective::{EffectiveConfig, EffectiveSection};
pub use ids::{ChannelId, GuildId, RoleId, UserId};
pub use mode::{MessageMode, SectionKind};
pub use patch::{CanvasPatch, EmbedPatch, FooterPatch, GuildConfigPatch, RolesPatch, SectionPatch};
pub use stats::{
    BoundedHistory, EventKind, GuildStats, GuildStatsBuilder, HISTORY_CAPACITY, HistoryEntry,
    Period, PeriodCounters,
};
pub use validate::{
    MAX_DESCRIPTION_LEN, MAX_FOOTER_LEN, MAX_PREFIX_LEN, MAX_TEXT_LEN, MAX_TITLE_LEN,
    validate_color,
};
