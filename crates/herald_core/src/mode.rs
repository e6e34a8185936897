//! Message presentation modes and section selectors.

use serde::{Deserialize, Serialize};

/// How a notification is presented in a channel.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageMode {
    /// Rich embed
    #[default]
    Embed,
    /// Plain text message
    Text,
}

/// Which notification section of a guild configuration is addressed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SectionKind {
    /// Member joined
    Welcome,
    /// Member left
    Leave,
}
