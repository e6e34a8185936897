//! Fully merged configuration handed to notification renderers.

use crate::{ChannelId, EmbedSettings, GuildId, MessageMode, RolesConfig, SectionKind};
use serde::{Deserialize, Serialize};

/// One section after every layer has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSection {
    /// Whether notifications of this kind are sent
    pub enabled: bool,
    /// Resolved presentation mode
    pub mode: MessageMode,
    /// Channel whose override was applied, if any
    pub channel_id: Option<ChannelId>,
    /// Every channel configured for this section, in order
    pub channels: Vec<ChannelId>,
    /// Resolved embed
    pub embed: EmbedSettings,
    /// Resolved text template
    pub text: String,
}

/// Configuration of one guild after defaults, stored document, channel
/// override and inline override have been layered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    /// Guild the configuration belongs to
    pub guild_id: GuildId,
    /// Command prefix
    pub prefix: String,
    /// Member-joined notifications
    pub welcome: EffectiveSection,
    /// Member-left notifications
    pub leave: EffectiveSection,
    /// Role automation
    pub roles: RolesConfig,
}

impl EffectiveConfig {
    /// Section addressed by `kind`.
    pub fn section(&self, kind: SectionKind) -> &EffectiveSection {
        match kind {
            SectionKind::Welcome => &self.welcome,
            SectionKind::Leave => &self.leave,
        }
    }
}
