//! Stored guild configuration documents.

use crate::{ChannelId, EmbedPatch, GuildConfigPatch, MessageMode, RoleId, SectionKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Footer line of a notification embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterSettings {
    /// Footer template
    pub text: String,
    /// Optional icon URL
    pub icon: Option<String>,
}

/// Colors of the generated welcome/leave card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSettings {
    /// Gradient start color (`#RRGGBB`)
    pub gradient_start: String,
    /// Gradient end color (`#RRGGBB`)
    pub gradient_end: String,
    /// Card background color (`#RRGGBB`)
    pub background_color: String,
    /// Text color (`#RRGGBB`)
    pub text_color: String,
}

/// Embed presentation of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedSettings {
    /// Accent color (`#RRGGBB`)
    pub color: String,
    /// Title template
    pub title: String,
    /// Description template
    pub description: String,
    /// Whether the embed carries a timestamp
    pub show_timestamp: bool,
    /// Thumbnail source: `user`, `server`, or a URL
    pub thumbnail: Option<String>,
    /// Image URL
    pub image: Option<String>,
    /// Footer line
    pub footer: FooterSettings,
    /// Generated card colors
    pub canvas: CanvasSettings,
}

impl EmbedSettings {
    /// Overwrite the fields the patch defines.
    pub fn apply(&mut self, patch: &EmbedPatch) {
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(show) = patch.show_timestamp {
            self.show_timestamp = show;
        }
        if let Some(thumbnail) = &patch.thumbnail {
            self.thumbnail = thumbnail.clone();
        }
        if let Some(image) = &patch.image {
            self.image = image.clone();
        }
        if let Some(footer) = &patch.footer {
            if let Some(text) = &footer.text {
                self.footer.text = text.clone();
            }
            if let Some(icon) = &footer.icon {
                self.footer.icon = icon.clone();
            }
        }
        if let Some(canvas) = &patch.canvas {
            if let Some(c) = &canvas.gradient_start {
                self.canvas.gradient_start = c.clone();
            }
            if let Some(c) = &canvas.gradient_end {
                self.canvas.gradient_end = c.clone();
            }
            if let Some(c) = &canvas.background_color {
                self.canvas.background_color = c.clone();
            }
            if let Some(c) = &canvas.text_color {
                self.canvas.text_color = c.clone();
            }
        }
    }
}

/// Per-channel override of a notification section.
///
/// Fields left unset inherit from the section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOverride {
    /// Channel the override applies to
    pub channel_id: ChannelId,
    /// Presentation mode for this channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<MessageMode>,
    /// Embed fields overridden for this channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<EmbedPatch>,
    /// Text template for this channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ChannelOverride {
    /// Override that only registers the channel.
    pub fn new(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            mode: None,
            embed: None,
            text: None,
        }
    }

    /// Set the presentation mode.
    pub fn with_mode(mut self, mode: MessageMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the embed overrides.
    pub fn with_embed(mut self, embed: EmbedPatch) -> Self {
        self.embed = Some(embed);
        self
    }

    /// Set the text template.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// One notification section (welcome or leave).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSection {
    /// Whether notifications of this kind are sent
    pub enabled: bool,
    /// Mode used by channels without their own
    pub default_mode: MessageMode,
    /// Target channels in configuration order, unique by id
    pub channels: Vec<ChannelOverride>,
    /// Embed presentation
    pub embed: EmbedSettings,
    /// Text template
    pub text: String,
}

impl MessageSection {
    /// Override registered for the channel, if any.
    pub fn channel(&self, channel_id: ChannelId) -> Option<&ChannelOverride> {
        self.channels.iter().find(|c| c.channel_id == channel_id)
    }

    /// Insert or replace the override for its channel, keeping list order.
    pub fn upsert_channel(&mut self, entry: ChannelOverride) {
        match self
            .channels
            .iter_mut()
            .find(|c| c.channel_id == entry.channel_id)
        {
            Some(existing) => *existing = entry,
            None => self.channels.push(entry),
        }
    }

    /// Remove the override for the channel. Returns whether one existed.
    pub fn remove_channel(&mut self, channel_id: ChannelId) -> bool {
        let before = self.channels.len();
        self.channels.retain(|c| c.channel_id != channel_id);
        self.channels.len() != before
    }
}

/// Role automation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolesConfig {
    /// Whether role automation is active
    pub enabled: bool,
    /// Roles granted on join
    pub auto_assign: BTreeSet<RoleId>,
    /// Roles members may grant themselves
    pub self_assignable: BTreeSet<RoleId>,
}

/// Complete configuration of one guild.
///
/// Every field is always present. Stored documents missing fields are read
/// through [`GuildConfig::from_document`], which layers them over the
/// built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildConfig {
    /// Command prefix
    pub prefix: String,
    /// Member-joined notifications
    pub welcome: MessageSection,
    /// Member-left notifications
    pub leave: MessageSection,
    /// Role automation
    pub roles: RolesConfig,
}

impl GuildConfig {
    /// Section addressed by `kind`.
    pub fn section(&self, kind: SectionKind) -> &MessageSection {
        match kind {
            SectionKind::Welcome => &self.welcome,
            SectionKind::Leave => &self.leave,
        }
    }

    /// Mutable section addressed by `kind`.
    pub fn section_mut(&mut self, kind: SectionKind) -> &mut MessageSection {
        match kind {
            SectionKind::Welcome => &mut self.welcome,
            SectionKind::Leave => &mut self.leave,
        }
    }

    /// Deep-merge a patch: only keys the patch defines are overwritten.
    pub fn apply(&mut self, patch: &GuildConfigPatch) {
        if let Some(prefix) = &patch.prefix {
            self.prefix = prefix.clone();
        }
        if let Some(section) = &patch.welcome {
            section.apply_to(&mut self.welcome);
        }
        if let Some(section) = &patch.leave {
            section.apply_to(&mut self.leave);
        }
        if let Some(roles) = &patch.roles {
            roles.apply_to(&mut self.roles);
        }
    }

    /// Consume the config, returning it with the patch applied.
    pub fn merged(mut self, patch: &GuildConfigPatch) -> Self {
        self.apply(patch);
        self
    }

    /// Read a stored JSON document, filling absent keys from the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not have the configuration shape.
    pub fn from_document(document: serde_json::Value) -> Result<Self, serde_json::Error> {
        let patch: GuildConfigPatch = serde_json::from_value(document)?;
        Ok(Self::default().merged(&patch))
    }
}
