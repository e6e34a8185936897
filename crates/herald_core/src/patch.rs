//! Partial configuration layers.
//!
//! Every field is optional; a layer overwrites only what it defines. Nullable
//! fields use `Option<Option<_>>` so a patch can distinguish "leave alone"
//! (absent) from "clear" (`null`).

use crate::serde_helpers::double_option;
use crate::{ChannelOverride, MessageMode, MessageSection, RoleId, RolesConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Partial [`FooterSettings`](crate::FooterSettings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterPatch {
    /// Footer template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Icon URL, `null` clears
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub icon: Option<Option<String>>,
}

/// Partial [`CanvasSettings`](crate::CanvasSettings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasPatch {
    /// Gradient start color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_start: Option<String>,
    /// Gradient end color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_end: Option<String>,
    /// Background color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Text color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

/// Partial [`EmbedSettings`](crate::EmbedSettings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedPatch {
    /// Accent color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Title template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Timestamp toggle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_timestamp: Option<bool>,
    /// Thumbnail source, `null` clears
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub thumbnail: Option<Option<String>>,
    /// Image URL, `null` clears
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub image: Option<Option<String>>,
    /// Footer fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<FooterPatch>,
    /// Card colors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasPatch>,
}

impl EmbedPatch {
    /// Patch setting only the color.
    pub fn color(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Self::default()
        }
    }

    /// Patch setting only the title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Every color this patch would write.
    pub fn colors(&self) -> Vec<&str> {
        let mut colors: Vec<&str> = self.color.iter().map(String::as_str).collect();
        if let Some(canvas) = &self.canvas {
            colors.extend(
                [
                    &canvas.gradient_start,
                    &canvas.gradient_end,
                    &canvas.background_color,
                    &canvas.text_color,
                ]
                .into_iter()
                .flatten()
                .map(String::as_str),
            );
        }
        colors
    }
}

/// Partial [`MessageSection`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPatch {
    /// Enable toggle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Default mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<MessageMode>,
    /// Full replacement of the channel list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<ChannelOverride>>,
    /// Embed fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<EmbedPatch>,
    /// Text template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SectionPatch {
    /// Deep-merge into a section.
    pub fn apply_to(&self, section: &mut MessageSection) {
        if let Some(enabled) = self.enabled {
            section.enabled = enabled;
        }
        if let Some(mode) = self.default_mode {
            section.default_mode = mode;
        }
        if let Some(channels) = &self.channels {
            section.channels = channels.clone();
        }
        if let Some(embed) = &self.embed {
            section.embed.apply(embed);
        }
        if let Some(text) = &self.text {
            section.text = text.clone();
        }
    }
}

/// Partial [`RolesConfig`](crate::RolesConfig). Sets replace wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolesPatch {
    /// Enable toggle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Roles granted on join
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_assign: Option<BTreeSet<RoleId>>,
    /// Self-assignable roles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_assignable: Option<BTreeSet<RoleId>>,
}

impl RolesPatch {
    /// Overwrite the role settings the patch defines.
    pub fn apply_to(&self, roles: &mut RolesConfig) {
        if let Some(enabled) = self.enabled {
            roles.enabled = enabled;
        }
        if let Some(auto) = &self.auto_assign {
            roles.auto_assign = auto.clone();
        }
        if let Some(selfs) = &self.self_assignable {
            roles.self_assignable = selfs.clone();
        }
    }
}

/// Partial [`GuildConfig`](crate::GuildConfig).
///
/// # Examples
///
/// ```
/// use herald_core::{EmbedPatch, GuildConfig, GuildConfigPatch, SectionKind};
///
/// let patch = GuildConfigPatch::default()
///     .with_section(SectionKind::Welcome, |s| s.embed = Some(EmbedPatch::color("#123456")));
/// let config = GuildConfig::default().merged(&patch);
/// assert_eq!(config.welcome.embed.color, "#123456");
/// assert_eq!(config.leave, GuildConfig::default().leave);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildConfigPatch {
    /// Command prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Welcome section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome: Option<SectionPatch>,
    /// Leave section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave: Option<SectionPatch>,
    /// Role automation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<RolesPatch>,
}

impl GuildConfigPatch {
    /// Patch setting only the prefix.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    /// Section patch addressed by `kind`.
    pub fn section(&self, kind: crate::SectionKind) -> Option<&SectionPatch> {
        match kind {
            crate::SectionKind::Welcome => self.welcome.as_ref(),
            crate::SectionKind::Leave => self.leave.as_ref(),
        }
    }

    /// Edit the section patch addressed by `kind`, creating it if absent.
    pub fn with_section(
        mut self,
        kind: crate::SectionKind,
        edit: impl FnOnce(&mut SectionPatch),
    ) -> Self {
        let slot = match kind {
            crate::SectionKind::Welcome => &mut self.welcome,
            crate::SectionKind::Leave => &mut self.leave,
        };
        edit(slot.get_or_insert_with(SectionPatch::default));
        self
    }

    /// Whether the patch defines nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
