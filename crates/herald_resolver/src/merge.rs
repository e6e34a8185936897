//! Layering of channel and inline overrides over a guild configuration.

use herald_core::{
    ChannelId, EffectiveConfig, EffectiveSection, GuildConfig, GuildConfigPatch, GuildId,
    MessageSection, SectionKind, SectionPatch,
};

/// Merge a stored configuration with the overrides that apply to one event.
///
/// Layers, lowest to highest: `config` (already defaulted), the channel
/// override of `channel_id` in each section, then `inline`. An inline
/// channel list replaces the stored one before the channel lookup.
///
/// # Examples
///
/// ```
/// use herald_core::{ChannelId, ChannelOverride, GuildConfig, GuildId, MessageMode};
/// use herald_resolver::effective_config;
///
/// let mut config = GuildConfig::default();
/// config
///     .welcome
///     .upsert_channel(ChannelOverride::new(ChannelId(7)).with_mode(MessageMode::Text));
///
/// let effective = effective_config(GuildId(1), &config, Some(ChannelId(7)), None);
/// assert_eq!(effective.welcome.mode, MessageMode::Text);
/// assert_eq!(effective.leave.mode, MessageMode::Embed);
/// ```
pub fn effective_config(
    guild_id: GuildId,
    config: &GuildConfig,
    channel_id: Option<ChannelId>,
    inline: Option<&GuildConfigPatch>,
) -> EffectiveConfig {
    let section = |kind| {
        effective_section(
            config.section(kind),
            channel_id,
            inline.and_then(|patch| patch.section(kind)),
        )
    };

    let mut roles = config.roles.clone();
    if let Some(patch) = inline.and_then(|patch| patch.roles.as_ref()) {
        patch.apply_to(&mut roles);
    }

    EffectiveConfig {
        guild_id,
        prefix: inline
            .and_then(|patch| patch.prefix.clone())
            .unwrap_or_else(|| config.prefix.clone()),
        welcome: section(SectionKind::Welcome),
        leave: section(SectionKind::Leave),
        roles,
    }
}

fn effective_section(
    section: &MessageSection,
    channel_id: Option<ChannelId>,
    inline: Option<&SectionPatch>,
) -> EffectiveSection {
    let channels = inline
        .and_then(|patch| patch.channels.as_ref())
        .unwrap_or(&section.channels);
    let channel = channel_id.and_then(|id| channels.iter().find(|c| c.channel_id == id));

    let mut enabled = section.enabled;
    let mut mode = section.default_mode;
    let mut embed = section.embed.clone();
    let mut text = section.text.clone();

    if let Some(channel) = channel {
        if let Some(channel_mode) = channel.mode {
            mode = channel_mode;
        }
        if let Some(patch) = &channel.embed {
            embed.apply(patch);
        }
        if let Some(channel_text) = &channel.text {
            text = channel_text.clone();
        }
    }

    if let Some(patch) = inline {
        if let Some(inline_enabled) = patch.enabled {
            enabled = inline_enabled;
        }
        if let Some(inline_mode) = patch.default_mode {
            mode = inline_mode;
        }
        if let Some(embed_patch) = &patch.embed {
            embed.apply(embed_patch);
        }
        if let Some(inline_text) = &patch.text {
            text = inline_text.clone();
        }
    }

    EffectiveSection {
        enabled,
        mode,
        channel_id: channel.map(|c| c.channel_id),
        channels: channels.iter().map(|c| c.channel_id).collect(),
        embed,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::{ChannelOverride, EmbedPatch, MessageMode};

    #[test]
    fn unknown_channel_uses_section_defaults() {
        let config = GuildConfig::default();
        let effective = effective_config(GuildId(1), &config, Some(ChannelId(99)), None);
        assert_eq!(effective.welcome.channel_id, None);
        assert_eq!(effective.welcome.embed, config.welcome.embed);
        assert_eq!(effective.welcome.text, config.welcome.text);
    }

    #[test]
    fn inline_layer_wins_over_channel() {
        let mut config = GuildConfig::default();
        config.welcome.upsert_channel(
            ChannelOverride::new(ChannelId(5))
                .with_mode(MessageMode::Text)
                .with_embed(EmbedPatch::color("#111111")),
        );
        let inline = GuildConfigPatch::default().with_section(SectionKind::Welcome, |s| {
            s.default_mode = Some(MessageMode::Embed);
            s.embed = Some(EmbedPatch::title("Inline"));
        });

        let effective = effective_config(GuildId(1), &config, Some(ChannelId(5)), Some(&inline));
        assert_eq!(effective.welcome.mode, MessageMode::Embed);
        assert_eq!(effective.welcome.embed.color, "#111111");
        assert_eq!(effective.welcome.embed.title, "Inline");
        assert_eq!(effective.welcome.channel_id, Some(ChannelId(5)));
    }

    #[test]
    fn inline_channel_list_replaces_lookup() {
        let config = GuildConfig::default();
        let inline = GuildConfigPatch::default().with_section(SectionKind::Leave, |s| {
            s.channels = Some(vec![
                ChannelOverride::new(ChannelId(8)).with_text("bye {user}"),
            ]);
        });

        let effective = effective_config(GuildId(1), &config, Some(ChannelId(8)), Some(&inline));
        assert_eq!(effective.leave.text, "bye {user}");
        assert_eq!(effective.leave.channels, vec![ChannelId(8)]);
        assert!(effective.welcome.channels.is_empty());
    }
}
