use herald_core::{
    ChannelId, ChannelOverride, EmbedPatch, FooterPatch, GuildConfig, GuildConfigPatch,
    MessageMode, SectionKind,
};
use herald_error::ValidationErrorKind;

#[test]
fn defaults_match_builtin_templates() {
    let config = GuildConfig::default();
    assert_eq!(config.prefix, "!");
    assert_eq!(config.welcome.embed.color, "#43B581");
    assert_eq!(config.leave.embed.color, "#F04747");
    assert_eq!(config.welcome.default_mode, MessageMode::Embed);
    assert!(config.welcome.channels.is_empty());
    assert!(config.roles.enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn patch_overwrites_only_defined_keys() {
    let patch = GuildConfigPatch::default().with_section(SectionKind::Welcome, |s| {
        s.embed = Some(EmbedPatch {
            footer: Some(FooterPatch {
                text: Some("Member {count}".to_string()),
                icon: None,
            }),
            ..EmbedPatch::default()
        });
    });

    let config = GuildConfig::default().merged(&patch);
    let defaults = GuildConfig::default();

    assert_eq!(config.welcome.embed.footer.text, "Member {count}");
    assert_eq!(config.welcome.embed.title, defaults.welcome.embed.title);
    assert_eq!(config.welcome.embed.footer.icon, None);
    assert_eq!(config.leave, defaults.leave);
}

#[test]
fn null_clears_nullable_field() {
    let patch: GuildConfigPatch =
        serde_json::from_str(r#"{"welcome":{"embed":{"thumbnail":null}}}"#).unwrap();
    let config = GuildConfig::default().merged(&patch);
    assert_eq!(config.welcome.embed.thumbnail, None);

    let untouched: GuildConfigPatch =
        serde_json::from_str(r#"{"welcome":{"embed":{"title":"Hi"}}}"#).unwrap();
    let config = GuildConfig::default().merged(&untouched);
    assert_eq!(config.welcome.embed.thumbnail.as_deref(), Some("user"));
}

#[test]
fn partial_document_is_filled_from_defaults() {
    let document = serde_json::json!({
        "prefix": "?",
        "leave": { "enabled": false }
    });
    let config = GuildConfig::from_document(document).unwrap();

    assert_eq!(config.prefix, "?");
    assert!(!config.leave.enabled);
    assert_eq!(config.leave.embed, GuildConfig::default().leave.embed);
    assert_eq!(config.welcome, GuildConfig::default().welcome);
}

#[test]
fn full_document_round_trips_through_json() {
    let mut config = GuildConfig::default();
    config
        .welcome
        .upsert_channel(ChannelOverride::new(ChannelId(7)).with_mode(MessageMode::Text));
    let document = serde_json::to_value(&config).unwrap();
    assert_eq!(GuildConfig::from_document(document).unwrap(), config);
}

#[test]
fn upsert_channel_replaces_in_place() {
    let mut config = GuildConfig::default();
    let section = config.section_mut(SectionKind::Leave);
    section.upsert_channel(ChannelOverride::new(ChannelId(1)));
    section.upsert_channel(ChannelOverride::new(ChannelId(2)));
    section.upsert_channel(ChannelOverride::new(ChannelId(1)).with_text("bye"));

    let ids: Vec<_> = section.channels.iter().map(|c| c.channel_id).collect();
    assert_eq!(ids, vec![ChannelId(1), ChannelId(2)]);
    assert_eq!(
        section.channel(ChannelId(1)).and_then(|c| c.text.as_deref()),
        Some("bye")
    );
    assert!(section.remove_channel(ChannelId(2)));
    assert!(!section.remove_channel(ChannelId(2)));
}

#[test]
fn validate_rejects_bad_color() {
    let mut config = GuildConfig::default();
    config.leave.embed.canvas.gradient_end = "red".to_string();
    let err = config.validate().unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::InvalidColor("red".to_string()));
}

#[test]
fn validate_rejects_duplicate_channels() {
    let mut config = GuildConfig::default();
    config.welcome.channels = vec![
        ChannelOverride::new(ChannelId(5)),
        ChannelOverride::new(ChannelId(5)),
    ];
    let err = config.validate().unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::DuplicateChannel(5));
}

#[test]
fn validate_rejects_bad_prefix() {
    let mut config = GuildConfig::default();

    config.prefix = "  ".to_string();
    assert_eq!(config.validate().unwrap_err().kind, ValidationErrorKind::EmptyPrefix);

    config.prefix = "a b".to_string();
    assert!(matches!(
        config.validate().unwrap_err().kind,
        ValidationErrorKind::PrefixWhitespace(_)
    ));

    config.prefix = "x".repeat(11);
    assert!(matches!(
        config.validate().unwrap_err().kind,
        ValidationErrorKind::PrefixTooLong { length: 11, max: 10 }
    ));
}

#[test]
fn validate_checks_channel_override_fields() {
    let mut config = GuildConfig::default();
    config.welcome.channels = vec![
        ChannelOverride::new(ChannelId(9)).with_embed(EmbedPatch::color("#12345G")),
    ];
    assert!(matches!(
        config.validate().unwrap_err().kind,
        ValidationErrorKind::InvalidColor(_)
    ));

    config.welcome.channels = vec![ChannelOverride::new(ChannelId(9)).with_text("x".repeat(2001))];
    assert!(matches!(
        config.validate().unwrap_err().kind,
        ValidationErrorKind::FieldTooLong { max: 2000, .. }
    ));
}
