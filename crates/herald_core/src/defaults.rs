//! Built-in configuration defaults.

use crate::{
    CanvasSettings, EmbedSettings, FooterSettings, GuildConfig, MessageMode, MessageSection,
    RolesConfig,
};

/// Command prefix for new guilds.
pub const DEFAULT_PREFIX: &str = "!";

/// Text-mode welcome template.
pub const DEFAULT_WELCOME_TEXT: &str =
    "🎉 {user} just joined the server! Welcome to our community! You are member #{count}.";

/// Text-mode leave template.
pub const DEFAULT_LEAVE_TEXT: &str =
    "👋 {user} has left the server. They were with us for {duration}.";

const CARD_BACKGROUND: &str = "#23272a";
const CARD_TEXT: &str = "#ffffff";

impl MessageSection {
    /// Default welcome section.
    pub fn welcome() -> Self {
        Self {
            enabled: true,
            default_mode: MessageMode::Embed,
            channels: Vec::new(),
            embed: EmbedSettings {
                color: "#43B581".to_string(),
                title: "Welcome to the Server!".to_string(),
                description: "Hey {user}, welcome to our awesome community!".to_string(),
                show_timestamp: true,
                thumbnail: Some("user".to_string()),
                image: None,
                footer: FooterSettings {
                    text: "You are member #{count}".to_string(),
                    icon: None,
                },
                canvas: CanvasSettings {
                    gradient_start: "#5865F2".to_string(),
                    gradient_end: "#4752C4".to_string(),
                    background_color: CARD_BACKGROUND.to_string(),
                    text_color: CARD_TEXT.to_string(),
                },
            },
            text: DEFAULT_WELCOME_TEXT.to_string(),
        }
    }

    /// Default leave section.
    pub fn leave() -> Self {
        Self {
            enabled: true,
            default_mode: MessageMode::Embed,
            channels: Vec::new(),
            embed: EmbedSettings {
                color: "#F04747".to_string(),
                title: "User Left the Server".to_string(),
                description: "{user} has left our community.".to_string(),
                show_timestamp: true,
                thumbnail: Some("user".to_string()),
                image: None,
                footer: FooterSettings {
                    text: "They were with us for {duration}".to_string(),
                    icon: None,
                },
                canvas: CanvasSettings {
                    gradient_start: "#F04747".to_string(),
                    gradient_end: "#B52E31".to_string(),
                    background_color: CARD_BACKGROUND.to_string(),
                    text_color: CARD_TEXT.to_string(),
                },
            },
            text: DEFAULT_LEAVE_TEXT.to_string(),
        }
    }
}

impl Default for GuildConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            welcome: MessageSection::welcome(),
            leave: MessageSection::leave(),
            roles: RolesConfig {
                enabled: true,
                ..RolesConfig::default()
            },
        }
    }
}
