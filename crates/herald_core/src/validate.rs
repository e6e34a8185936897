//! Write-boundary validation of guild configuration.

use crate::{EmbedPatch, EmbedSettings, GuildConfig, MessageSection, SectionKind};
use herald_error::{ValidationError, ValidationErrorKind};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Longest accepted command prefix.
pub const MAX_PREFIX_LEN: usize = 10;
/// Discord embed title limit.
pub const MAX_TITLE_LEN: usize = 256;
/// Discord embed description limit.
pub const MAX_DESCRIPTION_LEN: usize = 4096;
/// Discord embed footer limit.
pub const MAX_FOOTER_LEN: usize = 2048;
/// Discord message content limit.
pub const MAX_TEXT_LEN: usize = 2000;

const COLOR_PATTERN: &str = r"^#[0-9A-Fa-f]{6}$";

static COLOR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(COLOR_PATTERN).ok());

/// Check that a color is a `#RRGGBB` hex string.
///
/// # Examples
///
/// ```
/// use herald_core::validate_color;
///
/// assert!(validate_color("#43b581").is_ok());
/// assert!(validate_color("43B581").is_err());
/// assert!(validate_color("#43B58").is_err());
/// ```
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    let valid = COLOR.as_ref().is_some_and(|re| re.is_match(color));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new(ValidationErrorKind::InvalidColor(
            color.to_string(),
        )))
    }
}

fn check_len(field: String, value: &str, max: usize) -> Result<(), ValidationError> {
    let length = value.chars().count();
    if length > max {
        return Err(ValidationError::new(ValidationErrorKind::FieldTooLong {
            field,
            length,
            max,
        }));
    }
    Ok(())
}

fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.trim().is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::EmptyPrefix));
    }
    if prefix.chars().any(char::is_whitespace) {
        return Err(ValidationError::new(ValidationErrorKind::PrefixWhitespace(
            prefix.to_string(),
        )));
    }
    let length = prefix.chars().count();
    if length > MAX_PREFIX_LEN {
        return Err(ValidationError::new(ValidationErrorKind::PrefixTooLong {
            length,
            max: MAX_PREFIX_LEN,
        }));
    }
    Ok(())
}

fn validate_embed(scope: &str, embed: &EmbedSettings) -> Result<(), ValidationError> {
    for color in [
        &embed.color,
        &embed.canvas.gradient_start,
        &embed.canvas.gradient_end,
        &embed.canvas.background_color,
        &embed.canvas.text_color,
    ] {
        validate_color(color)?;
    }
    check_len(format!("{scope}.embed.title"), &embed.title, MAX_TITLE_LEN)?;
    check_len(
        format!("{scope}.embed.description"),
        &embed.description,
        MAX_DESCRIPTION_LEN,
    )?;
    check_len(
        format!("{scope}.embed.footer.text"),
        &embed.footer.text,
        MAX_FOOTER_LEN,
    )
}

fn validate_embed_patch(scope: &str, patch: &EmbedPatch) -> Result<(), ValidationError> {
    for color in patch.colors() {
        validate_color(color)?;
    }
    if let Some(title) = &patch.title {
        check_len(format!("{scope}.embed.title"), title, MAX_TITLE_LEN)?;
    }
    if let Some(description) = &patch.description {
        check_len(
            format!("{scope}.embed.description"),
            description,
            MAX_DESCRIPTION_LEN,
        )?;
    }
    if let Some(text) = patch.footer.as_ref().and_then(|f| f.text.as_ref()) {
        check_len(format!("{scope}.embed.footer.text"), text, MAX_FOOTER_LEN)?;
    }
    Ok(())
}

impl MessageSection {
    /// Validate a section; `kind` names it in error messages.
    pub fn validate(&self, kind: SectionKind) -> Result<(), ValidationError> {
        let scope = kind.to_string();
        validate_embed(&scope, &self.embed)?;
        check_len(format!("{scope}.text"), &self.text, MAX_TEXT_LEN)?;

        let mut seen = HashSet::new();
        for entry in &self.channels {
            if !seen.insert(entry.channel_id) {
                return Err(ValidationError::new(ValidationErrorKind::DuplicateChannel(
                    entry.channel_id.get(),
                )));
            }
            let channel_scope = format!("{scope}.channels[{}]", entry.channel_id);
            if let Some(embed) = &entry.embed {
                validate_embed_patch(&channel_scope, embed)?;
            }
            if let Some(text) = &entry.text {
                check_len(format!("{channel_scope}.text"), text, MAX_TEXT_LEN)?;
            }
        }
        Ok(())
    }
}

impl GuildConfig {
    /// Validate the whole document.
    ///
    /// # Errors
    ///
    /// Returns the first rule the document violates: prefix shape, color
    /// format, platform length limits, or duplicate channel overrides.
    ///
    /// # Examples
    ///
    /// ```
    /// use herald_core::GuildConfig;
    ///
    /// let mut config = GuildConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.prefix = "way-too-long-prefix".to_string();
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_prefix(&self.prefix)?;
        self.welcome.validate(SectionKind::Welcome)?;
        self.leave.validate(SectionKind::Leave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_pattern_compiles_once() {
        assert!(COLOR.is_some());
        let first = COLOR.as_ref().map(|re| re as *const Regex);
        assert!(validate_color("#ABCDEF").is_ok());
        assert!(validate_color("#abcdeg").is_err());
        assert_eq!(COLOR.as_ref().map(|re| re as *const Regex), first);
    }
}
