use regex::Regex;
use thiserror::Error;

use crate::profanity::ProfanityFilter;
use crate::rules::FilterRulesError;

/// Inclusive bounds on the character count of a submission.
pub const CHAR_MIN: usize = 4;
pub const CHAR_MAX: usize = 1000;

/// Latin letters, digits, whitespace and a fixed punctuation set.
const ALLOWED_CHARSET: &str = r#"^[A-Za-z0-9\s\n\r.,!?'"()\-—–;:…]+$"#;

/// Client-caused rejection of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Tulisan kosong.")]
    Empty,

    #[error("Panjang tulisan harus {CHAR_MIN}-{CHAR_MAX} karakter.")]
    Length { count: usize },

    #[error("Tulisan mengandung karakter yang tidak diizinkan.")]
    Charset,

    #[error("Kata-kata tidak pantas terdeteksi.")]
    Profanity,
}

/// Strips surrounding whitespace, including the byte-order mark that
/// pasted text sometimes starts with.
pub fn trim_input(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Length in characters, not bytes.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

pub fn check_length(text: &str) -> Result<(), ValidationError> {
    let count = char_count(text);
    if (CHAR_MIN..=CHAR_MAX).contains(&count) {
        Ok(())
    } else {
        Err(ValidationError::Length { count })
    }
}

/// Runs every submission check in order: presence, length, charset
/// (when strict), profanity.
#[derive(Debug, Clone)]
pub struct Validator {
    filter: ProfanityFilter,
    charset: Option<Regex>,
}

impl Validator {
    pub fn new(filter: ProfanityFilter, strict_charset: bool) -> Result<Self, FilterRulesError> {
        let charset = if strict_charset {
            let re = Regex::new(ALLOWED_CHARSET).map_err(|source| FilterRulesError::Pattern {
                pattern: ALLOWED_CHARSET.to_string(),
                source,
            })?;
            Some(re)
        } else {
            None
        };
        Ok(Self { filter, charset })
    }

    pub fn strict_charset(&self) -> bool {
        self.charset.is_some()
    }

    pub fn filter(&self) -> &ProfanityFilter {
        &self.filter
    }

    pub fn check_charset(&self, text: &str) -> Result<(), ValidationError> {
        match &self.charset {
            Some(re) if !re.is_match(text) => Err(ValidationError::Charset),
            _ => Ok(()),
        }
    }

    /// Returns the trimmed text that should be persisted.
    pub fn validate(&self, raw: Option<&str>) -> Result<String, ValidationError> {
        let text = raw.map(trim_input).unwrap_or_default();
        if text.is_empty() {
            return Err(ValidationError::Empty);
        }

        check_length(text)?;
        self.check_charset(text)?;

        if self.filter.is_profane(text) {
            return Err(ValidationError::Profanity);
        }

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FilterRules;

    fn validator(strict: bool) -> Validator {
        Validator::new(ProfanityFilter::new(FilterRules::default()).unwrap(), strict).unwrap()
    }

    #[test]
    fn length_boundaries() {
        assert_eq!(check_length("abc"), Err(ValidationError::Length { count: 3 }));
        assert_eq!(check_length("abcd"), Ok(()));
        assert_eq!(check_length(&"a".repeat(1000)), Ok(()));
        assert_eq!(
            check_length(&"a".repeat(1001)),
            Err(ValidationError::Length { count: 1001 })
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // Four characters, twelve bytes.
        assert_eq!(check_length("…………"), Ok(()));
    }

    #[test]
    fn missing_or_blank_text_is_empty() {
        let v = validator(true);
        assert_eq!(v.validate(None), Err(ValidationError::Empty));
        assert_eq!(v.validate(Some("   \n ")), Err(ValidationError::Empty));
    }

    #[test]
    fn leading_byte_order_mark_is_trimmed() {
        assert_eq!(trim_input("\u{feff}Salju turun \u{feff}"), "Salju turun");
        assert_eq!(
            validator(true).validate(Some("\u{feff}Salju turun")),
            Ok("Salju turun".to_string())
        );
        assert_eq!(validator(true).validate(Some("\u{feff}")), Err(ValidationError::Empty));
    }

    #[test]
    fn text_is_trimmed_before_measuring() {
        let v = validator(true);
        assert_eq!(
            v.validate(Some("  ok  ")),
            Err(ValidationError::Length { count: 2 })
        );
        assert_eq!(v.validate(Some("  lega  ")).unwrap(), "lega");
    }

    #[test]
    fn strict_charset_rejects_emoji_and_other_scripts() {
        let v = validator(true);
        assert_eq!(v.validate(Some("salju ❄ turun")), Err(ValidationError::Charset));
        assert_eq!(v.validate(Some("日本語のテキスト")), Err(ValidationError::Charset));
        assert!(v.validate(Some("Aku bilang: \"tidak\" (lagi) — selesai…")).is_ok());
    }

    #[test]
    fn relaxed_charset_allows_other_scripts() {
        let v = validator(false);
        assert!(!v.strict_charset());
        assert_eq!(v.validate(Some("日本語のテキスト")).unwrap(), "日本語のテキスト");
    }

    #[test]
    fn profanity_checked_last() {
        let v = validator(true);
        assert_eq!(v.validate(Some("dasar k0nt0l")), Err(ValidationError::Profanity));
        // Too short wins over profanity.
        assert_eq!(
            v.validate(Some("asu")),
            Err(ValidationError::Length { count: 3 })
        );
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            ValidationError::Length { count: 2 }.to_string(),
            "Panjang tulisan harus 4-1000 karakter."
        );
    }
}
