//! Text screening for submitted confessions.
//!
//! [`ProfanityFilter`] scores text against a swappable word list and pattern
//! set after undoing common obfuscation; [`Validator`] layers the length and
//! character checks in front of it.

pub mod profanity;
pub mod rules;
pub mod validate;

pub use profanity::ProfanityFilter;
pub use rules::{FilterRules, FilterRulesError};
pub use validate::{CHAR_MAX, CHAR_MIN, ValidationError, Validator, trim_input};
