use regex::{Regex, RegexBuilder};

use crate::rules::{FilterRules, FilterRulesError};

/// Leetspeak substitutions applied after lowercasing.
fn substitute(c: char) -> char {
    match c {
        '0' => 'o',
        '1' => 'i',
        '3' => 'e',
        '4' => 'a',
        '5' => 's',
        '@' => 'a',
        '$' => 's',
        '(' => 'c',
        '+' => 't',
        'z' => 's',
        other => other,
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Lowercase, undo leetspeak, and collapse stretched runs ("koooontol").
///
/// Line terminators are never collapsed.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;

    for c in text.to_lowercase().chars().map(substitute) {
        if prev == Some(c) && !is_line_terminator(c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }

    out
}

/// Drop everything except `a`-`z`, defeating separators ("k-o-n-t-o-l").
pub fn strip(normalized: &str) -> String {
    normalized.chars().filter(|c| c.is_ascii_lowercase()).collect()
}

/// Decides whether text contains disallowed content.
///
/// Pure and total: any `&str` is accepted and the answer depends only on the
/// input and the rules the filter was built from.
#[derive(Debug, Clone)]
pub struct ProfanityFilter {
    words: Vec<String>,
    patterns: Vec<Regex>,
}

impl ProfanityFilter {
    pub fn new(rules: FilterRules) -> Result<Self, FilterRulesError> {
        let patterns = rules
            .patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| FilterRulesError::Pattern {
                        pattern: p.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // An empty word would match every input.
        let words = rules
            .words
            .into_iter()
            .map(|w| w.to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        Ok(Self { words, patterns })
    }

    pub fn is_profane(&self, text: &str) -> bool {
        let normalized = normalize(text);
        let stripped = strip(&normalized);

        if self.words.iter().any(|w| stripped.contains(w.as_str())) {
            return true;
        }

        self.patterns.iter().any(|p| p.is_match(&normalized))
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ProfanityFilter {
        ProfanityFilter::new(FilterRules::default()).unwrap()
    }

    #[test]
    fn normalize_substitutes_and_collapses() {
        assert_eq!(normalize("K0NT0L"), "kontol");
        assert_eq!(normalize("kkkoonntool"), "kontol");
        assert_eq!(normalize("$h1t"), "shit");
        assert_eq!(normalize("(o(k"), "cock");
        assert_eq!(normalize("+ai"), "tai");
        assert_eq!(normalize("zzz"), "s");
    }

    #[test]
    fn normalize_keeps_repeated_newlines() {
        assert_eq!(normalize("a\n\nb"), "a\n\nb");
        assert_eq!(normalize("a  b"), "a b");
    }

    #[test]
    fn strip_keeps_only_latin_letters() {
        assert_eq!(strip("k-o-n t.o_l!"), "kontol");
        assert_eq!(strip("salju ❄ turun"), "saljuturun");
        assert_eq!(strip("日本語"), "");
    }

    #[test]
    fn catches_obfuscated_words() {
        let f = filter();
        assert!(f.is_profane("k0nt0l"));
        assert!(f.is_profane("kkkoonntool"));
        assert!(f.is_profane("k-o-n-t-o-l"));
        assert!(f.is_profane("K O N T O L"));
        assert!(f.is_profane("dasar b@ngs@t"));
        assert!(f.is_profane("what the FUUUCK"));
    }

    #[test]
    fn catches_pattern_variants() {
        let f = filter();
        // Not in the word list, only reachable through the patterns.
        assert!(f.is_profane("kuntul"));
        assert!(f.is_profane("kantul"));
        assert!(f.is_profane("nonton bokep"));
        assert!(f.is_profane("facck"));
    }

    #[test]
    fn benign_text_passes() {
        let f = filter();
        assert!(!f.is_profane("Hari ini aku lega"));
        assert!(!f.is_profane("Aku rindu rumah dan keluarga di bulan Desember."));
        assert!(!f.is_profane("Terima kasih untuk tahun ini"));
    }

    #[test]
    fn total_over_odd_input() {
        let f = filter();
        assert!(!f.is_profane(""));
        assert!(!f.is_profane("日本語のテキスト"));
        assert!(!f.is_profane("\u{0}\u{1b}[31m\t\r\n"));
        assert!(!f.is_profane("🎄❄️☃️"));
        assert!(!f.is_profane("1234567890"));
    }

    #[test]
    fn empty_rules_match_nothing() {
        let f = ProfanityFilter::new(FilterRules {
            words: vec![String::new()],
            patterns: Vec::new(),
        })
        .unwrap();
        assert_eq!(f.word_count(), 0);
        assert!(!f.is_profane("kontol"));
    }

    #[test]
    fn custom_rules_replace_defaults() {
        let f = ProfanityFilter::new(FilterRules {
            words: vec!["salju".into()],
            patterns: vec![r"es+krim".into()],
        })
        .unwrap();
        assert!(f.is_profane("S-A-L-J-U"));
        assert!(f.is_profane("ESKRIM"));
        assert!(!f.is_profane("kontol"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = ProfanityFilter::new(FilterRules {
            words: Vec::new(),
            patterns: vec!["k[aou".into()],
        })
        .unwrap_err();
        assert!(matches!(err, FilterRulesError::Pattern { .. }));
    }
}
