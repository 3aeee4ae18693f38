//! Splitting utterance text into words and punctuation.
//!
//! Each language has its own word-forming character class. Text is cut at
//! every character outside the class, the cut characters are kept as their
//! own fragments, whitespace is dropped, and runs of `.` are merged into one
//! punctuation token written as `" ."`, `" .."`, and so on.

use crate::error::ConversionError;
use crate::settings::ConversionSettings;
use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Punctuation(String),
}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::Word(text) | Token::Punctuation(text) => text,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    /// Language code to a pattern matching one non-word-forming character
    separators: HashMap<String, Regex>,
}

impl Tokenizer {
    /// Tokenizer for the main and the child language of `settings`.
    pub fn from_settings(settings: &ConversionSettings) -> Result<Self, ConversionError> {
        Tokenizer::default()
            .with_language(&settings.child_language, &settings.child_characters)?
            .with_language(&settings.language, &settings.main_characters)
    }

    /// Register `language` with the content of a regex character class
    /// (e.g. `a-zA-Z'`).
    pub fn with_language(mut self, language: &str, characters: &str) -> Result<Self, ConversionError> {
        let separator = Regex::new(&format!("[^{characters}]")).map_err(|e| {
            ConversionError::Config(format!(
                "invalid word-forming characters for '{language}': {e}"
            ))
        })?;
        self.separators.insert(language.to_string(), separator);
        Ok(self)
    }

    pub fn tokenize(&self, text: &str, language: &str) -> Result<Vec<Token>, ConversionError> {
        let separator = self.separators.get(language).ok_or_else(|| {
            ConversionError::Config(format!("no word-forming characters defined for '{language}'"))
        })?;

        let mut tokens = Vec::new();
        let mut periods = String::new();
        for fragment in split_keeping_separators(separator, text) {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            if fragment == "." {
                periods.push('.');
                continue;
            }
            if !periods.is_empty() {
                tokens.push(Token::Punctuation(format!(" {}", std::mem::take(&mut periods))));
            }
            tokens.push(classify(separator, fragment));
        }
        if !periods.is_empty() {
            tokens.push(Token::Punctuation(format!(" {periods}")));
        }
        Ok(tokens)
    }
}

fn classify(separator: &Regex, fragment: &str) -> Token {
    if separator.is_match(fragment) {
        Token::Punctuation(fragment.to_string())
    } else {
        Token::Word(fragment.to_string())
    }
}

fn split_keeping_separators<'t>(separator: &Regex, text: &'t str) -> Vec<&'t str> {
    let mut fragments = Vec::new();
    let mut last = 0;
    for found in separator.find_iter(text) {
        fragments.push(&text[last..found.start()]);
        fragments.push(found.as_str());
        last = found.end();
    }
    fragments.push(&text[last..]);
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::default()
            .with_language("ain", r"\p{L}\p{M}'")
            .unwrap()
            .with_language("ain-x-child", "a-z")
            .unwrap()
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(Token::text).collect()
    }

    #[test]
    fn test_merges_trailing_periods() {
        let tokens = tokenizer().tokenize("hai there.", "ain").unwrap();
        assert_eq!(texts(&tokens), ["hai", "there", " ."]);
        assert_eq!(tokens[2], Token::Punctuation(" .".into()));
    }

    #[test]
    fn test_merges_period_runs_between_words() {
        let tokens = tokenizer().tokenize("well... ok", "ain").unwrap();
        assert_eq!(texts(&tokens), ["well", " ...", "ok"]);
    }

    #[test]
    fn test_other_punctuation_is_kept_per_character() {
        let tokens = tokenizer().tokenize("no, wait?!", "ain").unwrap();
        assert_eq!(texts(&tokens), ["no", ",", "wait", "?", "!"]);
        assert!(matches!(tokens[1], Token::Punctuation(_)));
        assert!(matches!(tokens[2], Token::Word(_)));
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        assert!(tokenizer().tokenize("", "ain").unwrap().is_empty());
        assert!(tokenizer().tokenize("   ", "ain").unwrap().is_empty());
    }

    #[test]
    fn test_classes_are_per_language() {
        let tokens = tokenizer().tokenize("kor'o", "ain").unwrap();
        assert_eq!(texts(&tokens), ["kor'o"]);

        let tokens = tokenizer().tokenize("kor'o", "ain-x-child").unwrap();
        assert_eq!(texts(&tokens), ["kor", "'", "o"]);
    }

    #[test]
    fn test_unknown_language_is_a_config_error() {
        assert!(matches!(
            tokenizer().tokenize("hai", "fr"),
            Err(ConversionError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_class_is_a_config_error() {
        assert!(matches!(
            Tokenizer::default().with_language("ain", r"\p{Nope}"),
            Err(ConversionError::Config(_))
        ));
    }
}
