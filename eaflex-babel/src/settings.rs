//! Conversion settings consumed by the mapping core.
//!
//! This is the library-side view of the configuration. `eaflex-config` loads
//! and layers the TOML sources and converts them into [`ConversionSettings`];
//! tests and embedders can build one directly.

use crate::error::ConversionError;
use crate::ir::flextext::MorphField;
use std::collections::BTreeMap;

/// A participant known to the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speaker {
    /// Code used as the ELAN participant and in speaker notes
    pub code: String,
    /// Name used to build tier ids
    pub name: String,
    /// Whether the speaker gets a target subtree
    pub child: bool,
}

/// `LANGUAGE` definition added to generated EAF documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EafLanguage {
    pub lang_def: String,
    pub lang_id: String,
    pub lang_label: String,
}

/// `language` entry added to generated FlexText documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlexLanguage {
    pub lang: String,
    pub font: Option<String>,
    pub vernacular: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSettings {
    /// Main (vernacular) language code
    pub language: String,
    /// Language used for phonetic renderings of child speech
    pub child_language: String,
    /// Analysis language for segment numbers and notes in FlexText
    pub analysis_language: String,
    /// Translation languages, in emission order
    pub translations: Vec<String>,
    pub speakers: Vec<Speaker>,
    /// Controlled vocabulary for addressee notes
    pub xds: Vec<String>,
    /// Morph-level fields, in emission order. Must contain [`MorphField::Form`].
    pub morph_fields: Vec<MorphField>,
    pub exclude_tier_constraint: Vec<String>,
    pub exclude_tier_id: Vec<String>,
    pub exclude_tier_type: Vec<String>,
    /// Linguistic types whose tiers hold target utterances
    pub target_utterance_tier_type: Vec<String>,
    /// Tier id to translation language
    pub translation_tiers: BTreeMap<String, String>,
    /// Word-forming character class content for the main language
    pub main_characters: String,
    /// Word-forming character class content for the child language
    pub child_characters: String,
    pub eaf_languages: Vec<EafLanguage>,
    pub flextext_languages: Vec<FlexLanguage>,
}

impl ConversionSettings {
    /// Settings with the given languages and permissive defaults for everything else.
    pub fn new(language: impl Into<String>, child_language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            child_language: child_language.into(),
            analysis_language: "en".to_string(),
            translations: Vec::new(),
            speakers: Vec::new(),
            xds: Vec::new(),
            morph_fields: MorphField::ALL.to_vec(),
            exclude_tier_constraint: Vec::new(),
            exclude_tier_id: Vec::new(),
            exclude_tier_type: Vec::new(),
            target_utterance_tier_type: vec!["target".to_string()],
            translation_tiers: BTreeMap::new(),
            main_characters: r"\p{L}\p{M}\p{N}'".to_string(),
            child_characters: r"\p{L}\p{M}\p{N}'".to_string(),
            eaf_languages: Vec::new(),
            flextext_languages: Vec::new(),
        }
    }

    pub fn speaker(&self, code: &str) -> Option<&Speaker> {
        self.speakers.iter().find(|s| s.code == code)
    }

    /// Resolve a speaker note: configured codes match first, then names.
    pub fn speaker_by_code_or_name(&self, value: &str) -> Option<&Speaker> {
        self.speaker(value)
            .or_else(|| self.speakers.iter().find(|s| s.name == value))
    }

    pub fn is_xds(&self, value: &str) -> bool {
        self.xds.iter().any(|x| x == value)
    }

    /// Check the invariants the mapping core relies on.
    pub fn validate(&self) -> Result<(), ConversionError> {
        for (key, value) in [
            ("language", &self.language),
            ("child_language", &self.child_language),
            ("analysis_language", &self.analysis_language),
        ] {
            if value.trim().is_empty() {
                return Err(ConversionError::Config(format!("'{key}' must not be empty")));
            }
        }
        if !self.morph_fields.contains(&MorphField::Form) {
            return Err(ConversionError::Config(
                "morph_fields must include 'txt' (the morph form)".to_string(),
            ));
        }
        for (i, speaker) in self.speakers.iter().enumerate() {
            if speaker.code.is_empty() || speaker.name.is_empty() {
                return Err(ConversionError::Config(format!(
                    "speaker #{} needs both a code and a name",
                    i + 1
                )));
            }
            if self.speakers[..i].iter().any(|s| s.code == speaker.code) {
                return Err(ConversionError::Config(format!(
                    "speaker code '{}' is defined twice",
                    speaker.code
                )));
            }
        }
        Ok(())
    }
}
