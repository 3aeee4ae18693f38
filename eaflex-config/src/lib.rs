//! Shared configuration loader for the eaflex toolchain.
//!
//! `defaults/eaflex.default.toml` is embedded into every binary so that the
//! documented defaults and runtime behavior stay in sync. Applications layer
//! project files on top of those defaults via [`Loader`] before deserializing
//! into [`EaflexConfig`], then turn that into the library's
//! [`ConversionSettings`] with `TryFrom`.
//!
//! Speaker codes, tier ids and language codes are case-sensitive, so they are
//! always values (`[[speakers]] code = "ANA"`), never table keys.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use eaflex_babel::common::tokenizer::Tokenizer;
use eaflex_babel::ir::flextext::MorphField;
use eaflex_babel::settings::{ConversionSettings, EafLanguage, FlexLanguage, Speaker};
use eaflex_babel::ConversionError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/eaflex.default.toml");

/// Project file picked up from the working directory when present.
pub const PROJECT_FILE: &str = "eaflex.toml";

/// Top-level configuration consumed by eaflex applications.
#[derive(Debug, Clone, Deserialize)]
pub struct EaflexConfig {
    pub languages: LanguagesConfig,
    pub characters: CharactersConfig,
    #[serde(default)]
    pub speakers: Vec<SpeakerConfig>,
    pub annotations: AnnotationsConfig,
    pub tiers: TiersConfig,
    pub output: OutputConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguagesConfig {
    pub main: String,
    pub child: String,
    pub analysis: String,
    #[serde(default)]
    pub translations: Vec<String>,
}

/// Word-forming character class content per language.
#[derive(Debug, Clone, Deserialize)]
pub struct CharactersConfig {
    pub main: String,
    pub child: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpeakerConfig {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub child: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationsConfig {
    #[serde(default)]
    pub xds: Vec<String>,
    pub morph_fields: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TiersConfig {
    #[serde(default)]
    pub exclude_constraint: Vec<String>,
    #[serde(default)]
    pub exclude_id: Vec<String>,
    #[serde(default)]
    pub exclude_type: Vec<String>,
    #[serde(default)]
    pub target_type: Vec<String>,
    /// Source tiers holding free translations
    #[serde(default)]
    pub translation: Vec<TranslationTierConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationTierConfig {
    pub tier: String,
    pub language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub eaf_languages: Vec<EafLanguageConfig>,
    #[serde(default)]
    pub flextext_languages: Vec<FlexLanguageConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EafLanguageConfig {
    pub lang_def: String,
    pub lang_id: String,
    pub lang_label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlexLanguageConfig {
    pub lang: String,
    pub font: Option<String>,
    #[serde(default)]
    pub vernacular: bool,
}

/// Documents converted by `eaflex batch`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub to_flextext: Vec<ToFlexTextJob>,
    #[serde(default)]
    pub to_eaf: Vec<ToEafJob>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToFlexTextJob {
    pub eaf: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToEafJob {
    pub flextext: PathBuf,
    pub original_eaf: PathBuf,
}

impl TryFrom<&EaflexConfig> for ConversionSettings {
    type Error = ConversionError;

    fn try_from(config: &EaflexConfig) -> Result<Self, Self::Error> {
        let mut settings = ConversionSettings::new(&config.languages.main, &config.languages.child);
        settings.analysis_language = config.languages.analysis.clone();
        settings.translations = config.languages.translations.clone();
        settings.main_characters = config.characters.main.clone();
        settings.child_characters = config.characters.child.clone();
        settings.speakers = config
            .speakers
            .iter()
            .map(|s| Speaker {
                code: s.code.clone(),
                name: s.name.clone(),
                child: s.child,
            })
            .collect();
        settings.xds = config.annotations.xds.clone();
        settings.morph_fields = config
            .annotations
            .morph_fields
            .iter()
            .map(|name| name.parse::<MorphField>().map_err(ConversionError::Config))
            .collect::<Result<_, _>>()?;

        let tiers = &config.tiers;
        settings.exclude_tier_constraint = tiers.exclude_constraint.clone();
        settings.exclude_tier_id = tiers.exclude_id.clone();
        settings.exclude_tier_type = tiers.exclude_type.clone();
        settings.target_utterance_tier_type = tiers.target_type.clone();
        settings.translation_tiers = tiers
            .translation
            .iter()
            .map(|t| (t.tier.clone(), t.language.clone()))
            .collect();

        settings.eaf_languages = config
            .output
            .eaf_languages
            .iter()
            .map(|l| EafLanguage {
                lang_def: l.lang_def.clone(),
                lang_id: l.lang_id.clone(),
                lang_label: l.lang_label.clone(),
            })
            .collect();
        settings.flextext_languages = config
            .output
            .flextext_languages
            .iter()
            .map(|l| FlexLanguage {
                lang: l.lang.clone(),
                font: l.font.clone(),
                vernacular: l.vernacular,
            })
            .collect();

        settings.validate()?;
        Tokenizer::from_settings(&settings)?;
        Ok(settings)
    }
}

impl TryFrom<EaflexConfig> for ConversionSettings {
    type Error = ConversionError;

    fn try_from(config: EaflexConfig) -> Result<Self, Self::Error> {
        ConversionSettings::try_from(&config)
    }
}

/// Helper for layering project files and overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer configuration text, as if it were a file.
    pub fn with_toml(mut self, text: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(text, FileFormat::Toml));
        self
    }

    /// Apply a single key/value override (`languages.main`, `tiers.exclude_id`, ...).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<EaflexConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<EaflexConfig, ConfigError> {
    Loader::new().build()
}
