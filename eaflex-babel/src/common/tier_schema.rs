//! The tier skeleton of a generated annotation document.
//!
//! [`build`] produces the linguistic-type catalog and, per speaker, the tier
//! hierarchy every utterance of that speaker is written into:
//!
//! ```text
//! Ana-ain-phonetic                     main language, time-alignable
//! ├── Ana-tns-en                       one per translation language
//! ├── Ana-notes, Ana-xds
//! ├── Ana-ain-phonetic-words           subdivision
//! │   ├── Ana-ain-phonetic-gls, -pos
//! │   └── Ana-ain-phonetic-morph-txt   subdivision
//! │       └── Ana-ain-phonetic-morph-<field>
//! └── Ana-ain-target                   child speakers only
//!     └── Ana-ain-target-words         same shape as the phonetic words
//! ```
//!
//! Tier ids are built from the speaker's configured name, which is also the
//! tier participant.

use crate::error::ConversionError;
use crate::ir::eaf::{Constraint, LinguisticType, Tier};
use crate::ir::flextext::{MorphField, UtteranceKind};
use crate::settings::{ConversionSettings, Speaker};

/// Linguistic type ids that do not depend on configuration.
pub const WORDS_TYPE: &str = "words";
pub const NOTES_TYPE: &str = "notes";
pub const TARGET_TYPE: &str = "target";
pub const GLOSS_TYPE: &str = "gls";
pub const POS_TYPE: &str = "pos";

pub fn translation_type(language: &str) -> String {
    format!("tns-{language}")
}

/// Linguistic types and empty tiers, ready to receive annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct TierTemplate {
    pub linguistic_types: Vec<LinguisticType>,
    pub tiers: Vec<Tier>,
}

/// Tier ids for one speaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierNames {
    speaker: String,
    language: String,
}

impl TierNames {
    pub fn new(speaker_name: &str, language: &str) -> Self {
        Self {
            speaker: speaker_name.to_string(),
            language: language.to_string(),
        }
    }

    /// The utterance tier: `{name}-{lang}-phonetic` or `{name}-{lang}-target`.
    pub fn baseline(&self, kind: UtteranceKind) -> String {
        let branch = match kind {
            UtteranceKind::Phonetic => "phonetic",
            UtteranceKind::Target => "target",
        };
        format!("{}-{}-{}", self.speaker, self.language, branch)
    }

    pub fn translation(&self, language: &str) -> String {
        format!("{}-tns-{}", self.speaker, language)
    }

    pub fn notes(&self) -> String {
        format!("{}-notes", self.speaker)
    }

    pub fn xds(&self) -> String {
        format!("{}-xds", self.speaker)
    }

    pub fn words(&self, kind: UtteranceKind) -> String {
        format!("{}-words", self.baseline(kind))
    }

    /// Word-level field tier (`gls`, `pos`).
    pub fn word_field(&self, kind: UtteranceKind, field: &str) -> String {
        format!("{}-{}", self.baseline(kind), field)
    }

    pub fn morph(&self, kind: UtteranceKind, field: MorphField) -> String {
        format!("{}-{}", self.baseline(kind), field.type_id())
    }
}

/// The fixed linguistic-type catalog for `settings`.
pub fn linguistic_types(settings: &ConversionSettings) -> Vec<LinguisticType> {
    let mut types = vec![
        LinguisticType::new(settings.language.as_str(), true, None),
        LinguisticType::new(WORDS_TYPE, false, Some(Constraint::SymbolicSubdivision)),
    ];
    for language in &settings.translations {
        types.push(LinguisticType::new(
            translation_type(language),
            false,
            Some(Constraint::SymbolicAssociation),
        ));
    }
    for id in [NOTES_TYPE, TARGET_TYPE, GLOSS_TYPE, POS_TYPE] {
        types.push(LinguisticType::new(id, false, Some(Constraint::SymbolicAssociation)));
    }
    for field in &settings.morph_fields {
        let constraint = match field {
            MorphField::Form => Constraint::SymbolicSubdivision,
            _ => Constraint::SymbolicAssociation,
        };
        types.push(LinguisticType::new(field.type_id(), false, Some(constraint)));
    }
    types
}

/// Tiers for one speaker, parents before children.
pub fn speaker_tiers(settings: &ConversionSettings, speaker: &Speaker) -> Vec<Tier> {
    let names = TierNames::new(&speaker.name, &settings.language);
    let participant = Some(speaker.name.clone());
    let tier = |id: String, lt: &str, parent: Option<String>| {
        Tier::new(id, lt, parent, participant.clone())
    };

    let phonetic = names.baseline(UtteranceKind::Phonetic);
    let mut tiers = vec![tier(phonetic.clone(), &settings.language, None)];
    for language in &settings.translations {
        tiers.push(tier(
            names.translation(language),
            &translation_type(language),
            Some(phonetic.clone()),
        ));
    }
    tiers.push(tier(names.notes(), NOTES_TYPE, Some(phonetic.clone())));
    tiers.push(tier(names.xds(), NOTES_TYPE, Some(phonetic.clone())));
    word_branch(settings, &names, UtteranceKind::Phonetic, &mut tiers, &tier);

    if speaker.child {
        tiers.push(tier(
            names.baseline(UtteranceKind::Target),
            TARGET_TYPE,
            Some(phonetic),
        ));
        word_branch(settings, &names, UtteranceKind::Target, &mut tiers, &tier);
    }
    tiers
}

fn word_branch(
    settings: &ConversionSettings,
    names: &TierNames,
    kind: UtteranceKind,
    tiers: &mut Vec<Tier>,
    tier: &impl Fn(String, &str, Option<String>) -> Tier,
) {
    let words = names.words(kind);
    tiers.push(tier(words.clone(), WORDS_TYPE, Some(names.baseline(kind))));
    for field in [GLOSS_TYPE, POS_TYPE] {
        tiers.push(tier(names.word_field(kind, field), field, Some(words.clone())));
    }
    let morph_form = names.morph(kind, MorphField::Form);
    tiers.push(tier(
        morph_form.clone(),
        &MorphField::Form.type_id(),
        Some(words),
    ));
    for field in settings.morph_fields.iter().filter(|f| **f != MorphField::Form) {
        tiers.push(tier(
            names.morph(kind, *field),
            &field.type_id(),
            Some(morph_form.clone()),
        ));
    }
}

/// Build the skeleton for the given speaker codes, in the order given.
pub fn build<'a>(
    settings: &ConversionSettings,
    speaker_codes: impl IntoIterator<Item = &'a str>,
) -> Result<TierTemplate, ConversionError> {
    let mut tiers = Vec::new();
    for code in speaker_codes {
        let speaker = settings.speaker(code).ok_or_else(|| {
            ConversionError::Config(format!("speaker '{code}' is not configured"))
        })?;
        tiers.extend(speaker_tiers(settings, speaker));
    }
    Ok(TierTemplate {
        linguistic_types: linguistic_types(settings),
        tiers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ConversionSettings {
        let mut settings = ConversionSettings::new("ain", "ain-x-child");
        settings.translations = vec!["en".into()];
        settings.morph_fields = vec![MorphField::Form, MorphField::Gloss];
        settings.speakers = vec![
            Speaker { code: "ANA".into(), name: "Ana".into(), child: false },
            Speaker { code: "BO".into(), name: "Bo".into(), child: true },
        ];
        settings
    }

    fn ids(template: &TierTemplate) -> Vec<&str> {
        template.tiers.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_catalog_order() {
        let types: Vec<_> = linguistic_types(&settings())
            .into_iter()
            .map(|lt| (lt.id, lt.time_alignable, lt.constraint))
            .collect();
        assert_eq!(
            types,
            vec![
                ("ain".to_string(), true, None),
                ("words".into(), false, Some(Constraint::SymbolicSubdivision)),
                ("tns-en".into(), false, Some(Constraint::SymbolicAssociation)),
                ("notes".into(), false, Some(Constraint::SymbolicAssociation)),
                ("target".into(), false, Some(Constraint::SymbolicAssociation)),
                ("gls".into(), false, Some(Constraint::SymbolicAssociation)),
                ("pos".into(), false, Some(Constraint::SymbolicAssociation)),
                ("morph-txt".into(), false, Some(Constraint::SymbolicSubdivision)),
                ("morph-gls".into(), false, Some(Constraint::SymbolicAssociation)),
            ]
        );
    }

    #[test]
    fn test_adult_speaker_has_no_target_branch() {
        let template = build(&settings(), ["ANA"]).unwrap();
        assert_eq!(
            ids(&template),
            [
                "Ana-ain-phonetic",
                "Ana-tns-en",
                "Ana-notes",
                "Ana-xds",
                "Ana-ain-phonetic-words",
                "Ana-ain-phonetic-gls",
                "Ana-ain-phonetic-pos",
                "Ana-ain-phonetic-morph-txt",
                "Ana-ain-phonetic-morph-gls",
            ]
        );
        let morph_gls = &template.tiers[8];
        assert_eq!(morph_gls.parent.as_deref(), Some("Ana-ain-phonetic-morph-txt"));
        assert_eq!(morph_gls.participant.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_child_speaker_gets_target_branch() {
        let template = build(&settings(), ["BO"]).unwrap();
        let target = template
            .tiers
            .iter()
            .find(|t| t.id == "Bo-ain-target")
            .unwrap();
        assert_eq!(target.linguistic_type, "target");
        assert_eq!(target.parent.as_deref(), Some("Bo-ain-phonetic"));
        assert!(ids(&template).contains(&"Bo-ain-target-morph-gls"));
        assert_eq!(template.tiers.len(), 9 + 6);
    }

    #[test]
    fn test_unknown_speaker_is_a_config_error() {
        assert!(matches!(
            build(&settings(), ["ZED"]),
            Err(ConversionError::Config(_))
        ));
    }
}
