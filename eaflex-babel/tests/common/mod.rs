//! Shared fixtures and settings for the integration tests.

use eaflex_babel::ir::flextext::MorphField;
use eaflex_babel::settings::{ConversionSettings, EafLanguage, FlexLanguage, Speaker};
use std::path::PathBuf;

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}

/// Settings matching the speakers and tiers of the fixtures.
pub fn settings() -> ConversionSettings {
    let mut settings = ConversionSettings::new("ain", "ain-x-child");
    settings.translations = vec!["en".into()];
    settings.xds = vec!["ADS".into(), "CDS".into()];
    settings.morph_fields = vec![MorphField::Form, MorphField::Gloss];
    settings.speakers = vec![
        Speaker {
            code: "ANA".into(),
            name: "Ana".into(),
            child: false,
        },
        Speaker {
            code: "BO".into(),
            name: "Bo".into(),
            child: true,
        },
    ];
    settings.exclude_tier_constraint = vec!["Symbolic_Subdivision".into()];
    settings.exclude_tier_type = vec!["words".into()];
    for tier in ["Ana-tns-en", "Bo-tns-en"] {
        settings.translation_tiers.insert(tier.into(), "en".into());
    }
    settings.eaf_languages = vec![EafLanguage {
        lang_def: "http://cdb.iso.org/lg/CDB-00138502-001".into(),
        lang_id: "ain".into(),
        lang_label: "Ainu (ain)".into(),
    }];
    settings.flextext_languages = vec![
        FlexLanguage {
            lang: "ain".into(),
            font: Some("Charis SIL".into()),
            vernacular: true,
        },
        FlexLanguage {
            lang: "en".into(),
            font: Some("Times New Roman".into()),
            vernacular: false,
        },
    ];
    settings
}
