use crate::error::FormatError;
use crate::ir::flextext::{
    FormKind, InterlinearDocument, Media, MediaFiles, Morph, MorphField, MorphItem, Note,
    Paragraph, Phrase, Word, WordForm,
};
use crate::settings::FlexLanguage;
use roxmltree::Node;

const DEFAULT_ANALYSIS_LANGUAGE: &str = "en";

pub fn parse_flextext(source: &str) -> Result<InterlinearDocument, FormatError> {
    let xml = roxmltree::Document::parse(source)
        .map_err(|e| FormatError::ParseError(format!("XML parsing error: {e}")))?;

    let root = xml.root_element();
    if root.tag_name().name() != "document" {
        return Err(FormatError::ParseError(format!(
            "Root element is <{}>, expected <document>",
            root.tag_name().name()
        )));
    }

    let mut texts = root
        .children()
        .filter(|n| n.has_tag_name("interlinear-text"));
    let text = texts
        .next()
        .ok_or_else(|| FormatError::ParseError("document has no <interlinear-text>".into()))?;
    if texts.next().is_some() {
        tracing::warn!("document holds several interlinear texts, reading only the first");
    }

    let mut doc = InterlinearDocument {
        guid: text.attribute("guid").map(str::to_string),
        ..InterlinearDocument::default()
    };
    let mut analysis_language = None;

    for child in text.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "item" if child.attribute("type") == Some("title") => {
                doc.title = Some(item_text(child));
                analysis_language = analysis_language.or(child.attribute("lang"));
            }
            "paragraphs" => {
                for paragraph in child.children().filter(|n| n.has_tag_name("paragraph")) {
                    doc.paragraphs.push(parse_paragraph(paragraph, &mut analysis_language)?);
                }
            }
            "languages" => {
                doc.languages = child
                    .children()
                    .filter(|n| n.has_tag_name("language"))
                    .filter_map(parse_language)
                    .collect();
            }
            "media-files" => doc.media_files = Some(parse_media_files(child)),
            other => tracing::debug!("skipping <{other}> in interlinear text"),
        }
    }

    doc.analysis_language = analysis_language
        .unwrap_or(DEFAULT_ANALYSIS_LANGUAGE)
        .to_string();
    Ok(doc)
}

fn item_text(node: Node) -> String {
    node.text().unwrap_or("").to_string()
}

fn parse_paragraph<'a>(
    node: Node<'a, '_>,
    analysis_language: &mut Option<&'a str>,
) -> Result<Paragraph, FormatError> {
    let mut paragraph = Paragraph {
        guid: node.attribute("guid").map(str::to_string),
        phrases: Vec::new(),
    };
    let phrases = node
        .children()
        .filter(|n| n.has_tag_name("phrases"))
        .flat_map(|n| n.children().filter(|p| p.has_tag_name("phrase")));
    for phrase in phrases {
        paragraph.phrases.push(parse_phrase(phrase, analysis_language)?);
    }
    Ok(paragraph)
}

fn parse_phrase<'a>(
    node: Node<'a, '_>,
    analysis_language: &mut Option<&'a str>,
) -> Result<Phrase, FormatError> {
    let attribute = |name: &str| node.attribute(name).map(str::to_string);
    let mut phrase = Phrase {
        guid: attribute("guid"),
        begin_offset: attribute("begin-time-offset"),
        end_offset: attribute("end-time-offset"),
        speaker: attribute("speaker"),
        media_file: attribute("media-file"),
        ..Phrase::default()
    };

    for child in node.children().filter(Node::is_element) {
        match (child.tag_name().name(), child.attribute("type")) {
            ("item", Some("segnum")) => {
                phrase.segnum = Some(item_text(child).trim().to_string());
                *analysis_language = analysis_language.or(child.attribute("lang"));
            }
            ("item", Some("gls")) => phrase.notes.push(Note::Translation {
                lang: child.attribute("lang").unwrap_or_default().to_string(),
                text: item_text(child),
            }),
            ("item", Some("note")) => {
                phrase.notes.push(Note::classify(&item_text(child)));
                *analysis_language = analysis_language.or(child.attribute("lang"));
            }
            ("words", _) => {
                for word in child.children().filter(|n| n.has_tag_name("word")) {
                    phrase.words.push(parse_word(word)?);
                }
            }
            (name, kind) => {
                tracing::debug!("skipping <{name}> ({}) in phrase", kind.unwrap_or("untyped"))
            }
        }
    }
    Ok(phrase)
}

fn parse_word(node: Node) -> Result<Word, FormatError> {
    let mut word = Word {
        guid: node.attribute("guid").map(str::to_string),
        ..Word::default()
    };
    for child in node.children().filter(Node::is_element) {
        match (child.tag_name().name(), child.attribute("type")) {
            ("item", Some(kind @ ("txt" | "punct"))) => word.forms.push(WordForm {
                kind: if kind == "txt" {
                    FormKind::Txt
                } else {
                    FormKind::Punct
                },
                lang: child.attribute("lang").unwrap_or_default().to_string(),
                text: item_text(child),
            }),
            ("item", Some("gls")) => word.gloss = Some(item_text(child)),
            ("item", Some("pos")) => word.pos = Some(item_text(child)),
            ("morphemes", _) => {
                word.morphs = child
                    .children()
                    .filter(|n| n.has_tag_name("morph"))
                    .map(parse_morph)
                    .collect();
            }
            _ => {}
        }
    }
    if word.forms.is_empty() {
        return Err(FormatError::ParseError(format!(
            "word {} has neither a txt nor a punct item",
            word.guid.as_deref().unwrap_or("without guid")
        )));
    }
    Ok(word)
}

fn parse_morph(node: Node) -> Morph {
    let items = node
        .children()
        .filter(|n| n.has_tag_name("item"))
        .filter_map(|item| {
            let field = item.attribute("type")?.parse::<MorphField>().ok()?;
            (field != MorphField::MorphType).then(|| MorphItem {
                field,
                lang: item.attribute("lang").map(str::to_string),
                text: item_text(item),
            })
        })
        .collect();
    Morph {
        guid: node.attribute("guid").map(str::to_string),
        kind: node.attribute("type").map(str::to_string),
        items,
    }
}

fn parse_language(node: Node) -> Option<FlexLanguage> {
    Some(FlexLanguage {
        lang: node.attribute("lang")?.to_string(),
        font: node.attribute("font").map(str::to_string),
        vernacular: node.attribute("vernacular") == Some("true"),
    })
}

fn parse_media_files(node: Node) -> MediaFiles {
    MediaFiles {
        offset_type: node.attribute("offset-type").unwrap_or_default().to_string(),
        media: node
            .children()
            .filter(|n| n.has_tag_name("media"))
            .filter_map(|media| {
                Some(Media {
                    guid: media.attribute("guid")?.to_string(),
                    location: media.attribute("location").unwrap_or_default().to_string(),
                })
            })
            .collect(),
    }
}
