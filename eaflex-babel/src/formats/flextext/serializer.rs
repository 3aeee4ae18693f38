use crate::error::FormatError;
use crate::formats::common::XmlWriter;
use crate::ir::flextext::{InterlinearDocument, MediaFiles, Morph, MorphField, Note, Phrase, Word};
use uuid::Uuid;

pub fn serialize_flextext(doc: &InterlinearDocument) -> Result<String, FormatError> {
    let lang = doc.analysis_language.as_str();
    let mut w = XmlWriter::new();
    w.declaration()?;
    w.start("document", [("version", "2")])?;

    let guid = guid_or_new(&doc.guid);
    w.start("interlinear-text", [("guid", guid.as_str())])?;
    if let Some(title) = &doc.title {
        w.text_element("item", [("type", "title"), ("lang", lang)], title)?;
    }

    if doc.paragraphs.is_empty() {
        w.empty("paragraphs", [])?;
    } else {
        w.start("paragraphs", [])?;
        for paragraph in &doc.paragraphs {
            let guid = guid_or_new(&paragraph.guid);
            w.start("paragraph", [("guid", guid.as_str())])?;
            w.start("phrases", [])?;
            for phrase in &paragraph.phrases {
                write_phrase(&mut w, phrase, lang)?;
            }
            w.end("phrases")?;
            w.end("paragraph")?;
        }
        w.end("paragraphs")?;
    }

    if !doc.languages.is_empty() {
        w.start("languages", [])?;
        for language in &doc.languages {
            let mut attributes = vec![("lang", language.lang.as_str())];
            if let Some(font) = &language.font {
                attributes.push(("font", font.as_str()));
            }
            if language.vernacular {
                attributes.push(("vernacular", "true"));
            }
            w.empty("language", attributes)?;
        }
        w.end("languages")?;
    }
    if let Some(media_files) = &doc.media_files {
        write_media_files(&mut w, media_files)?;
    }

    w.end("interlinear-text")?;
    w.end("document")?;
    w.finish()
}

fn guid_or_new(guid: &Option<String>) -> String {
    guid.clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn write_phrase(w: &mut XmlWriter, phrase: &Phrase, lang: &str) -> Result<(), FormatError> {
    let guid = guid_or_new(&phrase.guid);
    let mut attributes = vec![("guid", guid.as_str())];
    let optional = [
        ("begin-time-offset", &phrase.begin_offset),
        ("end-time-offset", &phrase.end_offset),
        ("speaker", &phrase.speaker),
        ("media-file", &phrase.media_file),
    ];
    attributes.extend(
        optional
            .iter()
            .filter_map(|(name, value)| value.as_deref().map(|v| (*name, v))),
    );
    w.start("phrase", attributes)?;

    if let Some(segnum) = &phrase.segnum {
        w.text_element("item", [("type", "segnum"), ("lang", lang)], segnum)?;
    }
    if !phrase.words.is_empty() {
        w.start("words", [])?;
        for word in &phrase.words {
            write_word(w, word, lang)?;
        }
        w.end("words")?;
    }
    for note in &phrase.notes {
        if let Note::Translation { lang, text } = note {
            w.text_element("item", [("type", "gls"), ("lang", lang.as_str())], text)?;
        }
    }
    for text in phrase.notes.iter().filter_map(Note::note_text) {
        if !text.is_empty() {
            w.text_element("item", [("type", "note"), ("lang", lang)], &text)?;
        }
    }
    w.end("phrase")
}

fn write_word(w: &mut XmlWriter, word: &Word, lang: &str) -> Result<(), FormatError> {
    let guid = guid_or_new(&word.guid);
    w.start("word", [("guid", guid.as_str())])?;
    for form in &word.forms {
        w.text_element(
            "item",
            [("type", form.kind.as_str()), ("lang", form.lang.as_str())],
            &form.text,
        )?;
    }
    if !word.morphs.is_empty() {
        w.start("morphemes", [])?;
        for morph in &word.morphs {
            write_morph(w, morph)?;
        }
        w.end("morphemes")?;
    }
    if let Some(gloss) = &word.gloss {
        w.text_element("item", [("type", "gls"), ("lang", lang)], gloss)?;
    }
    if let Some(pos) = &word.pos {
        w.text_element("item", [("type", "pos"), ("lang", lang)], pos)?;
    }
    w.end("word")
}

fn write_morph(w: &mut XmlWriter, morph: &Morph) -> Result<(), FormatError> {
    let guid = guid_or_new(&morph.guid);
    let mut attributes = Vec::with_capacity(2);
    if let Some(kind) = &morph.kind {
        attributes.push(("type", kind.as_str()));
    }
    attributes.push(("guid", guid.as_str()));
    w.start("morph", attributes)?;
    for item in morph.items.iter().filter(|i| i.field != MorphField::MorphType) {
        let mut attributes = vec![("type", item.field.key())];
        if let Some(lang) = &item.lang {
            attributes.push(("lang", lang.as_str()));
        }
        w.text_element("item", attributes, &item.text)?;
    }
    w.end("morph")
}

fn write_media_files(w: &mut XmlWriter, media_files: &MediaFiles) -> Result<(), FormatError> {
    w.start("media-files", [("offset-type", media_files.offset_type.as_str())])?;
    for media in &media_files.media {
        w.empty(
            "media",
            [("guid", media.guid.as_str()), ("location", media.location.as_str())],
        )?;
    }
    w.end("media-files")
}
