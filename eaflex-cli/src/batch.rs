//! `eaflex batch`: converts every document listed under `[batch]`.
//!
//! Outputs land next to their inputs: `<eaf stem>-elan_export.flextext` for
//! `[[batch.to_flextext]]` entries, `<original eaf stem>-flex_export.eaf` for
//! `[[batch.to_eaf]]` entries. Relative paths resolve against the working
//! directory. A failing document does not stop the run.

use eaflex_babel::transforms::{eaf_to_flextext, flextext_to_eaf};
use eaflex_babel::ConversionSettings;
use eaflex_config::{BatchConfig, ToEafJob, ToFlexTextJob};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const FLEXTEXT_SUFFIX: &str = "-elan_export.flextext";
pub const EAF_SUFFIX: &str = "-flex_export.eaf";

#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    /// Input path and error message per failed document
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len()
    }
}

pub fn run_batch(batch: &BatchConfig, settings: &ConversionSettings) -> BatchReport {
    let mut report = BatchReport::default();
    for job in &batch.to_flextext {
        match to_flextext(job, settings) {
            Ok(path) => report.written.push(path),
            Err(e) => report.failed.push((job.eaf.clone(), e)),
        }
    }
    for job in &batch.to_eaf {
        match to_eaf(job, settings) {
            Ok(path) => report.written.push(path),
            Err(e) => report.failed.push((job.flextext.clone(), e)),
        }
    }
    report
}

fn to_flextext(job: &ToFlexTextJob, settings: &ConversionSettings) -> Result<PathBuf, String> {
    let source = read(&job.eaf)?;
    let title = file_stem(&job.eaf);
    let flextext = eaf_to_flextext(&source, settings, Some(&title)).map_err(|e| e.to_string())?;
    let out = sibling(&job.eaf, FLEXTEXT_SUFFIX);
    write(&out, &flextext)?;
    info!(input = %job.eaf.display(), output = %out.display(), "converted to flextext");
    Ok(out)
}

fn to_eaf(job: &ToEafJob, settings: &ConversionSettings) -> Result<PathBuf, String> {
    let flextext = read(&job.flextext)?;
    let original = read(&job.original_eaf)?;
    let export = flextext_to_eaf(&flextext, &original, settings).map_err(|e| e.to_string())?;
    let out = sibling(&job.original_eaf, EAF_SUFFIX);
    write(&out, &export.document)?;
    info!(
        input = %job.flextext.display(),
        output = %out.display(),
        segments = export.segments.len(),
        "converted to eaf"
    );
    Ok(out)
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Error reading file '{}': {e}", path.display()))
}

fn write(path: &Path, contents: &str) -> Result<(), String> {
    fs::write(path, contents).map_err(|e| format!("Error writing file '{}': {e}", path.display()))
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `dir/<stem><suffix>` for an input at `dir/<stem>.<ext>`.
pub fn sibling(input: &Path, suffix: &str) -> PathBuf {
    input.with_file_name(format!("{}{suffix}", file_stem(input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outputs_sit_next_to_inputs() {
        assert_eq!(
            sibling(Path::new("corpus/session 1.eaf"), FLEXTEXT_SUFFIX),
            PathBuf::from("corpus/session 1-elan_export.flextext")
        );
        assert_eq!(
            sibling(Path::new("session.eaf"), EAF_SUFFIX),
            PathBuf::from("session-flex_export.eaf")
        );
    }

    #[test]
    fn test_missing_inputs_are_reported_not_fatal() {
        let batch = BatchConfig {
            to_flextext: vec![ToFlexTextJob {
                eaf: PathBuf::from("does/not/exist.eaf"),
            }],
            to_eaf: vec![ToEafJob {
                flextext: PathBuf::from("does/not/exist.flextext"),
                original_eaf: PathBuf::from("does/not/exist.eaf"),
            }],
        };
        let report = run_batch(&batch, &ConversionSettings::new("ain", "ain-x-child"));
        assert!(report.written.is_empty());
        assert_eq!(report.total(), 2);
        assert!(report.failed[0].1.contains("does/not/exist.eaf"));
    }
}
