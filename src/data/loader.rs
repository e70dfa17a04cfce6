// ============================================================
// Layer 4 - Split File Loader
// ============================================================
// Reads labelled tweets from split files on disk.
//
// Four layouts are understood, picked by file extension:
//
//   .parquet         columns `text` (string) and `label`
//                    (int64 class id or string)
//   .jsonl / .json   {"text": "i feel great", "label": "joy"}
//                    {"text": "i feel great", "label": 1}
//   .csv             text,label
//                    i feel great,joy
//   .txt             i feel great;joy
//
// The three text layouts may also be gzip-compressed with a
// trailing .gz (train.jsonl.gz).
//
// Integer labels are resolved through the canonical emotion
// order in domain::tweet. Blank lines are skipped; anything
// else that cannot be parsed is an error naming file and line
// (row number for parquet).

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use parquet::{
    file::reader::{FileReader, SerializedFileReader},
    record::Field,
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::domain::traits::TweetSource;
use crate::domain::tweet::{emotion_name, Split, Tweet};
use crate::error::EmotionError;

// ─── File names per split ────────────────────────────────────────────────────
// Defaults follow the layout published for dair-ai/emotion.
pub const DEFAULT_TRAIN_FILE:      &str = "split/train-00000-of-00001.parquet";
pub const DEFAULT_VALIDATION_FILE: &str = "split/validation-00000-of-00001.parquet";
pub const DEFAULT_TEST_FILE:       &str = "split/test-00000-of-00001.parquet";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitFiles {
    pub train:      String,
    pub validation: String,
    pub test:       String,
}

impl SplitFiles {
    pub fn for_split(&self, split: Split) -> &str {
        match split {
            Split::Train      => &self.train,
            Split::Validation => &self.validation,
            Split::Test       => &self.test,
        }
    }
}

impl Default for SplitFiles {
    fn default() -> Self {
        Self {
            train:      DEFAULT_TRAIN_FILE.to_string(),
            validation: DEFAULT_VALIDATION_FILE.to_string(),
            test:       DEFAULT_TEST_FILE.to_string(),
        }
    }
}

// ─── Formats ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Parquet,
    JsonLines,
    Csv,
    Semicolon,
}

impl FileFormat {
    /// Format of the file, looking through a trailing `.gz`.
    pub fn from_path(path: &Path) -> Result<Self, EmotionError> {
        let inner = if is_gzip(path) { Path::new(path.file_stem().unwrap_or_default()) } else { path };
        let format = match inner.extension().and_then(|e| e.to_str()) {
            Some("parquet")              => FileFormat::Parquet,
            Some("jsonl") | Some("json") => FileFormat::JsonLines,
            Some("csv")                  => FileFormat::Csv,
            Some("txt")                  => FileFormat::Semicolon,
            other => {
                return Err(EmotionError::InvalidConfig(format!(
                    "unsupported dataset file extension {:?} for '{}'",
                    other,
                    path.display()
                )))
            }
        };
        if format == FileFormat::Parquet && inner != path {
            return Err(EmotionError::InvalidConfig(format!(
                "parquet files are compressed internally, '{}' cannot be gzipped",
                path.display()
            )));
        }
        Ok(format)
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("gz")
}

#[derive(Deserialize)]
struct RawRecord {
    text:  String,
    label: RawLabel,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Id(usize),
    Name(String),
}

/// Turn a label field into an emotion name.
/// Purely numeric fields are treated as canonical class ids.
fn resolve_label(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty label".to_string());
    }
    match raw.parse::<usize>() {
        Ok(id) => resolve_label_id(id),
        Err(_) => Ok(raw.to_string()),
    }
}

fn resolve_label_id(id: usize) -> Result<String, String> {
    emotion_name(id)
        .map(str::to_string)
        .ok_or_else(|| format!("label id {id} has no emotion name"))
}

fn resolve_signed_label_id(id: i64) -> Result<String, String> {
    usize::try_from(id)
        .map_err(|_| format!("negative label id {id}"))
        .and_then(resolve_label_id)
}

/// Parse every row of a parquet file. `name` is only used in error messages.
pub fn parse_parquet(file: File, name: &str) -> Result<Vec<Tweet>, EmotionError> {
    let malformed = |row: usize, reason: String| EmotionError::MalformedRecord {
        file: name.to_string(),
        line: row,
        reason,
    };

    let reader = SerializedFileReader::new(file).map_err(|e| malformed(0, e.to_string()))?;
    let rows = reader.get_row_iter(None).map_err(|e| malformed(0, e.to_string()))?;

    let mut tweets = Vec::new();
    for (i, row) in rows.enumerate() {
        let row = row.map_err(|e| malformed(i + 1, e.to_string()))?;
        let mut text  = None;
        let mut label = None;
        for (column, field) in row.get_column_iter() {
            match (column.as_str(), field) {
                ("text", Field::Str(s))    => text = Some(s.clone()),
                ("label", Field::Str(s))   => label = Some(resolve_label(s)),
                ("label", Field::Long(id)) => label = Some(resolve_signed_label_id(*id)),
                ("label", Field::Int(id))  => label = Some(resolve_signed_label_id(i64::from(*id))),
                ("text", _) | ("label", _) => {
                    return Err(malformed(i + 1, format!("unexpected value {field} in column '{column}'")))
                }
                _ => {}
            }
        }
        let text  = text.ok_or_else(|| malformed(i + 1, "missing 'text' column".to_string()))?;
        let label = label
            .ok_or_else(|| malformed(i + 1, "missing 'label' column".to_string()))?
            .map_err(|e| malformed(i + 1, e))?;
        tweets.push(Tweet::new(text, label));
    }
    Ok(tweets)
}

/// Parse every record from `reader`. `file` is only used in error messages.
pub fn parse_records<R: BufRead>(
    reader: R,
    format: FileFormat,
    file:   &str,
) -> Result<Vec<Tweet>, EmotionError> {
    let malformed = |line: usize, reason: String| EmotionError::MalformedRecord {
        file: file.to_string(),
        line,
        reason,
    };

    match format {
        FileFormat::Parquet => Err(malformed(0, "parquet is not a line based format".to_string())),

        FileFormat::JsonLines => {
            let mut tweets = Vec::new();
            for (i, line) in reader.lines().enumerate() {
                let line = line.map_err(|e| malformed(i + 1, e.to_string()))?;
                if line.trim().is_empty() {
                    continue;
                }
                let raw: RawRecord = serde_json::from_str(&line)
                    .map_err(|e| malformed(i + 1, e.to_string()))?;
                let label = match raw.label {
                    RawLabel::Id(id)     => resolve_label_id(id),
                    RawLabel::Name(name) => resolve_label(&name),
                }
                .map_err(|e| malformed(i + 1, e))?;
                tweets.push(Tweet::new(raw.text, label));
            }
            Ok(tweets)
        }

        FileFormat::Csv => {
            let mut rdr = csv::Reader::from_reader(reader);
            let headers = rdr
                .headers()
                .map_err(|e| malformed(1, e.to_string()))?
                .clone();
            let column = |name: &str| {
                headers
                    .iter()
                    .position(|h| h.trim() == name)
                    .ok_or_else(|| malformed(1, format!("missing '{name}' column")))
            };
            let text_col  = column("text")?;
            let label_col = column("label")?;

            let mut tweets = Vec::new();
            for record in rdr.records() {
                let record = record.map_err(|e| {
                    let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                    malformed(line, e.to_string())
                })?;
                let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
                let text = record
                    .get(text_col)
                    .ok_or_else(|| malformed(line, "missing text field".to_string()))?;
                let label = record
                    .get(label_col)
                    .ok_or_else(|| malformed(line, "missing label field".to_string()))?;
                let label = resolve_label(label).map_err(|e| malformed(line, e))?;
                tweets.push(Tweet::new(text, label));
            }
            Ok(tweets)
        }

        FileFormat::Semicolon => {
            let mut tweets = Vec::new();
            for (i, line) in reader.lines().enumerate() {
                let line = line.map_err(|e| malformed(i + 1, e.to_string()))?;
                if line.trim().is_empty() {
                    continue;
                }
                // The text may itself contain ';', the label never does
                let (text, label) = line
                    .rsplit_once(';')
                    .ok_or_else(|| malformed(i + 1, "expected 'text;label'".to_string()))?;
                let label = resolve_label(label).map_err(|e| malformed(i + 1, e))?;
                tweets.push(Tweet::new(text, label));
            }
            Ok(tweets)
        }
    }
}

/// Open and parse one split file.
pub fn read_split_file(path: &Path) -> Result<Vec<Tweet>> {
    let format = FileFormat::from_path(path)?;
    let name = path.display().to_string();
    let file = File::open(path)
        .with_context(|| format!("Cannot open dataset file '{}'", path.display()))?;

    let tweets = match format {
        FileFormat::Parquet          => parse_parquet(file, &name)?,
        _ if is_gzip(path)           => parse_records(BufReader::new(GzDecoder::new(file)), format, &name)?,
        _                            => parse_records(BufReader::new(file), format, &name)?,
    };
    tracing::debug!("Parsed {} records from '{}'", tweets.len(), path.display());
    Ok(tweets)
}

// ─── LocalSource ─────────────────────────────────────────────────────────────
/// Split files living in one directory.
pub struct LocalSource {
    dir:   PathBuf,
    files: SplitFiles,
}

impl LocalSource {
    pub fn new(dir: impl Into<PathBuf>, files: SplitFiles) -> Self {
        Self { dir: dir.into(), files }
    }
}

impl TweetSource for LocalSource {
    fn load_split(&self, split: Split) -> Result<Option<Vec<Tweet>>> {
        let path = self.dir.join(self.files.for_split(split));
        if !path.exists() {
            tracing::warn!("No {} split at '{}'", split, path.display());
            return Ok(None);
        }
        read_split_file(&path).map(Some)
    }

    fn describe(&self) -> String {
        format!("directory '{}'", self.dir.display())
    }
}
