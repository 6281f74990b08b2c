mod builders;
pub mod encoding;
pub mod loader;
pub mod models;
pub mod ordering;
pub mod writer;

use regex::{Captures, Regex};
use thiserror::Error;

pub use crate::builders::IniDocumentBuilder;
pub use crate::encoding::Encoding;
pub use crate::loader::{IniLoader, LoadError, LoadOptions, NotLoadedError};
use crate::models::{IniDocument, IniEntry, SectionId};
pub use crate::writer::{IniWriter, WriteError, WriteMode, WriteOptions};

pub const ENTRY_KEY_GROUP_NAME: &str = "key";
pub const ENTRY_VALUE_GROUP_NAME: &str = "value";
pub const SECTION_NAME_GROUP_NAME: &str = "section_name";

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Regex compilation error: {0}")]
    RegexCompilationError(#[from] regex::Error),
    #[error("The group {0} was not found in the provided regex")]
    RegexCaptureGroupNotFound(&'static str),
}

/// What a blank line does to comment lines collected before it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BlankLinePolicy {
    /// The collected comment survives and attaches to the next key/value line.
    #[default]
    KeepComment,
    /// The collected comment is dropped.
    ClearComment,
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'line> {
    Blank,
    Comment(&'line str),
    SectionHeader(&'line str),
    KeyValue { key: &'line str, value: &'line str },
    Unparsable,
}

#[derive(Debug, Default)]
enum CommentBuffer {
    #[default]
    Idle,
    Accumulating(String),
}

impl CommentBuffer {
    fn push(self, line: &str) -> Self {
        match self {
            Self::Accumulating(mut comment) if !comment.is_empty() => {
                comment.push('\n');
                comment.push_str(line);
                Self::Accumulating(comment)
            }
            _ => Self::Accumulating(line.to_owned()),
        }
    }

    fn into_comment(self) -> Option<String> {
        match self {
            Self::Idle => None,
            Self::Accumulating(comment) => Some(comment),
        }
    }
}

#[derive(Debug, Default)]
struct ParseState {
    section: SectionId,
    comment: CommentBuffer,
    document: IniDocumentBuilder,
}

impl ParseState {
    fn apply(mut self, line: Line<'_>, blank_lines: BlankLinePolicy) -> Self {
        match line {
            Line::Blank => {
                if blank_lines == BlankLinePolicy::ClearComment {
                    self.comment = CommentBuffer::Idle;
                }
            }
            Line::Comment(text) => self.comment = self.comment.push(text),
            // The pending comment is kept for the first key of the section.
            Line::SectionHeader(name) => {
                self.section = SectionId::named(name);
                self.document = self.document.new_section(name);
            }
            Line::KeyValue { key, value } => {
                let mut entry = IniEntry::new(self.section.clone(), key, value);
                entry.comment = std::mem::take(&mut self.comment).into_comment();
                self.document = self.document.add_entry(entry);
            }
            Line::Unparsable => (),
        }
        self
    }
}

struct LineClassifier {
    key_value_regex: Regex,
    section_header_regex: Regex,
}

impl LineClassifier {
    fn new() -> Result<Self, ParseError> {
        Ok(Self {
            key_value_regex: Regex::new(&format!(
                r"^(?P<{ENTRY_KEY_GROUP_NAME}>[^=]+)=(?P<{ENTRY_VALUE_GROUP_NAME}>.+)$"
            ))?,
            section_header_regex: Regex::new(&format!(r"^\[(?P<{SECTION_NAME_GROUP_NAME}>.*)\]$"))?,
        })
    }

    /// Classifies an already trimmed line. The first matching rule wins.
    fn classify<'line>(&self, line: &'line str) -> Result<Line<'line>, ParseError> {
        if line.is_empty() {
            return Ok(Line::Blank);
        }

        if let Some(comment) = line.strip_prefix('#') {
            return Ok(Line::Comment(comment.trim()));
        }

        if let Some(section_header_captures) = self.section_header_regex.captures(line) {
            let name = capture(&section_header_captures, SECTION_NAME_GROUP_NAME)?;
            return Ok(Line::SectionHeader(name));
        }

        if let Some(key_value_captures) = self.key_value_regex.captures(line) {
            let key = capture(&key_value_captures, ENTRY_KEY_GROUP_NAME)?;
            let value = capture(&key_value_captures, ENTRY_VALUE_GROUP_NAME)?;
            return Ok(Line::KeyValue { key, value });
        }

        Ok(Line::Unparsable)
    }
}

fn capture<'line>(captures: &Captures<'line>, group: &'static str) -> Result<&'line str, ParseError> {
    captures
        .name(group)
        .map(|found| found.as_str())
        .ok_or(ParseError::RegexCaptureGroupNotFound(group))
}

/// Parses ini text with the default [`BlankLinePolicy`].
pub fn parse(ini_string: &str) -> Result<IniDocument, ParseError> {
    parse_with(ini_string, BlankLinePolicy::default())
}

/// Parses ini text. Malformed lines are skipped; a later key overwrites an earlier one in the
/// same section.
pub fn parse_with(ini_string: &str, blank_lines: BlankLinePolicy) -> Result<IniDocument, ParseError> {
    let classifier = LineClassifier::new()?;

    let state = ini_string
        .lines()
        .map(str::trim)
        .try_fold(ParseState::default(), |state, line| {
            log::debug!("Parsing line: {line}");

            let classified = classifier.classify(line)?;

            match classified {
                Line::Unparsable => log::warn!("Skipping unparsable non-empty line: {line}"),
                _ => log::debug!("Line classified as {classified:?}"),
            }

            Ok::<_, ParseError>(state.apply(classified, blank_lines))
        })?;

    log::debug!("End of input reached. Building document");

    Ok(state.document.build())
}
