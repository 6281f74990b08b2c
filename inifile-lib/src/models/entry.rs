use std::fmt::Display;

use crate::models::SectionId;

/// One configuration datum: a key/value pair, the section it lives in and the comment lines that
/// preceded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniEntry {
    pub(crate) section: SectionId,
    pub(crate) key: String,
    pub(crate) value: String,
    pub(crate) comment: Option<String>,
}

impl IniEntry {
    pub fn new(section: impl Into<SectionId>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
            value: value.into(),
            comment: None,
        }
    }

    /// Attaches a comment. Multiple comment lines are separated by `\n`.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn section(&self) -> &SectionId {
        &self.section
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

impl Display for IniEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}
