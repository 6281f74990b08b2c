use crate::models::{IniDocument, IniEntry, SectionId};

#[derive(Debug, Default)]
pub struct IniDocumentBuilder {
    document: IniDocument,
}

impl IniDocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a named section. Opening a section that already exists keeps its entries.
    pub fn new_section(mut self, name: &str) -> Self {
        self.document.section_mut(&SectionId::named(name));
        self
    }

    /// Adds an entry to its section, replacing any entry with the same key in that section.
    pub fn add_entry(mut self, entry: IniEntry) -> Self {
        if let Some(replaced) = self.document.section_mut(&entry.section).insert(entry) {
            log::debug!("Overwriting {} {}={}", replaced.section, replaced.key, replaced.value);
        }
        self
    }

    pub fn add_key_value_pair(self, section: Option<&str>, key: &str, value: &str) -> Self {
        self.add_entry(IniEntry::new(section, key, value))
    }

    pub fn build(self) -> IniDocument {
        self.document
    }
}
