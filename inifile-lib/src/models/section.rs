use std::collections::HashMap;

use crate::models::entry::IniEntry;
use crate::ordering;

/// The key map of a single section. Keys are unique; inserting an existing key replaces its entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IniSection {
    pub(crate) entries: HashMap<String, IniEntry>,
}

impl IniSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_value_by_key(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(IniEntry::value)
    }

    pub fn get_entry(&self, key: &str) -> Option<&IniEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_map(&self) -> &HashMap<String, IniEntry> {
        &self.entries
    }

    /// All entries of the section, sorted by key.
    pub fn entries(&self) -> Vec<&IniEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        ordering::sort_entries(&mut entries);
        entries
    }

    pub(crate) fn insert(&mut self, entry: IniEntry) -> Option<IniEntry> {
        self.entries.insert(entry.key.clone(), entry)
    }
}
