use std::{collections::HashMap, fmt::Display};

use crate::models::{IniEntry, IniSection, SectionId};
use crate::{ordering, writer};

/// A fully parsed ini file.
///
/// The global section only exists when at least one key/value line appeared before the first
/// `[name]` header. Named sections exist as soon as their header was seen, even when empty.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IniDocument {
    pub(crate) global_section: Option<IniSection>,
    pub(crate) sections: HashMap<String, IniSection>,
}

impl IniDocument {
    pub fn get_global_section(&self) -> Option<&IniSection> {
        self.global_section.as_ref()
    }

    pub fn get_section_by_name(&self, name: &str) -> Option<&IniSection> {
        self.sections.get(name)
    }

    /// Looks up a section, `None` meaning the global section.
    pub fn get_section(&self, section: Option<&str>) -> Option<&IniSection> {
        match section {
            None => self.get_global_section(),
            Some(name) => self.get_section_by_name(name),
        }
    }

    pub fn contains_section(&self, section: Option<&str>) -> bool {
        self.get_section(section).is_some()
    }

    pub fn contains_key(&self, section: Option<&str>, key: &str) -> bool {
        self.get_section(section).is_some_and(|section| section.contains_key(key))
    }

    pub fn get_value(&self, section: Option<&str>, key: &str) -> Option<&str> {
        self.get_section(section)?.get_value_by_key(key)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.global_section.is_none() && self.sections.is_empty()
    }

    /// Every entry of the document, global entries first, then by section and key.
    pub fn entries(&self) -> Vec<&IniEntry> {
        let mut entries: Vec<_> = self
            .global_section
            .iter()
            .chain(self.sections.values())
            .flat_map(|section| section.entries.values())
            .collect();
        ordering::sort_entries(&mut entries);
        entries
    }

    pub(crate) fn section_mut(&mut self, id: &SectionId) -> &mut IniSection {
        match id {
            SectionId::Global => self.global_section.get_or_insert_with(IniSection::new),
            SectionId::Named(name) => self.sections.entry(name.clone()).or_default(),
        }
    }
}

impl Display for IniDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writer::write_entries(f, self.entries())
    }
}

#[cfg(test)]
mod tests {
    use crate::IniDocumentBuilder;
    use crate::models::{IniEntry, SectionId};

    #[test]
    fn lookups_distinguish_global_and_named_sections() {
        let document = IniDocumentBuilder::new()
            .add_key_value_pair(None, "name", "global")
            .add_key_value_pair(Some("server"), "name", "named")
            .new_section("empty")
            .build();

        assert_eq!(document.get_value(None, "name"), Some("global"));
        assert_eq!(document.get_value(Some("server"), "name"), Some("named"));
        assert_eq!(document.get_value(Some("server"), "missing"), None);
        assert_eq!(document.get_value(Some("missing"), "name"), None);

        assert!(document.contains_section(Some("empty")));
        assert!(document.get_section_by_name("empty").unwrap().is_empty());
        assert!(!document.contains_key(Some("empty"), "name"));
        assert!(document.contains_key(None, "name"));
    }

    #[test]
    fn section_names_list_named_sections_only() {
        let document = IniDocumentBuilder::new()
            .add_key_value_pair(None, "top", "1")
            .add_key_value_pair(Some("db"), "url", "localhost")
            .new_section("empty")
            .build();

        let mut names: Vec<_> = document.section_names().collect();
        names.sort_unstable();

        assert_eq!(names, ["db", "empty"]);
        assert!(!document.is_empty());
        assert!(IniDocumentBuilder::new().build().is_empty());
    }

    #[test]
    fn entries_are_flattened_in_canonical_order() {
        let document = IniDocumentBuilder::new()
            .add_entry(IniEntry::new("b", "z", "1"))
            .add_entry(IniEntry::new("A", "y", "2"))
            .add_entry(IniEntry::new(SectionId::Global, "x", "3"))
            .build();

        let keys: Vec<_> = document.entries().into_iter().map(IniEntry::key).collect();

        assert_eq!(keys, ["x", "y", "z"]);
    }

    #[test]
    fn display_renders_canonical_text() {
        let document = IniDocumentBuilder::new()
            .add_entry(IniEntry::new("db", "url", "localhost").with_comment("primary"))
            .add_entry(IniEntry::new(SectionId::Global, "debug", "true"))
            .build();

        assert_eq!(document.to_string(), "debug=true\n\n[db]\n# primary\nurl=localhost\n");
    }
}
