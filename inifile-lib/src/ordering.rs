//! The canonical order of entries, shared by listing and serialization.
//!
//! Global entries come first, then named sections. Section names and keys compare
//! case-insensitively; an empty key sorts before any other key of its section.

use std::{borrow::Borrow, cmp::Ordering};

use crate::models::{IniEntry, SectionId};

pub fn compare_entries(a: &IniEntry, b: &IniEntry) -> Ordering {
    match (a.section(), b.section()) {
        (SectionId::Global, SectionId::Global) => compare_ignore_case(a.key(), b.key()),
        (SectionId::Global, SectionId::Named(_)) => Ordering::Less,
        (SectionId::Named(_), SectionId::Global) => Ordering::Greater,
        (SectionId::Named(section_a), SectionId::Named(section_b)) => {
            compare_ignore_case(section_a, section_b).then_with(|| compare_ignore_case(a.key(), b.key()))
        }
    }
}

pub fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Stable sort, so entries that compare equal keep their relative order.
pub fn sort_entries<E: Borrow<IniEntry>>(entries: &mut [E]) {
    entries.sort_by(|a, b| compare_entries(a.borrow(), b.borrow()));
}
