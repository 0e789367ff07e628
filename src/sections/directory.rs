//! Static section directory and section-name spelling variants.
//!
//! The same section is referenced as `Fitness - Steps` by some callers and
//! `Fitness – Steps` (en dash) by others. Lookups try the exact name, then
//! the ASCII-hyphen spelling, then the en-dash spelling.

use std::collections::HashMap;

use crate::pipeline::types::Category;

/// Extended dash used in section names.
pub const EN_DASH: char = '\u{2013}';

/// Also accepted on input and folded to a hyphen.
pub const EM_DASH: char = '\u{2014}';

/// Name with every extended dash replaced by `-`.
pub fn hyphen_variant(name: &str) -> String {
    name.replace([EN_DASH, EM_DASH], "-")
}

/// Name with every `-` replaced by an en dash.
pub fn dash_variant(name: &str) -> String {
    hyphen_variant(name).replace('-', &EN_DASH.to_string())
}

/// Exact, hyphen, and en-dash spellings, without duplicates, in lookup order.
pub fn name_variants(name: &str) -> Vec<String> {
    let exact = name.trim().to_string();
    let mut variants = vec![exact.clone()];
    for candidate in [hyphen_variant(&exact), dash_variant(&exact)] {
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

/// Look `name` up in `map` under each spelling variant.
pub fn lookup_variants<'a>(map: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    name_variants(name)
        .iter()
        .find_map(|variant| map.get(variant))
        .map(String::as_str)
}

/// Hand-curated name → section id table, fixed at start-up.
#[derive(Debug, Clone, Default)]
pub struct SectionDirectory {
    entries: HashMap<String, String>,
}

impl SectionDirectory {
    /// Keys are stored under their hyphen spelling.
    pub fn new(entries: HashMap<String, String>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(name, id)| (hyphen_variant(name.trim()), id))
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        lookup_variants(&self.entries, name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Categories whose section has no static entry (served by heal only).
    pub fn missing_categories(&self) -> Vec<Category> {
        Category::ALL
            .iter()
            .copied()
            .filter(|c| self.get(c.section_name()).is_none())
            .collect()
    }
}

impl FromIterator<(String, String)> for SectionDirectory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
