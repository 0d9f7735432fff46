use std::collections::hash_map;
use std::collections::HashMap;
use std::str::FromStr;

use super::{parser, Entries, EntryKey, EntryValue, SectionKey};

/// Sections of a parsed INI document, each with its `key=value` entries.
///
/// Sections and keys are unique. Their order is not preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    pub(crate) sections: HashMap<SectionKey, Entries>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            sections: Default::default(),
        }
    }

    /// Makes sure section `name` exists, even if it stays empty
    pub(crate) fn ensure_section(&mut self, name: &str) -> &mut Entries {
        self.sections.entry(name.to_owned()).or_default()
    }

    /// Sets `key=value` in `section`, replacing any previous value of `key`
    pub(crate) fn insert<S, K, V>(&mut self, section: S, key: K, value: V)
    where
        S: Into<SectionKey>,
        K: Into<EntryKey>,
        V: Into<EntryValue>,
    {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn has_key(&self, section: &str, key: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|e| e.contains_key(key))
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Parse `data` with the default [`parser::ParserConfig`]
    pub fn load_from_str(data: &str) -> Result<Self, parser::ParseError> {
        parser::Parser::new(&parser::ParserConfig::default()).parse(data)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, SectionKey, Entries> {
        self.sections.iter()
    }

    pub fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|e| e.get(key))
            .map(String::as_str)
    }

    pub fn section(&self, name: &str) -> Option<&Entries> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

impl FromStr for Document {
    type Err = parser::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::load_from_str(s)
    }
}

impl From<HashMap<SectionKey, Entries>> for Document {
    fn from(sections: HashMap<SectionKey, Entries>) -> Self {
        Self { sections }
    }
}

impl From<Document> for HashMap<SectionKey, Entries> {
    fn from(doc: Document) -> Self {
        doc.sections
    }
}

impl FromIterator<(SectionKey, Entries)> for Document {
    fn from_iter<T: IntoIterator<Item = (SectionKey, Entries)>>(iter: T) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (SectionKey, Entries);
    type IntoIter = hash_map::IntoIter<SectionKey, Entries>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a SectionKey, &'a Entries);
    type IntoIter = hash_map::Iter<'a, SectionKey, Entries>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
