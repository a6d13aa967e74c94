use regex::Regex;
use std::collections::btree_map;
use std::collections::{BTreeMap, HashMap};

/// Attribute name to values. Names are stored lowercased; values are always
/// an ordered list, even for single-valued attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: BTreeMap<String, Vec<String>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&name.to_ascii_lowercase())
    }

    /// Replaces any existing values of `name`.
    pub fn insert(&mut self, name: &str, values: Vec<String>) {
        self.values.insert(name.to_ascii_lowercase(), values);
    }

    /// Appends one value, creating the attribute when needed.
    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        self.values
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.values.remove(&name.to_ascii_lowercase())
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &mut Vec<String>) -> bool) {
        self.values.retain(|name, values| keep(name, values));
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.values.iter()
    }

    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, String, Vec<String>> {
        self.values.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Vec<String>)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (S, Vec<String>)>>(iter: T) -> Self {
        let mut attrs = Attributes::new();
        for (name, values) in iter {
            attrs.insert(name.as_ref(), values);
        }
        attrs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdifEntry {
    pub dn: String,
    pub attributes: Attributes,
}

impl LdifEntry {
    pub fn new(dn: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            dn: dn.into(),
            attributes,
        }
    }

    pub fn object_classes(&self) -> &[String] {
        self.attributes.get("objectclass").unwrap_or(&[])
    }

    pub fn has_object_class(&self, class: &str) -> bool {
        self.object_classes()
            .iter()
            .any(|c| c.eq_ignore_ascii_case(class))
    }
}

/// The entries of one LDIF document in first-seen order, keyed by DN.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    entries: Vec<LdifEntry>,
    index: HashMap<String, usize>,
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Dataset {}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry`, replacing an existing entry with the same DN in place.
    pub fn insert(&mut self, entry: LdifEntry) {
        match self.index.get(&entry.dn) {
            Some(&position) => self.entries[position] = entry,
            None => {
                self.index.insert(entry.dn.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, dn: &str) -> Option<&LdifEntry> {
        self.index.get(dn).map(|&position| &self.entries[position])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LdifEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Dataset {
    type Item = LdifEntry;
    type IntoIter = std::vec::IntoIter<LdifEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a LdifEntry;
    type IntoIter = std::slice::Iter<'a, LdifEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<LdifEntry> for Dataset {
    fn from_iter<T: IntoIterator<Item = LdifEntry>>(iter: T) -> Self {
        let mut dataset = Dataset::new();
        for entry in iter {
            dataset.insert(entry);
        }
        dataset
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub dataset: Dataset,
    pub base_dn: String,
    pub users: usize,
    pub groups: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub enum HostMatcher {
    Literal(String),
    Pattern(Regex),
}

impl HostMatcher {
    pub fn matches(&self, hostname: &str) -> bool {
        match self {
            HostMatcher::Literal(name) => name == hostname,
            HostMatcher::Pattern(re) => re.is_match(hostname),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub matcher: HostMatcher,
    pub environment: String,
}
