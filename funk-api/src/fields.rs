use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A decoded form value: plain text, or the path an uploaded file was stored at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File(PathBuf),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            FieldValue::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&Path> {
        match self {
            FieldValue::File(p) => Some(p.as_path()),
            FieldValue::Text(_) => None,
        }
    }
}

/// Insertion-ordered field mapping with first-write-wins semantics.
///
/// There is deliberately no `insert`/`get_mut`: once a name is present its
/// value never changes, later duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, FieldValue)>,
    // name -> position in `entries`
    index: HashMap<String, usize>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` (and drops `value`) when `name` is already present.
    pub fn insert_if_absent(&mut self, name: impl Into<String>, value: FieldValue) -> bool {
        let name = name.into();
        if self.index.contains_key(&name) {
            return false;
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        true
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn file(&self, name: &str) -> Option<&Path> {
        self.get(name).and_then(FieldValue::as_file)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(feature = "json")]
impl serde::Serialize for FieldValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::File(p) => serializer.serialize_str(&p.to_string_lossy()),
        }
    }
}

#[cfg(feature = "json")]
impl serde::Serialize for FieldMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_wins() {
        let mut m = FieldMap::new();
        assert!(m.insert_if_absent("a", FieldValue::Text("1".into())));
        assert!(!m.insert_if_absent("a", FieldValue::Text("2".into())));
        assert!(m.insert_if_absent("b", FieldValue::File("/tmp/x.png".into())));
        assert_eq!(m.len(), 2);
        assert_eq!(m.text("a"), Some("1"));
        assert_eq!(m.file("b"), Some(Path::new("/tmp/x.png")));
        assert_eq!(m.text("b"), None);
    }

    #[test]
    fn keeps_insertion_order() {
        let mut m = FieldMap::new();
        for k in ["z", "a", "m", "a"] {
            m.insert_if_absent(k, FieldValue::Text(k.to_uppercase()));
        }
        let keys: Vec<_> = m.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(m.text("a"), Some("A"));
    }

    #[test]
    fn many_distinct_names_insert_quickly() {
        let mut m = FieldMap::new();
        let started = std::time::Instant::now();
        for i in 0..100_000 {
            assert!(m.insert_if_absent(format!("k{i}"), FieldValue::Text(String::new())));
        }
        assert!(!m.insert_if_absent("k99999", FieldValue::Text("late".into())));
        assert_eq!(m.len(), 100_000);
        assert_eq!(m.text("k50000"), Some(""));
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }
}
