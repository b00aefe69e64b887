use std::collections::BTreeMap;

/// The raw field values of one form post, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRecord {
    values: BTreeMap<String, String>,
}

impl SubmissionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// For keys given more than once, the last value wins.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where K: Into<String>,
          V: Into<String>
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.insert(k, v);
        }
        record
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Missing fields read as the empty string.
    pub fn value_or_empty(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
