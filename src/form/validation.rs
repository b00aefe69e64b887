//! Checking a submission against the declared fields.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::form::fields::FieldSpec;
use crate::form::submission::SubmissionRecord;

/// One field failing its rule. `field` is always the name of a
/// declared `FieldSpec`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: &'static str,
}

/// Values of exactly the declared fields, in declaration order, each
/// having passed its rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRecord {
    fields: Vec<(&'static str, String)>,
}

impl ValidRecord {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(name, value)| (*name, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// A JSON object with the fields in declaration order.
impl Serialize for ValidRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid(ValidRecord),
    Invalid {
        /// One per failing field, in declaration order.
        issues: Vec<ValidationIssue>,
        /// What was posted, for re-display.
        submitted: SubmissionRecord,
    },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        match self {
            ValidationResult::Valid(_) => true,
            ValidationResult::Invalid { .. } => false,
        }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            ValidationResult::Valid(_) => &[],
            ValidationResult::Invalid { issues, .. } => issues,
        }
    }
}

/// Apply each field's rule, in declaration order, to the submitted
/// value (empty if absent). All failing fields are reported.
pub fn validate(
    record: &SubmissionRecord,
    fields: &'static [FieldSpec]
) -> ValidationResult {
    let mut issues = Vec::new();
    let mut valid = Vec::with_capacity(fields.len());
    for field in fields {
        let value = record.value_or_empty(field.name);
        if field.check(value) {
            valid.push((field.name, value.to_string()));
        } else {
            issues.push(ValidationIssue {
                field: field.name,
                message: field.message,
            });
        }
    }
    if issues.is_empty() {
        ValidationResult::Valid(ValidRecord { fields: valid })
    } else {
        ValidationResult::Invalid {
            issues,
            submitted: record.clone(),
        }
    }
}

/// The issue reported for `field`, if any. Linear, the list is never
/// longer than the number of declared fields.
pub fn issue_for<'i>(issues: &'i [ValidationIssue], field: &str) -> Option<&'i ValidationIssue> {
    issues.iter().find(|issue| issue.field == field)
}
