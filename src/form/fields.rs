//! Field declarations and their rules.

use std::fmt::Debug;

use lazy_static::lazy_static;
use regex::Regex;

pub type Rule = fn(&str) -> bool;

/// One declared form field: its name in the submission, the label
/// shown next to the input, the rule the submitted value must
/// satisfy, and the message shown when it doesn't.
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub rule: Rule,
    pub message: &'static str,
}

impl FieldSpec {
    pub fn check(&self, value: &str) -> bool {
        (self.rule)(value)
    }
}

// Can't derive, fn pointers with reference arguments don't
// implement Debug everywhere.
impl Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("message", &self.message)
            .finish()
    }
}

lazy_static! {
    // Case insensitive. Local part: may not start with a dot, may not
    // contain two dots in a row (both checked in `well_formed_email`
    // as the regex crate has no lookahead), and must end with a
    // character other than a dot or apostrophe. Domain: labels
    // starting with an alphanumeric, then a TLD of at least 2 letters.
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$"
    ).expect("valid regex");
}

/// Fails on the empty string and on whitespace only.
pub fn non_empty_trimmed(s: &str) -> bool {
    ! s.trim().is_empty()
}

pub fn well_formed_email(s: &str) -> bool {
    ! s.starts_with('.')
        && ! s.contains("..")
        && EMAIL_REGEX.is_match(s)
}

/// The fields of the demo form, in the order they are validated
/// and shown.
pub static FORM_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        label: "Name:",
        rule: non_empty_trimmed,
        message: "Name required!",
    },
    FieldSpec {
        name: "email",
        label: "Email:",
        rule: well_formed_email,
        message: "Email required!",
    },
];
