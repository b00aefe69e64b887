//! The demo form: declared fields, submitted data, validation and
//! rendering.

pub mod fields;
pub mod submission;
pub mod validation;
pub mod render;

/// Where the form is shown (GET) and submitted to (POST).
pub const FORM_PATH: &str = "/form";
