//! Validated schema names.
//!
//! Schema names arrive from untrusted wire input (handshake payloads and
//! in-session `USE` commands). A name must pass validation here before it is
//! ever used on an administrative connection; identifier quoting downstream
//! is only safe because of the character set enforced by this type.

use std::fmt;

use regex::Regex;
use thiserror::Error;

/// Substrings that are never allowed in a schema name, compared
/// case-insensitively. These cover the server's own catalogs.
pub const RESERVED_SUBSTRINGS: [&str; 4] =
    ["information_schema", "mysql", "performance_schema", "sys"];

/// Errors from schema-name validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaNameError {
    /// The name is empty.
    #[error("schema name cannot be empty")]
    Empty,

    /// The name matches a reserved system catalog.
    #[error("schema name '{0}' is not allowed")]
    Reserved(String),

    /// The name contains characters outside `[A-Za-z0-9_-]`.
    #[error("schema name '{0}' contains invalid characters")]
    InvalidCharacters(String),
}

/// A schema name that has passed validation.
///
/// Invariant: the inner string is non-empty, matches `^[A-Za-z0-9_-]+$`, and
/// contains none of [`RESERVED_SUBSTRINGS`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaName(String);

impl SchemaName {
    /// Validate `name` and wrap it.
    pub fn new(name: &str) -> Result<Self, SchemaNameError> {
        if name.is_empty() {
            return Err(SchemaNameError::Empty);
        }

        let lowered = name.to_ascii_lowercase();
        if RESERVED_SUBSTRINGS.iter().any(|r| lowered.contains(r)) {
            return Err(SchemaNameError::Reserved(name.to_string()));
        }

        let valid = Regex::new("^[A-Za-z0-9_-]+$").unwrap();
        if !valid.is_match(name) {
            return Err(SchemaNameError::InvalidCharacters(name.to_string()));
        }

        Ok(Self(name.to_string()))
    }

    /// The validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_names() {
        for name in ["svc_a", "myapp_db", "orders", "a", "Tenant-42", "_x_"] {
            let schema = SchemaName::new(name).unwrap();
            assert_eq!(schema.as_str(), name);
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(SchemaName::new(""), Err(SchemaNameError::Empty));
    }

    #[test]
    fn test_rejects_reserved_catalogs() {
        for name in ["information_schema", "mysql", "performance_schema", "sys"] {
            assert!(matches!(
                SchemaName::new(name),
                Err(SchemaNameError::Reserved(_))
            ));
        }
    }

    #[test]
    fn test_rejects_reserved_substrings_case_insensitively() {
        // Containment is enough, in any case mix.
        for name in ["MySQL_shadow", "app_sys", "Information_Schema2"] {
            assert!(matches!(
                SchemaName::new(name),
                Err(SchemaNameError::Reserved(_))
            ));
        }
    }

    #[test]
    fn test_rejects_invalid_characters() {
        for name in ["bad name", "semi;colon", "tick`tick", "dot.dot", "p%cent", "ünïcode"] {
            assert!(matches!(
                SchemaName::new(name),
                Err(SchemaNameError::InvalidCharacters(_))
            ));
        }
    }

    #[test]
    fn test_reserved_checked_before_characters() {
        // A name that is both reserved and malformed reports the reserved error.
        assert!(matches!(
            SchemaName::new("mysql schema"),
            Err(SchemaNameError::Reserved(_))
        ));
    }
}
