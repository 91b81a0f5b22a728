//! Error types for `planwright-ts-gen`.

use thiserror::Error;

/// Result type alias for ts-gen operations.
pub type Result<T> = std::result::Result<T, TsGenError>;

/// Errors that can occur while building TypeScript sources.
#[derive(Debug, Error)]
pub enum TsGenError {
    /// Invalid identifier name (reserved word, invalid characters, etc.)
    #[error("Invalid identifier '{name}': {reason}")]
    InvalidIdentifier {
        /// The invalid identifier
        name: String,
        /// Why it's invalid
        reason: String,
    },

    /// Invalid type reference
    #[error("Invalid type '{0}'")]
    InvalidType(String),

    /// A class member was declared twice
    #[error("Duplicate member '{member}' in class {class}")]
    DuplicateMember {
        /// Class name
        class: String,
        /// Member name
        member: String,
    },

    /// Manifest is missing or unreadable
    #[error("Manifest error for {path}: {reason}")]
    ManifestError {
        /// Generated file path
        path: String,
        /// What went wrong
        reason: String,
    },

    /// Generated file was modified after generation
    #[error("Hash mismatch for {path}: expected {expected}, found {actual}. Regenerate instead of editing by hand")]
    HashMismatch {
        /// Generated file path
        path: String,
        /// Hash recorded in the manifest
        expected: String,
        /// Hash of the current contents
        actual: String,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_identifier() {
        let err = TsGenError::InvalidIdentifier {
            name: "class".to_string(),
            reason: "reserved word".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid identifier 'class': reserved word");
    }

    #[test]
    fn error_display_duplicate_member() {
        let err = TsGenError::DuplicateMember {
            class: "LoginPage".to_string(),
            member: "submit".to_string(),
        };
        assert!(err.to_string().contains("LoginPage"));
        assert!(err.to_string().contains("submit"));
    }
}
