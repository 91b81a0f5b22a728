//! Content manifests for generated sources.
//!
//! A manifest records the blake3 hash of a generated file next to the
//! metadata of the run that produced it. Loading a generated file checks the
//! hash so hand edits are detected before anything overwrites them.

use crate::error::{Result, TsGenError};
use crate::hir::GenerationMetadata;
use serde::{Deserialize, Serialize};

/// Provenance record written next to an emitted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifest {
    /// Version of manifest format
    pub manifest_version: u32,
    /// Output path relative to the workspace root
    pub output_path: String,
    /// blake3 digest of the emitted source
    pub output_hash: String,
    /// Generation metadata
    pub generation: GenerationMetadata,
}

impl FileManifest {
    /// Current manifest format version.
    pub const VERSION: u32 = 1;

    /// Create a manifest describing `contents` stored at `output_path`.
    #[must_use]
    pub fn for_contents(
        output_path: impl Into<String>,
        contents: &str,
        generation: GenerationMetadata,
    ) -> Self {
        Self {
            manifest_version: Self::VERSION,
            output_path: output_path.into(),
            output_hash: hash_contents(contents),
            generation,
        }
    }

    /// Check that `contents` is exactly what this manifest describes.
    ///
    /// # Errors
    ///
    /// Returns [`TsGenError::ManifestError`] for an unknown manifest version
    /// and [`TsGenError::HashMismatch`] when the contents were modified.
    pub fn verify(&self, contents: &str) -> Result<()> {
        if self.manifest_version != Self::VERSION {
            return Err(TsGenError::ManifestError {
                path: self.output_path.clone(),
                reason: format!("unsupported manifest version {}", self.manifest_version),
            });
        }
        let actual = hash_contents(contents);
        if actual != self.output_hash {
            return Err(TsGenError::HashMismatch {
                path: self.output_path.clone(),
                expected: self.output_hash.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Compute the Blake3 hash of file contents.
#[must_use]
pub fn hash_contents(contents: &str) -> String {
    blake3::hash(contents.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn test_metadata() -> GenerationMetadata {
        GenerationMetadata {
            tool: "planwright".to_string(),
            version: "0.1.0".to_string(),
            notes: Vec::new(),
        }
    }

    #[test]
    fn hash_deterministic() {
        assert_eq!(hash_contents("const x = 42;"), hash_contents("const x = 42;"));
    }

    #[test]
    fn hash_changes_with_content() {
        assert_ne!(hash_contents("const x = 42;"), hash_contents("const x = 43;"));
    }

    #[test]
    fn verify_success() {
        let manifest = FileManifest::for_contents("LoginPage.ts", "class A {}", test_metadata());
        assert!(manifest.verify("class A {}").is_ok());
    }

    #[test]
    fn verify_detects_modification() {
        let manifest = FileManifest::for_contents("LoginPage.ts", "class A {}", test_metadata());
        match manifest.verify("class B {}") {
            Err(TsGenError::HashMismatch {
                path,
                expected,
                actual,
            }) => {
                assert_eq!(path, "LoginPage.ts");
                assert_ne!(expected, actual);
            }
            other => panic!("Expected HashMismatch, got {:?}", other),
        }
    }

    #[test]
    fn verify_rejects_unknown_version() {
        let mut manifest = FileManifest::for_contents("a.ts", "", test_metadata());
        manifest.manifest_version = 99;
        assert!(matches!(
            manifest.verify(""),
            Err(TsGenError::ManifestError { .. })
        ));
    }

    #[test]
    fn manifest_serialization() {
        let manifest = FileManifest::for_contents("test.ts", "abc", test_metadata());
        let parsed = FileManifest::from_json(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(manifest, parsed);
        assert_eq!(parsed.manifest_version, FileManifest::VERSION);
    }
}
