//! Typed Rust DSL for generating Playwright TypeScript sources.
//!
//! Generated tests and page objects are never assembled with string
//! concatenation. They are built as a small HIR ([`hir`]) through a fluent
//! builder ([`builder`]) and printed deterministically ([`codegen`]), so the
//! same input always yields byte-identical output.
//!
//! # Example
//!
//! ```rust
//! use planwright_ts_gen::prelude::*;
//!
//! let module = TsModuleBuilder::new()
//!     .import(&["test"], &[], "@playwright/test")
//!     .unwrap()
//!     .build();
//! assert_eq!(generate(&module), "import { test } from '@playwright/test';\n");
//! ```

pub mod builder;
pub mod codegen;
pub mod error;
pub mod hir;
pub mod manifest;

pub use codegen::{generate, quote};
pub use error::{Result, TsGenError};
pub use manifest::{hash_contents, FileManifest};

/// Common imports.
pub mod prelude {
    pub use crate::builder::{TsClassBuilder, TsModuleBuilder};
    pub use crate::codegen::{generate, quote};
    pub use crate::error::{Result, TsGenError};
    pub use crate::manifest::{hash_contents, FileManifest};
    pub use crate::hir::{
        Expr, GenerationMetadata, Identifier, Param, Stmt, TsClass, TsMethod, TsModule, TypeRef,
    };
}
