//! High-level Intermediate Representation for the TypeScript subset used by
//! Playwright tests and page objects.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: every emitted construct has a typed Rust equivalent
//! 2. **Validation**: identifiers and type names are checked on construction
//! 3. **Determinism**: the same HIR always prints the same source

use serde::{Deserialize, Serialize};

/// A complete TypeScript module (one source file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsModule {
    /// Module-level statements
    pub statements: Vec<Stmt>,
    /// Generation metadata, printed as a header comment
    pub metadata: Option<GenerationMetadata>,
}

impl Default for TsModule {
    fn default() -> Self {
        Self::new()
    }
}

impl TsModule {
    /// Create a new empty module.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            statements: Vec::new(),
            metadata: None,
        }
    }
}

/// Metadata about code generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Tool that generated this code
    pub tool: String,
    /// Tool version
    pub version: String,
    /// Extra `key: value` lines (plan source, seed, ...)
    pub notes: Vec<(String, String)>,
}

/// One name in an import clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportName {
    /// Imported binding
    pub name: Identifier,
    /// `type Foo` import
    pub type_only: bool,
}

/// TypeScript statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `import { a, type B } from 'path';`
    Import {
        /// Imported names
        names: Vec<ImportName>,
        /// Module specifier
        from: String,
    },
    /// Constant declaration: `const name = expr;`
    Const {
        /// Constant name
        name: Identifier,
        /// Value
        value: Expr,
    },
    /// Member assignment: `obj.member = value;`
    MemberAssign {
        /// Object expression
        object: Expr,
        /// Member name
        member: Identifier,
        /// New value
        value: Expr,
    },
    /// Expression statement: `expr;`
    Expr(Expr),
    /// Return statement: `return expr;` or `return;`
    Return(Option<Expr>),
    /// Comment: `// text`
    Comment(String),
    /// Empty line
    Blank,
    /// Class definition
    Class(TsClass),
}

/// TypeScript expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Boolean literal
    Bool(bool),
    /// Number literal
    Num(f64),
    /// String literal (will be properly escaped)
    Str(String),
    /// Identifier reference
    Ident(Identifier),
    /// `this` keyword
    This,
    /// Member access: `obj.prop`
    Member {
        /// Object
        object: Box<Expr>,
        /// Property name
        property: Identifier,
    },
    /// Function call: `func(args)`
    Call {
        /// Function expression
        callee: Box<Expr>,
        /// Arguments
        args: Vec<Expr>,
    },
    /// `new Constructor(args)`
    New {
        /// Constructor
        constructor: Box<Expr>,
        /// Arguments
        args: Vec<Expr>,
    },
    /// `await expr`
    Await(Box<Expr>),
    /// Object literal: `{ key: value, ... }`
    Object(Vec<(String, Expr)>),
    /// Array literal: `[expr, ...]`
    Array(Vec<Expr>),
    /// Arrow function with block body: `async (params) => { stmts }`
    Arrow {
        /// `async` arrow
        is_async: bool,
        /// Parameters
        params: Vec<Param>,
        /// Body statements
        body: Vec<Stmt>,
    },
}

/// A function or method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Param {
    /// `name: Type` (type optional)
    Named {
        /// Parameter name
        name: Identifier,
        /// Optional type annotation
        ty: Option<TypeRef>,
    },
    /// Object destructuring: `{ a, b }`
    Destructure(Vec<Identifier>),
}

/// Name of a variable, class, field or method in emitted code.
///
/// Only ASCII word characters plus `$` are accepted, so every page-object
/// name that reaches the printer is a legal TypeScript binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    /// Keywords and literals that can never name a binding.
    pub const RESERVED_WORDS: &'static [&'static str] = &[
        "await", "break", "case", "catch", "class", "const", "continue", "debugger",
        "default", "delete", "do", "else", "enum", "export", "extends", "false",
        "finally", "for", "function", "if", "implements", "import", "in",
        "instanceof", "interface", "let", "new", "null", "package", "private",
        "protected", "public", "return", "static", "super", "switch", "this",
        "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
    ];

    /// Validate `name` as a binding name.
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` carrying the first rule the name breaks.
    pub fn new(name: impl Into<String>) -> crate::Result<Self> {
        let name = name.into();
        match Self::rejection(&name) {
            Some(reason) => Err(crate::TsGenError::InvalidIdentifier { name, reason }),
            None => Ok(Self(name)),
        }
    }

    fn rejection(name: &str) -> Option<String> {
        let Some(first) = name.chars().next() else {
            return Some("empty name".to_string());
        };
        if first.is_ascii_digit() {
            return Some("leading digit".to_string());
        }
        if let Some(bad) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '$')) {
            return Some(format!("character '{bad}' not allowed"));
        }
        Self::RESERVED_WORDS
            .contains(&name)
            .then(|| "reserved word".to_string())
    }

    /// Wrap a compile-time constant such as `page` or `expect`.
    #[must_use]
    pub fn new_unchecked(name: &'static str) -> Self {
        Self(name.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A type annotation such as `Page`, `string` or `string[]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef(String);

impl TypeRef {
    /// Create a type reference: an identifier optionally followed by `[]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base name is not a plain identifier.
    pub fn new(ty: impl Into<String>) -> crate::Result<Self> {
        let ty = ty.into();
        let base = ty.strip_suffix("[]").unwrap_or(&ty);
        let valid = !base.is_empty()
            && !base.starts_with(|c: char| c.is_ascii_digit())
            && base.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(Self(ty))
        } else {
            Err(crate::TsGenError::InvalidType(ty))
        }
    }

    /// `string`
    #[must_use]
    pub fn string() -> Self {
        Self("string".to_string())
    }

    /// `number`
    #[must_use]
    pub fn number() -> Self {
        Self("number".to_string())
    }

    /// `string[]`
    #[must_use]
    pub fn string_array() -> Self {
        Self("string[]".to_string())
    }

    /// Get the type string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Class field declaration: `readonly name: Type;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TsField {
    /// Field name
    pub name: Identifier,
    /// Field type
    pub ty: TypeRef,
    /// `readonly` modifier
    pub readonly: bool,
}

/// TypeScript class definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsClass {
    /// Class name
    pub name: Identifier,
    /// `export class`
    pub exported: bool,
    /// Field declarations
    pub fields: Vec<TsField>,
    /// Constructor parameters and body
    pub constructor: Option<(Vec<Param>, Vec<Stmt>)>,
    /// Methods
    pub methods: Vec<TsMethod>,
}

/// TypeScript class method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsMethod {
    /// Method name
    pub name: Identifier,
    /// `async` method
    pub is_async: bool,
    /// Parameters
    pub params: Vec<Param>,
    /// Method body
    pub body: Vec<Stmt>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn page_object_names_are_accepted() {
        for name in ["loginPage", "clickSaveButton", "_hidden", "$root", "page2"] {
            assert_eq!(Identifier::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn rejection_reasons() {
        let reason = |name: &str| match Identifier::new(name).unwrap_err() {
            crate::TsGenError::InvalidIdentifier { reason, .. } => reason,
            other => panic!("unexpected error {other}"),
        };
        assert_eq!(reason(""), "empty name");
        assert_eq!(reason("2ndStep"), "leading digit");
        assert_eq!(reason("search-field"), "character '-' not allowed");
        assert_eq!(reason("delete"), "reserved word");
    }

    #[test]
    fn type_ref_accepts_arrays() {
        assert_eq!(TypeRef::new("string[]").unwrap().as_str(), "string[]");
        assert_eq!(TypeRef::string_array(), TypeRef::new("string[]").unwrap());
    }

    #[test]
    fn type_ref_rejects_garbage() {
        assert!(TypeRef::new("").is_err());
        assert!(TypeRef::new("Map<string>").is_err());
        assert!(TypeRef::new("[]").is_err());
    }
}
