//! Fluent builder API for TypeScript generation.
//!
//! # Example
//!
//! ```rust,no_run
//! use planwright_ts_gen::prelude::*;
//!
//! let ts = TsModuleBuilder::new()
//!     .import(&["test"], &[], "@playwright/test").unwrap()
//!     .comment("1. Navigate to login page")
//!     .build();
//! ```

use crate::hir::*;
use crate::{Result, TsGenError};

/// Builder for TypeScript modules.
#[derive(Debug, Default)]
pub struct TsModuleBuilder {
    statements: Vec<Stmt>,
    metadata: Option<GenerationMetadata>,
}

impl TsModuleBuilder {
    /// Start an empty source file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set generation metadata (printed as a header comment).
    #[must_use]
    pub fn metadata(mut self, metadata: GenerationMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Add a statement.
    #[must_use]
    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.statements.push(stmt);
        self
    }

    /// Add multiple statements.
    #[must_use]
    pub fn stmts(mut self, stmts: impl IntoIterator<Item = Stmt>) -> Self {
        self.statements.extend(stmts);
        self
    }

    /// Add an import of value names and `type` names from a module.
    pub fn import(self, values: &[&str], types: &[&str], from: impl Into<String>) -> Result<Self> {
        Ok(self.stmt(Stmt::import(values, types, from)?))
    }

    /// Add a comment.
    #[must_use]
    pub fn comment(self, text: impl Into<String>) -> Self {
        self.stmt(Stmt::Comment(text.into()))
    }

    /// Add an empty line.
    #[must_use]
    pub fn blank(self) -> Self {
        self.stmt(Stmt::Blank)
    }

    /// Append `expr;`.
    #[must_use]
    pub fn expr(self, e: Expr) -> Self {
        self.stmt(Stmt::Expr(e))
    }

    /// Add a class definition.
    #[must_use]
    pub fn class(self, class: TsClass) -> Self {
        self.stmt(Stmt::Class(class))
    }

    /// Build the module.
    #[must_use]
    pub fn build(self) -> TsModule {
        TsModule {
            statements: self.statements,
            metadata: self.metadata,
        }
    }
}

/// Builder for TypeScript classes.
#[derive(Debug)]
pub struct TsClassBuilder {
    name: Identifier,
    exported: bool,
    fields: Vec<TsField>,
    constructor: Option<(Vec<Param>, Vec<Stmt>)>,
    methods: Vec<TsMethod>,
}

impl TsClassBuilder {
    /// Start a class named `name`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: Identifier::new(name)?,
            exported: false,
            fields: Vec::new(),
            constructor: None,
            methods: Vec::new(),
        })
    }

    /// Mark the class as `export class`.
    #[must_use]
    pub fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    /// Add a `readonly name: Type;` field.
    pub fn readonly_field(mut self, name: impl Into<String>, ty: impl Into<String>) -> Result<Self> {
        let name = Identifier::new(name)?;
        self.ensure_unique(&name)?;
        self.fields.push(TsField {
            name,
            ty: TypeRef::new(ty)?,
            readonly: true,
        });
        Ok(self)
    }

    /// Set the constructor parameters and body.
    #[must_use]
    pub fn constructor(mut self, params: Vec<Param>, body: Vec<Stmt>) -> Self {
        self.constructor = Some((params, body));
        self
    }

    /// Add an `async` method.
    pub fn async_method(
        mut self,
        name: impl Into<String>,
        params: Vec<Param>,
        body: Vec<Stmt>,
    ) -> Result<Self> {
        let name = Identifier::new(name)?;
        self.ensure_unique(&name)?;
        self.methods.push(TsMethod {
            name,
            is_async: true,
            params,
            body,
        });
        Ok(self)
    }

    fn ensure_unique(&self, name: &Identifier) -> Result<()> {
        let taken = self.fields.iter().any(|f| &f.name == name)
            || self.methods.iter().any(|m| &m.name == name);
        if taken {
            return Err(TsGenError::DuplicateMember {
                class: self.name.to_string(),
                member: name.to_string(),
            });
        }
        Ok(())
    }

    /// Build the class.
    #[must_use]
    pub fn build(self) -> TsClass {
        TsClass {
            name: self.name,
            exported: self.exported,
            fields: self.fields,
            constructor: self.constructor,
            methods: self.methods,
        }
    }
}

/// Constructors for common expression shapes.
impl Expr {
    /// Create a boolean literal.
    #[must_use]
    pub const fn bool(v: bool) -> Self {
        Self::Bool(v)
    }

    /// Create a number literal.
    #[must_use]
    pub fn num(v: impl Into<f64>) -> Self {
        Self::Num(v.into())
    }

    /// Create a string literal.
    #[must_use]
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Reference a binding by name.
    pub fn ident(name: impl Into<String>) -> Result<Self> {
        Ok(Self::Ident(Identifier::new(name)?))
    }

    /// Create `this` reference.
    #[must_use]
    pub const fn this() -> Self {
        Self::This
    }

    /// Member access: `self.prop`
    pub fn dot(self, prop: impl Into<String>) -> Result<Self> {
        Ok(Self::Member {
            object: Box::new(self),
            property: Identifier::new(prop)?,
        })
    }

    /// Method call shorthand: `self.method(args)`
    pub fn method(self, name: impl Into<String>, args: Vec<Expr>) -> Result<Self> {
        Ok(self.dot(name)?.call(args))
    }

    /// Function call: `self(args)`
    #[must_use]
    pub fn call(self, args: Vec<Expr>) -> Self {
        Self::Call {
            callee: Box::new(self),
            args,
        }
    }

    /// Constructor call: `new self(args)`
    #[must_use]
    pub fn new_expr(self, args: Vec<Expr>) -> Self {
        Self::New {
            constructor: Box::new(self),
            args,
        }
    }

    /// Await: `await self`
    #[must_use]
    pub fn await_expr(self) -> Self {
        Self::Await(Box::new(self))
    }

    /// Object literal.
    #[must_use]
    pub fn object(pairs: Vec<(&str, Expr)>) -> Self {
        Self::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    /// Array literal.
    #[must_use]
    pub fn array(items: Vec<Expr>) -> Self {
        Self::Array(items)
    }

    /// `async ({ a, b }) => { body }`
    pub fn async_arrow_destructured(names: &[&str], body: Vec<Stmt>) -> Result<Self> {
        let idents = names
            .iter()
            .map(|n| Identifier::new(*n))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::Arrow {
            is_async: true,
            params: vec![Param::Destructure(idents)],
            body,
        })
    }

    /// `() => { body }`
    #[must_use]
    pub fn arrow(body: Vec<Stmt>) -> Self {
        Self::Arrow {
            is_async: false,
            params: Vec::new(),
            body,
        }
    }
}

impl Param {
    /// `name: ty`
    pub fn typed(name: impl Into<String>, ty: TypeRef) -> Result<Self> {
        Ok(Self::Named {
            name: Identifier::new(name)?,
            ty: Some(ty),
        })
    }
}

/// Statement builder helpers.
impl Stmt {
    /// `import { values, type types } from 'from';`
    pub fn import(values: &[&str], types: &[&str], from: impl Into<String>) -> Result<Self> {
        let mut names = Vec::with_capacity(values.len() + types.len());
        for v in values {
            names.push(ImportName {
                name: Identifier::new(*v)?,
                type_only: false,
            });
        }
        for t in types {
            names.push(ImportName {
                name: Identifier::new(*t)?,
                type_only: true,
            });
        }
        Ok(Self::Import {
            names,
            from: from.into(),
        })
    }

    /// `const name = value;`
    pub fn const_decl(name: impl Into<String>, value: Expr) -> Result<Self> {
        Ok(Self::Const {
            name: Identifier::new(name)?,
            value,
        })
    }

    /// `this.member = value;`
    pub fn this_assign(member: impl Into<String>, value: Expr) -> Result<Self> {
        Ok(Self::MemberAssign {
            object: Expr::This,
            member: Identifier::new(member)?,
            value,
        })
    }

    /// Wrap `expr` as a statement.
    #[must_use]
    pub fn expr(e: Expr) -> Self {
        Self::Expr(e)
    }

    /// Create a comment.
    #[must_use]
    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(text.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod module_builder_tests {
        use super::*;

        #[test]
        fn module_builder_basic() {
            let module = TsModuleBuilder::new()
                .comment("test")
                .blank()
                .expr(Expr::ident("foo").unwrap())
                .build();
            assert_eq!(module.statements.len(), 3);
        }

        #[test]
        fn module_builder_import() {
            let module = TsModuleBuilder::new()
                .import(&["expect"], &["Page"], "@playwright/test")
                .unwrap()
                .build();
            match &module.statements[0] {
                Stmt::Import { names, from } => {
                    assert_eq!(from, "@playwright/test");
                    assert_eq!(names.len(), 2);
                    assert!(!names[0].type_only);
                    assert!(names[1].type_only);
                }
                other => panic!("expected import, got {other:?}"),
            }
        }

        #[test]
        fn module_builder_import_rejects_bad_name() {
            assert!(TsModuleBuilder::new()
                .import(&["not-valid"], &[], "x")
                .is_err());
        }
    }

    mod class_builder_tests {
        use super::*;

        #[test]
        fn class_builder_members() {
            let class = TsClassBuilder::new("LoginPage")
                .unwrap()
                .exported()
                .readonly_field("page", "Page")
                .unwrap()
                .async_method("navigate", vec![], vec![])
                .unwrap()
                .build();
            assert!(class.exported);
            assert_eq!(class.fields.len(), 1);
            assert_eq!(class.methods.len(), 1);
            assert!(class.methods[0].is_async);
        }

        #[test]
        fn class_builder_rejects_duplicate_member() {
            let result = TsClassBuilder::new("LoginPage")
                .unwrap()
                .readonly_field("submit", "Locator")
                .unwrap()
                .async_method("submit", vec![], vec![]);
            assert!(matches!(result, Err(TsGenError::DuplicateMember { .. })));
        }
    }

    mod expr_tests {
        use super::*;

        #[test]
        fn method_chain() {
            let e = Expr::this().dot("page").unwrap().method("goto", vec![Expr::str("/")]);
            assert!(matches!(e, Ok(Expr::Call { .. })));
        }

        #[test]
        fn destructured_arrow() {
            let e = Expr::async_arrow_destructured(&["page"], vec![]).unwrap();
            match e {
                Expr::Arrow {
                    is_async, params, ..
                } => {
                    assert!(is_async);
                    assert_eq!(params.len(), 1);
                }
                other => panic!("expected arrow, got {other:?}"),
            }
        }
    }
}
