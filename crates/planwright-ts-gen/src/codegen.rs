//! Deterministic TypeScript printer.
//!
//! Output style follows what Playwright's own generators emit: two-space
//! indentation, single-quoted strings, semicolons, one blank line between
//! class members.

use crate::hir::*;
use std::fmt::Write as _;

const INDENT: &str = "  ";

/// Print a module to TypeScript source.
#[must_use]
pub fn generate(module: &TsModule) -> String {
    let mut out = String::new();
    if let Some(meta) = &module.metadata {
        let _ = writeln!(out, "// Generated by {} {}", meta.tool, meta.version);
        for (key, value) in &meta.notes {
            let _ = writeln!(out, "// {key}: {value}");
        }
        out.push('\n');
    }
    for stmt in &module.statements {
        write_stmt(&mut out, stmt, 0);
    }
    out
}

/// Quote a string literal with single quotes.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn pad(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_block(out: &mut String, body: &[Stmt], depth: usize) {
    for stmt in body {
        write_stmt(out, stmt, depth);
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    match stmt {
        Stmt::Blank => {
            out.push('\n');
            return;
        }
        Stmt::Class(class) => {
            write_class(out, class, depth);
            return;
        }
        _ => {}
    }

    pad(out, depth);
    match stmt {
        Stmt::Import { names, from } => {
            let names: Vec<String> = names
                .iter()
                .map(|n| {
                    if n.type_only {
                        format!("type {}", n.name)
                    } else {
                        n.name.to_string()
                    }
                })
                .collect();
            let _ = write!(out, "import {{ {} }} from {};", names.join(", "), quote(from));
        }
        Stmt::Const { name, value } => {
            let _ = write!(out, "const {name} = {};", expr(value, depth));
        }
        Stmt::MemberAssign {
            object,
            member,
            value,
        } => {
            let _ = write!(out, "{}.{member} = {};", expr(object, depth), expr(value, depth));
        }
        Stmt::Expr(e) => {
            let _ = write!(out, "{};", expr(e, depth));
        }
        Stmt::Return(Some(e)) => {
            let _ = write!(out, "return {};", expr(e, depth));
        }
        Stmt::Return(None) => out.push_str("return;"),
        Stmt::Comment(text) => {
            let _ = write!(out, "// {}", text.replace('\n', " "));
        }
        Stmt::Blank | Stmt::Class(_) => {}
    }
    out.push('\n');
}

fn write_class(out: &mut String, class: &TsClass, depth: usize) {
    pad(out, depth);
    if class.exported {
        out.push_str("export ");
    }
    let _ = writeln!(out, "class {} {{", class.name);

    for field in &class.fields {
        pad(out, depth + 1);
        if field.readonly {
            out.push_str("readonly ");
        }
        let _ = writeln!(out, "{}: {};", field.name, field.ty.as_str());
    }

    let mut first_member = class.fields.is_empty();
    if let Some((params, body)) = &class.constructor {
        if !first_member {
            out.push('\n');
        }
        first_member = false;
        pad(out, depth + 1);
        let _ = writeln!(out, "constructor({}) {{", params_list(params));
        write_block(out, body, depth + 2);
        pad(out, depth + 1);
        out.push_str("}\n");
    }

    for method in &class.methods {
        if !first_member {
            out.push('\n');
        }
        first_member = false;
        pad(out, depth + 1);
        if method.is_async {
            out.push_str("async ");
        }
        let _ = writeln!(out, "{}({}) {{", method.name, params_list(&method.params));
        write_block(out, &method.body, depth + 2);
        pad(out, depth + 1);
        out.push_str("}\n");
    }

    pad(out, depth);
    out.push_str("}\n");
}

fn params_list(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| match p {
            Param::Named { name, ty: Some(ty) } => format!("{name}: {}", ty.as_str()),
            Param::Named { name, ty: None } => name.to_string(),
            Param::Destructure(names) => {
                let names: Vec<&str> = names.iter().map(Identifier::as_str).collect();
                format!("{{ {} }}", names.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn num(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn expr(e: &Expr, depth: usize) -> String {
    match e {
        Expr::Bool(b) => b.to_string(),
        Expr::Num(n) => num(*n),
        Expr::Str(s) => quote(s),
        Expr::Ident(id) => id.to_string(),
        Expr::This => "this".to_string(),
        Expr::Member { object, property } => format!("{}.{property}", expr(object, depth)),
        Expr::Call { callee, args } => format!("{}({})", expr(callee, depth), args_list(args, depth)),
        Expr::New { constructor, args } => {
            format!("new {}({})", expr(constructor, depth), args_list(args, depth))
        }
        Expr::Await(inner) => format!("await {}", expr(inner, depth)),
        Expr::Object(pairs) if pairs.is_empty() => "{}".to_string(),
        Expr::Object(pairs) => {
            let body: Vec<String> = pairs
                .iter()
                .map(|(k, v)| format!("{}: {}", object_key(k), expr(v, depth)))
                .collect();
            format!("{{ {} }}", body.join(", "))
        }
        Expr::Array(items) => format!("[{}]", args_list(items, depth)),
        Expr::Arrow {
            is_async,
            params,
            body,
        } => {
            let mut s = String::new();
            if *is_async {
                s.push_str("async ");
            }
            let _ = writeln!(s, "({}) => {{", params_list(params));
            write_block(&mut s, body, depth + 1);
            pad(&mut s, depth);
            s.push('}');
            s
        }
    }
}

fn args_list(args: &[Expr], depth: usize) -> String {
    args.iter()
        .map(|a| expr(a, depth))
        .collect::<Vec<_>>()
        .join(", ")
}

fn object_key(key: &str) -> String {
    if Identifier::new(key).is_ok() {
        key.to_string()
    } else {
        quote(key)
    }
}
