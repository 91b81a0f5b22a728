//! Render page object definitions as Playwright TypeScript classes.

use crate::action::{ActionKind, ArgValue};
use crate::page_object::{ActionMethod, ActionTemplate, PageObjectDefinition, ParamType, TemplateArg};
use crate::result::{PlanwrightError, PlanwrightResult};
use planwright_ts_gen::hir::{Identifier, Param};
use planwright_ts_gen::prelude::{
    generate, Expr, GenerationMetadata, Stmt, TsClassBuilder, TsModule, TsModuleBuilder, TypeRef,
};

/// Tool name written into generated headers
pub const TOOL_NAME: &str = "planwright";

/// Metadata for files written by this build
#[must_use]
pub fn metadata(notes: Vec<(String, String)>) -> GenerationMetadata {
    GenerationMetadata {
        tool: TOOL_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        notes,
    }
}

/// Rendered TypeScript source for a page
pub fn render_page(definition: &PageObjectDefinition) -> PlanwrightResult<String> {
    Ok(generate(&page_module(definition)?))
}

/// TypeScript module for a page
pub fn page_module(definition: &PageObjectDefinition) -> PlanwrightResult<TsModule> {
    let uses_expect = definition
        .methods()
        .any(|m| m.body.iter().any(|t| t.kind.is_verification()));
    let values: &[&str] = if uses_expect { &["expect"] } else { &[] };
    let types: &[&str] = if definition.locator_count() > 0 {
        &["Locator", "Page"]
    } else {
        &["Page"]
    };

    let mut notes = Vec::new();
    if let Some(route) = definition.route() {
        notes.push(("route".to_string(), route.to_string()));
    }

    let page = || Expr::ident("page");
    let mut constructor = vec![Stmt::this_assign("page", page()?)?];
    let mut class = TsClassBuilder::new(definition.name())?
        .exported()
        .readonly_field("page", "Page")?;
    for locator in definition.locators() {
        class = class.readonly_field(locator.name.as_str(), "Locator")?;
        constructor.push(Stmt::this_assign(
            locator.name.as_str(),
            locator.strategy.to_playwright(page()?)?,
        )?);
    }
    class = class.constructor(
        vec![Param::typed("page", TypeRef::new("Page")?)?],
        constructor,
    );
    for method in definition.methods() {
        let params = method
            .params
            .iter()
            .map(|p| Param::typed(p.name.as_str(), type_of(p.ty)))
            .collect::<Result<Vec<_>, _>>()?;
        let body = method
            .body
            .iter()
            .map(|t| template_stmt(method, t))
            .collect::<PlanwrightResult<Vec<_>>>()?;
        class = class.async_method(method.name.as_str(), params, body)?;
    }

    Ok(TsModuleBuilder::new()
        .metadata(metadata(notes))
        .import(values, types, "@playwright/test")?
        .blank()
        .class(class.build())
        .build())
}

fn type_of(ty: ParamType) -> TypeRef {
    match ty {
        ParamType::Text => TypeRef::string(),
        ParamType::List => TypeRef::string_array(),
        ParamType::Number => TypeRef::number(),
    }
}

/// Expression for an argument value baked into generated code
pub fn value_expr(value: &ArgValue) -> Expr {
    match value {
        ArgValue::Text(s) => Expr::str(s.as_str()),
        ArgValue::List(items) => Expr::array(items.iter().map(|i| Expr::str(i.as_str())).collect()),
        ArgValue::Number(n) => Expr::num(*n),
    }
}

fn arg_expr(slot: &TemplateArg) -> PlanwrightResult<Expr> {
    Ok(match slot {
        TemplateArg::Param(name) => Expr::ident(name.as_str())?,
        TemplateArg::Literal(value) => value_expr(value),
    })
}

fn template_stmt(method: &ActionMethod, t: &ActionTemplate) -> PlanwrightResult<Stmt> {
    let missing = |what: &str| {
        PlanwrightError::synthesis(format!("method {} has a {} without {what}", method.name, t.kind))
    };
    let this_page = || Expr::this().dot("page");
    let target = || -> PlanwrightResult<Expr> {
        let name = t.locator.as_deref().ok_or_else(|| missing("a target"))?;
        Ok(Expr::this().dot(name)?)
    };
    let arg = |i: usize| -> PlanwrightResult<Expr> {
        t.args.get(i).ok_or_else(|| missing("an argument")).and_then(arg_expr)
    };

    let call = match t.kind {
        ActionKind::Navigate => this_page()?.method("goto", vec![arg(0)?])?,
        ActionKind::Fill => target()?.method("fill", vec![arg(0)?])?,
        ActionKind::Click => target()?.method("click", vec![])?,
        ActionKind::SelectOption => target()?.method("selectOption", vec![arg(0)?])?,
        ActionKind::Hover => target()?.method("hover", vec![])?,
        ActionKind::Drag => {
            let destination = t.destination.as_deref().ok_or_else(|| missing("a drop target"))?;
            target()?.method("dragTo", vec![Expr::this().dot(destination)?])?
        }
        ActionKind::Upload => target()?.method("setInputFiles", vec![arg(0)?])?,
        ActionKind::PressKey => match t.locator {
            Some(_) => target()?.method("press", vec![arg(0)?])?,
            None => this_page()?.dot("keyboard")?.method("press", vec![arg(0)?])?,
        },
        ActionKind::HandleDialog => {
            let verb = match t.args.first() {
                Some(TemplateArg::Literal(ArgValue::Text(v))) if v == "accept" || v == "dismiss" => v,
                _ => return Err(missing("accept or dismiss")),
            };
            let dialog = Expr::ident("dialog")?;
            let handler = Expr::Arrow {
                is_async: true,
                params: vec![Param::Named {
                    name: Identifier::new("dialog")?,
                    ty: None,
                }],
                body: vec![Stmt::expr(dialog.method(verb.as_str(), vec![])?.await_expr())],
            };
            let once = this_page()?.method("once", vec![Expr::str("dialog"), handler])?;
            return Ok(Stmt::expr(once));
        }
        ActionKind::Wait => match t.locator {
            Some(_) => {
                let state = arg(0)?;
                target()?.method("waitFor", vec![Expr::Object(vec![("state".to_string(), state)])])?
            }
            None => this_page()?.method("waitForTimeout", vec![arg(0)?])?,
        },
        ActionKind::VerifyVisible => expect(target()?)?.method("toBeVisible", vec![])?,
        ActionKind::VerifyText => expect(target()?)?.method("toContainText", vec![arg(0)?])?,
        ActionKind::VerifyValue => expect(target()?)?.method("toHaveValue", vec![arg(0)?])?,
    };
    Ok(Stmt::expr(call.await_expr()))
}

fn expect(subject: Expr) -> PlanwrightResult<Expr> {
    Ok(Expr::ident("expect")?.call(vec![subject]))
}
