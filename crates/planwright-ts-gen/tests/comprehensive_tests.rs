//! End-to-end printing tests for the shapes planwright emits.

#![allow(clippy::unwrap_used)]

use planwright_ts_gen::prelude::*;
use pretty_assertions::assert_eq;

fn page_object() -> TsModule {
    let class = TsClassBuilder::new("LoginPage")
        .unwrap()
        .exported()
        .readonly_field("page", "Page")
        .unwrap()
        .readonly_field("loginButton", "Locator")
        .unwrap()
        .constructor(
            vec![Param::typed("page", TypeRef::new("Page").unwrap()).unwrap()],
            vec![
                Stmt::this_assign("page", Expr::ident("page").unwrap()).unwrap(),
                Stmt::this_assign(
                    "loginButton",
                    Expr::ident("page")
                        .unwrap()
                        .method(
                            "getByRole",
                            vec![
                                Expr::str("button"),
                                Expr::object(vec![("name", Expr::str("Log in"))]),
                            ],
                        )
                        .unwrap(),
                )
                .unwrap(),
            ],
        )
        .async_method(
            "clickLoginButton",
            vec![],
            vec![Stmt::expr(
                Expr::this()
                    .dot("loginButton")
                    .unwrap()
                    .method("click", vec![])
                    .unwrap()
                    .await_expr(),
            )],
        )
        .unwrap()
        .build();

    TsModuleBuilder::new()
        .import(&[], &["Locator", "Page"], "@playwright/test")
        .unwrap()
        .blank()
        .class(class)
        .build()
}

#[test]
fn page_object_prints_exactly() {
    let expected = "\
import { type Locator, type Page } from '@playwright/test';

export class LoginPage {
  readonly page: Page;
  readonly loginButton: Locator;

  constructor(page: Page) {
    this.page = page;
    this.loginButton = page.getByRole('button', { name: 'Log in' });
  }

  async clickLoginButton() {
    await this.loginButton.click();
  }
}
";
    assert_eq!(generate(&page_object()), expected);
}

#[test]
fn test_file_with_describe_block() {
    let body = vec![
        Stmt::const_decl(
            "loginPage",
            Expr::ident("LoginPage")
                .unwrap()
                .new_expr(vec![Expr::ident("page").unwrap()]),
        )
        .unwrap(),
        Stmt::Blank,
        Stmt::comment("1. Click login"),
        Stmt::expr(
            Expr::ident("loginPage")
                .unwrap()
                .method("clickLoginButton", vec![])
                .unwrap()
                .await_expr(),
        ),
    ];
    let test_call = Expr::ident("test").unwrap().call(vec![
        Expr::str("Valid Login"),
        Expr::async_arrow_destructured(&["page"], body).unwrap(),
    ]);
    let describe = Expr::ident("test")
        .unwrap()
        .method(
            "describe",
            vec![Expr::str("Authentication"), Expr::arrow(vec![Stmt::expr(test_call)])],
        )
        .unwrap();

    let module = TsModuleBuilder::new()
        .metadata(GenerationMetadata {
            tool: "planwright".into(),
            version: "0.1.0".into(),
            notes: vec![("seed".into(), "seed.spec.ts".into())],
        })
        .import(&["test"], &[], "@playwright/test")
        .unwrap()
        .import(&["LoginPage"], &[], "../pages/LoginPage")
        .unwrap()
        .blank()
        .expr(describe)
        .build();

    let expected = "\
// Generated by planwright 0.1.0
// seed: seed.spec.ts

import { test } from '@playwright/test';
import { LoginPage } from '../pages/LoginPage';

test.describe('Authentication', () => {
  test('Valid Login', async ({ page }) => {
    const loginPage = new LoginPage(page);

    // 1. Click login
    await loginPage.clickLoginButton();
  });
});
";
    assert_eq!(generate(&module), expected);
}

#[test]
fn module_serializes_to_json() {
    let module = page_object();
    let json = serde_json::to_string(&module).unwrap();
    let back: TsModule = serde_json::from_str(&json).unwrap();
    assert_eq!(generate(&back), generate(&module));
}

#[test]
fn strings_with_quotes_are_escaped() {
    let module = TsModuleBuilder::new()
        .expr(Expr::ident("say").unwrap().call(vec![Expr::str("it's \"fine\"")]))
        .build();
    assert_eq!(generate(&module), "say('it\\'s \"fine\"');\n");
}
