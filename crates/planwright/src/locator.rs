//! Named locators and their discovery strategies.
//!
//! A [`Strategy`] describes how Playwright finds an element and renders to
//! the matching `page.getBy*` call. Locators are immutable once created; a
//! page never changes the strategy behind an existing name.

use planwright_ts_gen::prelude::{Expr, Result as TsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How to find one element on a page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Strategy {
    /// ARIA role with optional accessible name
    Role {
        /// ARIA role (`button`, `link`, `heading`, ...)
        role: String,
        /// Accessible name
        name: Option<String>,
    },
    /// Associated label text
    Label {
        /// Label text
        text: String,
    },
    /// Visible text
    Text {
        /// Text content
        text: String,
    },
    /// `data-testid` attribute
    TestId {
        /// Test ID
        id: String,
    },
    /// Input placeholder
    Placeholder {
        /// Placeholder text
        text: String,
    },
    /// Raw CSS selector
    Css {
        /// CSS selector
        selector: String,
    },
}

impl Strategy {
    /// Create a role strategy with an accessible name
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: Some(name.into()),
        }
    }

    /// Create a label strategy
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label { text: text.into() }
    }

    /// Create a text strategy
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a test ID strategy
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId { id: id.into() }
    }

    /// Create a placeholder strategy
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder { text: text.into() }
    }

    /// Create a CSS strategy
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            selector: selector.into(),
        }
    }

    /// Playwright selector-engine string, as handed to an automation engine
    #[must_use]
    pub fn to_selector(&self) -> String {
        match self {
            Self::Role { role, name: Some(n) } => format!("role={role}[name={n:?}]"),
            Self::Role { role, name: None } => format!("role={role}"),
            Self::Label { text } => format!("label={text:?}"),
            Self::Text { text } => format!("text={text:?}"),
            Self::TestId { id } => format!("data-testid={id}"),
            Self::Placeholder { text } => format!("placeholder={text:?}"),
            Self::Css { selector } => selector.clone(),
        }
    }

    /// `page.getByRole('button', { name: 'Login' })` and friends
    pub fn to_playwright(&self, page: Expr) -> TsResult<Expr> {
        match self {
            Self::Role { role, name } => {
                let mut args = vec![Expr::str(role.as_str())];
                if let Some(n) = name {
                    args.push(Expr::object(vec![("name", Expr::str(n.as_str()))]));
                }
                page.method("getByRole", args)
            }
            Self::Label { text } => page.method("getByLabel", vec![Expr::str(text.as_str())]),
            Self::Text { text } => page.method("getByText", vec![Expr::str(text.as_str())]),
            Self::TestId { id } => page.method("getByTestId", vec![Expr::str(id.as_str())]),
            Self::Placeholder { text } => {
                page.method("getByPlaceholder", vec![Expr::str(text.as_str())])
            }
            Self::Css { selector } => page.method("locator", vec![Expr::str(selector.as_str())]),
        }
    }
}

/// A named element description owned by a page object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// camelCase name, unique within its page
    pub name: String,
    /// How to find the element
    pub strategy: Strategy,
}

impl Locator {
    /// Create a locator
    #[must_use]
    pub fn new(name: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            name: name.into(),
            strategy,
        }
    }

    /// Selector string for the engine
    #[must_use]
    pub fn selector(&self) -> String {
        self.strategy.to_selector()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.strategy.to_selector())
    }
}
