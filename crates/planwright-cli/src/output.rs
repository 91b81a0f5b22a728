//! Console output for scenario results and page listings

use console::{style, Style, Term};
use planwright::{PageObjectDefinition, ParamType};
use std::fmt::Write as _;

/// Prints status lines to stderr and listings to stdout
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    out: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            out: Term::stdout(),
            use_color,
            quiet,
        }
    }

    fn line(&self, symbol: &str, plain: &str, paint: Style, message: &str) {
        let prefix = if self.use_color {
            paint.apply_to(symbol).to_string()
        } else {
            plain.to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.line("✓", "OK", Style::new().green().bold(), message);
        }
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        self.line("✗", "FAIL", Style::new().red().bold(), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            self.line("⚠", "WARN", Style::new().yellow().bold(), message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.line("ℹ", "INFO", Style::new().blue().bold(), message);
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print the run summary; `done` names what happened to the successes
    pub fn summary(&self, done: &str, succeeded: usize, failed: usize) {
        if self.quiet && failed == 0 {
            return;
        }
        let total = succeeded + failed;
        let _ = self.term.write_line("");
        let status = if failed > 0 { "FAILED" } else { "OK" };
        let line = if self.use_color {
            let paint = if failed > 0 {
                Style::new().red().bold()
            } else {
                Style::new().green().bold()
            };
            format!(
                "{} {total} scenario(s): {} {done}, {} failed",
                paint.apply_to(status),
                style(succeeded).green(),
                if failed > 0 {
                    style(failed).red().bold().to_string()
                } else {
                    failed.to_string()
                }
            )
        } else {
            format!("{status} {total} scenario(s): {succeeded} {done}, {failed} failed")
        };
        let _ = self.term.write_line(&line);
    }

    /// Write listing output to stdout
    pub fn print(&self, text: &str) {
        let _ = self.out.write_str(text);
    }
}

/// Human-readable page definition
#[must_use]
pub fn render_page(def: &PageObjectDefinition) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", def.name(), def.route().unwrap_or("-"));
    let _ = writeln!(out, "  locators ({}):", def.locator_count());
    for locator in def.locators() {
        let _ = writeln!(out, "    {:<24} {}", locator.name, locator.selector());
    }
    let _ = writeln!(out, "  methods ({}):", def.method_count());
    for method in def.methods() {
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| {
                let ty = match p.ty {
                    ParamType::Text => "string",
                    ParamType::List => "string[]",
                    ParamType::Number => "number",
                };
                format!("{}: {ty}", p.name)
            })
            .collect();
        let kind = if method.is_composite() { "  [composite]" } else { "" };
        let _ = writeln!(out, "    {}({}){kind}", method.name, params.join(", "));
    }
    out
}
