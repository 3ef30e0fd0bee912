//! Console error reports
//!
//! Renders an error as a framed, colorized block on stderr. Rendering is pure
//! and deterministic; printing ignores write failures.

use console::Style;
use std::error::Error as StdError;
use std::io::Write;

use crate::error::Error;

/// Width of the `=` and `-` rules
pub const RULE_WIDTH: usize = 100;

const BANNER: &str = "🚨  ERROR OCCURRED";
const EMPTY_MESSAGE: &str = "<empty message>";

/// Formats and prints error reports
#[derive(Debug, Clone, Copy)]
pub struct ErrorReporter {
    colored: bool,
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter {
    /// Colors on when stderr supports them
    pub fn new() -> Self {
        Self {
            colored: console::colors_enabled_stderr(),
        }
    }

    /// Plain text, no ANSI escapes
    pub fn plain() -> Self {
        Self { colored: false }
    }

    /// Always colored
    pub fn colored() -> Self {
        Self { colored: true }
    }

    fn style(&self, style: Style) -> Style {
        style.force_styling(self.colored)
    }

    /// Render the report for `error`, with an optional context line
    pub fn render(&self, error: &Error, context: Option<&str>) -> String {
        let rule = self.style(Style::new().red());
        let banner = self.style(Style::new().red().bright().bold());
        let context_style = self.style(Style::new().yellow());
        let type_style = self.style(Style::new().cyan());
        let message_style = self.style(Style::new().magenta());
        let header = self.style(Style::new().white().bold());
        let chain_style = self.style(Style::new().black().bright());

        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        let mut lines = vec![
            String::new(),
            rule.apply_to(&heavy).to_string(),
            banner.apply_to(BANNER).to_string(),
        ];
        if let Some(context) = context.map(sanitize).filter(|c| c != EMPTY_MESSAGE) {
            lines.push(context_style.apply_to(format!("Context: {}", context)).to_string());
        }
        lines.push(rule.apply_to(&light).to_string());
        lines.push(type_style.apply_to(format!("Type: {}", error.kind())).to_string());
        lines.push(
            message_style
                .apply_to(format!("Message: {}", sanitize(&error.to_string())))
                .to_string(),
        );
        lines.push(rule.apply_to(&light).to_string());
        lines.push(header.apply_to("Error chain (outermost first):").to_string());
        lines.push(String::new());

        for (depth, message) in error_chain(error).iter().enumerate() {
            for (i, line) in sanitize(message).lines().enumerate() {
                let text = if i == 0 {
                    format!("{}: {}", depth, line)
                } else {
                    format!("   {}", line)
                };
                lines.push(format!("  {}", chain_style.apply_to(text)));
            }
        }

        lines.push(rule.apply_to(&heavy).to_string());
        lines.push(String::new());

        lines.join("\n")
    }

    /// Print the report to stderr
    pub fn report(&self, error: &Error, context: Option<&str>) {
        let text = self.render(error, context);
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        let _ = writeln!(handle, "{}", text);
        let _ = handle.flush();
    }
}

/// Messages from `error` down through its sources
fn error_chain(error: &Error) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut current: Option<&(dyn StdError + 'static)> = error.source();
    while let Some(source) = current {
        chain.push(source.to_string());
        current = source.source();
    }
    chain
}

/// Escape control characters other than newline and tab; name empty text
fn sanitize(text: &str) -> String {
    if text.trim().is_empty() {
        return EMPTY_MESSAGE.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() && c != '\n' && c != '\t' {
            out.extend(c.escape_unicode());
        } else {
            out.push(c);
        }
    }
    out
}
