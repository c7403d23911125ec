//! Turns raw checker phrases into user-facing messages.
//!
//! Each rule pairs a key substring with a template. Rules are tried in
//! order; the first match wins and unmatched text passes through as-is.
//! No template contains the key of a rule ahead of (or other than) its own,
//! so formatting is idempotent.
//!
//! Findings quote user code between backticks and identifiers between
//! single quotes. Keys are matched outside backtick spans only, and no key
//! can be spelled by a bare identifier.

use std::borrow::Cow;

/// A key substring and the message that replaces any text containing it.
struct Rule {
    key: &'static str,
    template: &'static str,
}

static RULES: &[Rule] = &[
    // Style checker phrases
    Rule {
        key: "exceeds 79 characters",
        template: "📏 Line too long: Try keeping lines under 79 characters for better readability.",
    },
    Rule {
        key: "tab character",
        template: "🔧 Replace tab characters with 4 spaces for consistent indentation.",
    },
    Rule {
        key: "Add a space after '#'",
        template: "💡 Consider adding a space after '#' to improve comment readability.",
    },
    Rule {
        key: "File should end with a newline",
        template: "📄 Add a newline at the end of the file to follow POSIX standards.",
    },
    Rule {
        key: "' to follow snake_case.",
        template: "🔧 Rename variable or function to snake_case for consistency.",
    },
    Rule {
        key: "Indentation not a multiple of 4",
        template: "⚠️ Use consistent indentation of 4 spaces.",
    },
    // Lint codes
    Rule {
        key: "missing-function-docstring",
        template: "✏️ Add a docstring to describe the function’s purpose.",
    },
    Rule {
        key: "unused-import",
        template: "🧹 Remove unused import to keep the code clean.",
    },
    Rule {
        key: "line-too-long",
        template: "📏 Break long lines to keep under 79 characters.",
    },
    Rule {
        key: "invalid-name",
        template: "🔤 Consider renaming variables to follow naming conventions.",
    },
];

/// The parts of `raw` outside backtick-quoted code spans.
///
/// An unterminated span runs to the end of the text.
fn unquoted(raw: &str) -> Cow<'_, str> {
    if !raw.contains('`') {
        return Cow::Borrowed(raw);
    }
    let text = raw
        .split('`')
        .step_by(2)
        .collect::<Vec<_>>()
        .join(" ");
    Cow::Owned(text)
}

/// Format a single raw finding.
pub fn format_issue(raw: &str) -> String {
    let searchable = unquoted(raw);
    RULES
        .iter()
        .find(|rule| searchable.contains(rule.key))
        .map(|rule| rule.template.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Format a list of raw findings, preserving order.
pub fn format_issues<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter().map(|s| format_issue(s.as_ref())).collect()
}

/// All message templates, in rule order.
pub fn templates() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|rule| rule.template)
}

/// Whether a message is one of the formatter's templates.
pub fn is_template(message: &str) -> bool {
    RULES.iter().any(|rule| rule.template == message)
}
