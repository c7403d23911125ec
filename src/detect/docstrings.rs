//! Docstring coverage for Python.
//!
//! Two flavors:
//! - a line-based check used by the review pipeline, which only looks at the
//!   physical line after each `def` header;
//! - an AST audit of functions and classes used by the standalone
//!   docstring endpoint.

use once_cell::sync::Lazy;
use regex::Regex;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor};

use crate::analysis::{is_async_def, parse_python, python_language, Checker, ParsedSource, SourceUnit};
use crate::error::ReviewError;

use super::Finding;

lazy_static::lazy_static! {
    static ref DEF_HEADER_RE: Regex = Regex::new(r"^(?:async\s+)?def\s+\w+\(.*\):").unwrap();
}

const DECLARATION_QUERY: &str = r#"
(function_definition
  name: (identifier) @func_name
  body: (block) @body
) @function

(class_definition
  name: (identifier) @class_name
  body: (block) @body
) @class
"#;

static DECLARATIONS: Lazy<Result<Query, String>> = Lazy::new(|| {
    Query::new(python_language(), DECLARATION_QUERY).map_err(|e| e.to_string())
});

/// Whether a line opens a docstring literal.
fn opens_docstring(line: &str) -> bool {
    let trimmed = line.trim_start();
    let unprefixed = trimmed.trim_start_matches(|c: char| matches!(c, 'r' | 'R' | 'u' | 'U'));
    // Only a short string prefix is allowed before the quotes.
    if trimmed.len() - unprefixed.len() > 1 {
        return false;
    }
    unprefixed.starts_with("\"\"\"") || unprefixed.starts_with("'''")
}

/// Flag `def` headers whose next line is not a docstring.
pub fn detect_missing_docstrings(code: &str) -> Vec<Finding> {
    let lines: Vec<&str> = code.lines().collect();
    let mut findings = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some(header) = DEF_HEADER_RE.find(line.trim()) else {
            continue;
        };
        // A header on the last line has nothing to inspect.
        let Some(next) = lines.get(idx + 1) else {
            continue;
        };
        if !opens_docstring(next) {
            findings.push(Finding::suggestion(format!(
                "✅ Add a docstring to function: `{}`",
                header.as_str().trim()
            )));
        }
    }

    findings
}

/// Checker wrapper for [`detect_missing_docstrings`].
pub struct DocstringChecker;

impl Checker for DocstringChecker {
    fn name(&self) -> &'static str {
        "docstrings"
    }

    fn check(&self, unit: &SourceUnit<'_>) -> Vec<Finding> {
        detect_missing_docstrings(unit.code())
    }
}

/// Whether a block starts with a non-empty docstring.
fn has_docstring(parsed: &ParsedSource, body: Node) -> bool {
    let mut cursor = body.walk();
    let Some(first) = body
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")
    else {
        return false;
    };
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return false;
    }
    let Some(literal) = first.named_child(0) else {
        return false;
    };

    match literal.kind() {
        "concatenated_string" => true,
        "string" => {
            let mut cursor = literal.walk();
            let children: Vec<Node> = literal.named_children(&mut cursor).collect();
            if children.iter().any(|c| c.kind() == "interpolation") {
                return false;
            }
            children
                .iter()
                .filter(|c| c.kind() == "string_content")
                .any(|c| !parsed.node_text(*c).trim().is_empty())
        }
        _ => false,
    }
}

/// Audit every function and class for a docstring.
///
/// Unlike the line-based check this requires valid syntax.
pub fn audit_docstrings(code: &str) -> Result<Vec<String>, ReviewError> {
    let parsed = parse_python(code).map_err(|e| ReviewError::Syntax {
        line: e.line,
        column: e.column,
    })?;
    let query = DECLARATIONS
        .as_ref()
        .map_err(|e| ReviewError::Analysis(format!("declaration query: {}", e)))?;

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, parsed.root(), &parsed.source[..]);
    let mut issues = Vec::new();

    while let Some(m) = matches.next() {
        let mut name = None;
        let mut kind = "Function";
        let mut body = None;
        let mut declaration = None;

        for capture in m.captures {
            match query.capture_names()[capture.index as usize] {
                "func_name" => name = Some(parsed.node_text(capture.node)),
                "class_name" => {
                    name = Some(parsed.node_text(capture.node));
                    kind = "Class";
                }
                "body" => body = Some(capture.node),
                "function" | "class" => declaration = Some(capture.node),
                _ => {}
            }
        }

        let (Some(name), Some(body), Some(declaration)) = (name, body, declaration) else {
            continue;
        };
        if is_async_def(declaration) || has_docstring(&parsed, body) {
            continue;
        }
        issues.push((
            depth(declaration),
            declaration.start_byte(),
            format!("{} '{}' is missing a docstring.", kind, name),
        ));
    }

    // Breadth-first: shallower declarations first, then document order.
    issues.sort_by_key(|(depth, start, _)| (*depth, *start));
    Ok(issues.into_iter().map(|(_, _, issue)| issue).collect())
}

/// Number of ancestors above `node`.
fn depth(node: Node) -> usize {
    std::iter::successors(node.parent(), |n| n.parent()).count()
}
