//! Python parsing via tree-sitter.

use once_cell::sync::Lazy;
use tree_sitter::{Language, Node, Parser, Tree};

use super::visit::{for_each_node, Flow};

static PYTHON: Lazy<Language> = Lazy::new(|| tree_sitter_python::LANGUAGE.into());

/// The tree-sitter grammar for Python.
pub fn python_language() -> &'static Language {
    &PYTHON
}

/// A successfully parsed snippet.
///
/// Keeps the source bytes next to the tree so node text can be sliced
/// without re-reading the input.
pub struct ParsedSource {
    /// The tree-sitter parse tree.
    pub tree: Tree,
    /// The source bytes the tree was built from.
    pub source: Vec<u8>,
}

impl ParsedSource {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// Why a snippet has no usable syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-indexed line of the first error node.
    pub line: usize,
    /// 1-indexed column of the first error node.
    pub column: usize,
    pub reason: String,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (line {}, column {})", self.reason, self.line, self.column)
    }
}

impl std::error::Error for SyntaxError {}

/// Parse Python source.
///
/// tree-sitter always produces a tree; one that contains ERROR or MISSING
/// nodes is treated as unparseable, matching what a strict compiler would
/// reject. The grammar also accepts the Python 2 `print` and `exec`
/// statements, which Python 3 rejects.
pub fn parse_python(code: &str) -> Result<ParsedSource, SyntaxError> {
    let mut parser = Parser::new();
    parser.set_language(python_language()).map_err(|e| SyntaxError {
        line: 1,
        column: 1,
        reason: format!("python grammar unavailable: {}", e),
    })?;

    let tree = parser.parse(code, None).ok_or_else(|| SyntaxError {
        line: 1,
        column: 1,
        reason: "parser produced no tree".to_string(),
    })?;

    if tree.root_node().has_error() {
        let (line, column) = first_error_position(tree.root_node());
        return Err(SyntaxError {
            line,
            column,
            reason: "invalid syntax".to_string(),
        });
    }

    if let Some((kind, line, column)) = first_legacy_statement(tree.root_node()) {
        return Err(SyntaxError {
            line,
            column,
            reason: format!("python 2 {} is not valid python 3", kind),
        });
    }

    Ok(ParsedSource {
        tree,
        source: code.as_bytes().to_vec(),
    })
}

/// Whether a `function_definition` node is an `async def`.
pub fn is_async_def(node: Node) -> bool {
    node.kind() == "function_definition" && node.child(0).is_some_and(|c| c.kind() == "async")
}

/// The first Python 2 only statement, with its 1-indexed position.
fn first_legacy_statement(root: Node) -> Option<(&'static str, usize, usize)> {
    let mut found = None;
    for_each_node(root, |node| {
        let kind = match node.kind() {
            "print_statement" => "print statement",
            "exec_statement" => "exec statement",
            _ => return Flow::Continue,
        };
        let pos = node.start_position();
        found = Some((kind, pos.row + 1, pos.column + 1));
        Flow::Stop
    });
    found
}

fn first_error_position(root: Node) -> (usize, usize) {
    let mut found = None;
    for_each_node(root, |node| {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            found = Some((pos.row + 1, pos.column + 1));
            return Flow::Stop;
        }
        if node.has_error() {
            Flow::Continue
        } else {
            Flow::SkipChildren
        }
    });
    found.unwrap_or((1, 1))
}
