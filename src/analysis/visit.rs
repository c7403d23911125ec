//! Iterative pre-order walker with enter/leave callbacks.

use tree_sitter::Node;

/// What the walker should do after entering a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Descend into the node's children.
    Continue,
    /// Do not descend; move on to the next sibling.
    SkipChildren,
    /// Abort the walk entirely.
    Stop,
}

/// A tree visitor.
///
/// Implementations match on `node.kind()` in [`Visitor::enter`]; `leave` is
/// called once all children of a node have been visited (or skipped), which
/// lets visitors keep depth counters balanced.
pub trait Visitor<'t> {
    fn enter(&mut self, node: Node<'t>) -> Flow;

    fn leave(&mut self, _node: Node<'t>) {}
}

/// Walk `root` and its descendants in pre-order.
///
/// Uses a `TreeCursor` instead of recursion; the cursor never leaves the
/// subtree rooted at `root`.
pub fn walk<'t, V: Visitor<'t> + ?Sized>(root: Node<'t>, visitor: &mut V) {
    let mut cursor = root.walk();
    let mut depth = 0usize;

    loop {
        let node = cursor.node();
        match visitor.enter(node) {
            Flow::Stop => return,
            Flow::Continue => {
                if cursor.goto_first_child() {
                    depth += 1;
                    continue;
                }
            }
            Flow::SkipChildren => {}
        }
        visitor.leave(node);

        loop {
            if depth == 0 {
                return;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            cursor.goto_parent();
            depth -= 1;
            visitor.leave(cursor.node());
        }
    }
}

struct FnVisitor<F>(F);

impl<'t, F: FnMut(Node<'t>) -> Flow> Visitor<'t> for FnVisitor<F> {
    fn enter(&mut self, node: Node<'t>) -> Flow {
        (self.0)(node)
    }
}

/// Walk with a closure instead of a visitor type.
pub fn for_each_node<'t, F: FnMut(Node<'t>) -> Flow>(root: Node<'t>, f: F) {
    walk(root, &mut FnVisitor(f));
}
