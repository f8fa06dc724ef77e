//! The trail: a LIFO stack of ancestors from the root to the node currently
//! being resolved. Provides scope lookup (`find`) and in-scope rewrite
//! insertion (`add_before_in_scope`).

use emberc_ast::{Ast, Node, NodeId};

/// A stack of node ids, top is the deepest (currently-resolving) node.
#[derive(Debug, Default)]
pub struct Trail {
    stack: Vec<NodeId>,
}

impl Trail {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, node: NodeId) {
        self.stack.push(node);
    }

    /// Pop the top of the trail, asserting it is `node`. Every `push` must
    /// be paired with a matching `pop` on every exit path of `resolve`.
    pub fn pop(&mut self, node: NodeId) {
        let top = self.stack.pop();
        assert_eq!(
            top,
            Some(node),
            "trail imbalance: expected to pop {node:?}, found {top:?}"
        );
    }

    /// The k-th ancestor from the top, 1-indexed (`peek(1)` is the direct parent).
    pub fn peek(&self, k: usize) -> Option<NodeId> {
        if k == 0 || k > self.stack.len() {
            return None;
        }
        self.stack.get(self.stack.len() - k).copied()
    }

    /// Index (from the bottom) of the nearest ancestor for which `pred`
    /// holds, searching from `from_idx` (inclusive) down to the root.
    pub fn find(&self, from_idx: Option<usize>, ast: &Ast, pred: impl Fn(&Node) -> bool) -> Option<usize> {
        let start = from_idx.unwrap_or(self.stack.len().saturating_sub(1));
        for idx in (0..=start.min(self.stack.len().saturating_sub(1))).rev() {
            if pred(ast.get(self.stack[idx])) {
                return Some(idx);
            }
        }
        None
    }

    pub fn get(&self, idx: usize) -> Option<NodeId> {
        self.stack.get(idx).copied()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.stack.iter().copied()
    }

    /// Walk upward for the first scope (`Block`/`InlineContext`/`CommaSequence`)
    /// and insert `stmt` immediately before the subtree that reaches `anchor`.
    /// Returns whether a host scope was found and the splice succeeded.
    pub fn add_before_in_scope(&self, ast: &mut Ast, anchor: NodeId, stmt: NodeId) -> bool {
        for idx in (0..self.stack.len()).rev() {
            let scope_id = self.stack[idx];
            if !ast.get(scope_id).is_scope() {
                continue;
            }
            // The child of this scope that leads toward `anchor` is the
            // next entry down the trail, or `anchor` itself if the scope
            // is its direct parent.
            let child_toward_anchor = self.stack.get(idx + 1).copied().unwrap_or(anchor);
            if let Node::Expr(emberc_ast::Expr::Block(block)) = ast.get_mut(scope_id) {
                if let Some(pos) = block.stmts.iter().position(|s| *s == child_toward_anchor) {
                    block.stmts.insert(pos, stmt);
                    return true;
                }
                // Anchor is the scope's trailing expression rather than a
                // statement in its list: insert at the end.
                block.stmts.push(stmt);
                return true;
            }
            if let Node::Expr(emberc_ast::Expr::InlineContext(ctx)) = ast.get_mut(scope_id) {
                if let Some(pos) = ctx.stmts.iter().position(|s| *s == child_toward_anchor) {
                    ctx.stmts.insert(pos, stmt);
                    return true;
                }
                ctx.stmts.push(stmt);
                return true;
            }
        }
        false
    }
}
