//! emberc-ast - AST node arena and sum-typed `Node` definitions.
//!
//! Every AST entity is one of a closed set of variants (`Node`). Rather than
//! model the tree as owning `Box<Node>` children, nodes live in a single
//! typed arena (`Ast`) and reference each other by `NodeId`; this sidesteps
//! the ownership cycles that `FunctionCall.ref -> FunctionDecl` and
//! `TypeDecl.meta <-> TypeDecl` would otherwise create.

use emberc_util::{define_idx, IndexVec, Span};

use crate::expr::Expr;
use crate::items::Decl;
use crate::types::TypeExpr;

define_idx!(NodeId);

/// The AST itself: a flat arena of nodes plus the id of the root module/namespace.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: IndexVec<NodeId, Node>,
    pub root: NodeId,
}

impl Ast {
    /// Build an arena whose root is the given node (typically a `NamespaceDecl`).
    pub fn new(root: Node) -> Self {
        let mut nodes = IndexVec::new();
        let root = nodes.push(root);
        Self { nodes, root }
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        self.nodes.get(id).expect("dangling NodeId")
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(id).expect("dangling NodeId")
    }

    pub fn token(&self, id: NodeId) -> Span {
        self.get(id).token()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.indices()
    }
}

/// Every AST entity is one of these three families.
#[derive(Debug, Clone)]
pub enum Node {
    Expr(Expr),
    Decl(Decl),
    Type(TypeExpr),
}

impl Node {
    pub fn token(&self) -> Span {
        match self {
            Node::Expr(e) => e.token(),
            Node::Decl(d) => d.token(),
            Node::Type(t) => t.token(),
        }
    }

    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Node::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_expr_mut(&mut self) -> Option<&mut Expr> {
        match self {
            Node::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_decl(&self) -> Option<&Decl> {
        match self {
            Node::Decl(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_decl_mut(&mut self) -> Option<&mut Decl> {
        match self {
            Node::Decl(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeExpr> {
        match self {
            Node::Type(t) => Some(t),
            _ => None,
        }
    }

    /// Does this node behave as a `Scope` — i.e. does it linearly hold an
    /// ordered statement list that `addBeforeInScope` can splice into?
    pub fn is_scope(&self) -> bool {
        matches!(
            self,
            Node::Expr(Expr::Block(_))
                | Node::Expr(Expr::InlineContext(_))
                | Node::Expr(Expr::CommaSequence(_))
        )
    }

    /// Replace exactly one child pointer that currently equals `old` with
    /// `new`. Returns whether a match was found and replaced.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
        match self {
            Node::Expr(e) => e.replace(old, new),
            Node::Decl(d) => d.replace(old, new),
            Node::Type(t) => t.replace(old, new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{IntLiteral, NullLiteral};

    fn dummy() -> Span {
        Span::DUMMY
    }

    #[test]
    fn arena_round_trips_root() {
        let ast = Ast::new(Node::Expr(Expr::NullLiteral(NullLiteral { token: dummy() })));
        assert_eq!(ast.len(), 1);
        assert!(matches!(ast.get(ast.root), Node::Expr(Expr::NullLiteral(_))));
    }

    #[test]
    fn alloc_returns_distinct_ids() {
        let mut ast = Ast::new(Node::Expr(Expr::NullLiteral(NullLiteral { token: dummy() })));
        let a = ast.alloc(Node::Expr(Expr::IntLiteral(IntLiteral {
            value: 1,
            token: dummy(),
        })));
        let b = ast.alloc(Node::Expr(Expr::IntLiteral(IntLiteral {
            value: 2,
            token: dummy(),
        })));
        assert_ne!(a, b);
        assert_eq!(ast.len(), 3);
    }

    #[test]
    fn block_and_inline_context_are_scopes() {
        let block = Node::Expr(Expr::Block(crate::expr::Block {
            stmts: vec![],
            token: dummy(),
        }));
        assert!(block.is_scope());
    }
}
