//! Expression node variants.
//!
//! `FunctionCall` is the central entity the resolver core spends most of its
//! effort on (overload scoring, generic inference, the eight call-site
//! rewrites); its field set mirrors the fixed-point invariants the resolver
//! must uphold across passes.

use std::collections::BTreeMap;

use emberc_util::Symbol;

use crate::ast::NodeId;
use emberc_util::Span;

#[derive(Debug, Clone)]
pub enum Expr {
    VariableAccess(VariableAccess),
    VariableDecl(VariableDecl),
    FunctionCall(FunctionCall),
    AddressOf(AddressOf),
    Cast(Cast),
    BinaryOp(BinaryOp),
    CommaSequence(CommaSequence),
    StructLiteral(StructLiteral),
    IntLiteral(IntLiteral),
    FloatLiteral(FloatLiteral),
    StringLiteral(StringLiteral),
    BoolLiteral(BoolLiteral),
    NullLiteral(NullLiteral),
    Block(Block),
    InlineContext(InlineContext),
    Return(Return),
    TypeAccess(TypeAccess),
}

impl Expr {
    pub fn token(&self) -> Span {
        match self {
            Expr::VariableAccess(n) => n.token,
            Expr::VariableDecl(n) => n.token,
            Expr::FunctionCall(n) => n.token,
            Expr::AddressOf(n) => n.token,
            Expr::Cast(n) => n.token,
            Expr::BinaryOp(n) => n.token,
            Expr::CommaSequence(n) => n.token,
            Expr::StructLiteral(n) => n.token,
            Expr::IntLiteral(n) => n.token,
            Expr::FloatLiteral(n) => n.token,
            Expr::StringLiteral(n) => n.token,
            Expr::BoolLiteral(n) => n.token,
            Expr::NullLiteral(n) => n.token,
            Expr::Block(n) => n.token,
            Expr::InlineContext(n) => n.token,
            Expr::Return(n) => n.token,
            Expr::TypeAccess(n) => n.token,
        }
    }

    /// Substitute the first child pointer equal to `old` with `new`. Mirrors
    /// the source's per-variant `replace` dispatch, generated here as an
    /// exhaustive match instead of virtual dispatch.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
        fn swap(slot: &mut NodeId, old: NodeId, new: NodeId) -> bool {
            if *slot == old {
                *slot = new;
                true
            } else {
                false
            }
        }
        fn swap_opt(slot: &mut Option<NodeId>, old: NodeId, new: NodeId) -> bool {
            if *slot == Some(old) {
                *slot = Some(new);
                true
            } else {
                false
            }
        }
        fn swap_vec(slot: &mut [NodeId], old: NodeId, new: NodeId) -> bool {
            for entry in slot.iter_mut() {
                if *entry == old {
                    *entry = new;
                    return true;
                }
            }
            false
        }

        match self {
            Expr::VariableAccess(n) => swap_opt(&mut n.reference, old, new),
            Expr::VariableDecl(n) => {
                swap_opt(&mut n.ty, old, new) || swap_opt(&mut n.init, old, new)
            }
            Expr::FunctionCall(n) => {
                swap_opt(&mut n.expr, old, new)
                    || swap_vec(&mut n.args, old, new)
                    || swap_vec(&mut n.type_args, old, new)
                    || n.return_args.iter_mut().any(|a| swap_opt(a, old, new))
                    || swap_opt(&mut n.return_type, old, new)
                    || swap_opt(&mut n.reference, old, new)
            }
            Expr::AddressOf(n) => swap(&mut n.target, old, new),
            Expr::Cast(n) => swap(&mut n.expr, old, new) || swap(&mut n.ty, old, new),
            Expr::BinaryOp(n) => swap(&mut n.left, old, new) || swap(&mut n.right, old, new),
            Expr::CommaSequence(n) => {
                swap(&mut n.first, old, new) || swap(&mut n.second, old, new)
            }
            Expr::StructLiteral(n) => {
                swap(&mut n.ty, old, new) || n.fields.iter_mut().any(|(_, v)| swap(v, old, new))
            }
            Expr::Block(n) => swap_vec(&mut n.stmts, old, new),
            Expr::InlineContext(n) => {
                swap_vec(&mut n.stmts, old, new) || swap_vec(&mut n.return_args, old, new)
            }
            Expr::Return(n) => swap_opt(&mut n.value, old, new),
            Expr::TypeAccess(n) => swap(&mut n.ty, old, new),
            Expr::IntLiteral(_)
            | Expr::FloatLiteral(_)
            | Expr::StringLiteral(_)
            | Expr::BoolLiteral(_)
            | Expr::NullLiteral(_) => false,
        }
    }

    pub fn as_function_call(&self) -> Option<&FunctionCall> {
        match self {
            Expr::FunctionCall(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_function_call_mut(&mut self) -> Option<&mut FunctionCall> {
        match self {
            Expr::FunctionCall(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariableAccess {
    pub name: Option<Symbol>,
    /// Resolved `VariableDecl`/`Argument` this access refers to, once bound.
    pub reference: Option<NodeId>,
    pub token: Span,
}

#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: Symbol,
    pub ty: Option<NodeId>,
    pub init: Option<NodeId>,
    pub is_const: bool,
    pub token: Span,
}

/// The central entity: a call site under resolution.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub expr: Option<NodeId>,
    pub name: Symbol,
    pub suffix: Option<Symbol>,
    pub args: Vec<NodeId>,
    pub type_args: Vec<NodeId>,
    pub return_args: Vec<Option<NodeId>>,
    pub return_type: Option<NodeId>,
    pub reference: Option<NodeId>,
    pub ref_score: i64,
    pub is_virtual: bool,
    /// Snapshot of the pre-cast expression for every arg index currently
    /// wrapped in an implicit-conversion `Cast`, so a better-scoring
    /// candidate can roll the casts back before re-scoring (§4.6 step 3).
    pub args_before_conversion: Option<BTreeMap<usize, NodeId>>,
    pub candidate_uses_as: bool,
    pub token: Span,
}

impl FunctionCall {
    pub const UNSCORED: i64 = i64::MIN;

    pub fn new(name: Symbol, token: Span) -> Self {
        Self {
            expr: None,
            name,
            suffix: None,
            args: Vec::new(),
            type_args: Vec::new(),
            return_args: Vec::new(),
            return_type: None,
            reference: None,
            ref_score: Self::UNSCORED,
            is_virtual: false,
            args_before_conversion: None,
            candidate_uses_as: false,
            token,
        }
    }

    pub fn is_member(&self) -> bool {
        self.expr.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.reference.is_some() && self.ref_score > 0
    }
}

#[derive(Debug, Clone)]
pub struct AddressOf {
    pub target: NodeId,
    pub for_generics: bool,
    pub token: Span,
}

#[derive(Debug, Clone)]
pub struct Cast {
    pub expr: NodeId,
    pub ty: NodeId,
    pub token: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Assign,
}

#[derive(Debug, Clone)]
pub struct BinaryOp {
    pub op: BinOpKind,
    pub left: NodeId,
    pub right: NodeId,
    pub token: Span,
}

/// `(first, second)` — used by the generic-return-unwrapping rewrite to
/// splice a call and a follow-up access to its out-param into one expression.
#[derive(Debug, Clone)]
pub struct CommaSequence {
    pub first: NodeId,
    pub second: NodeId,
    pub token: Span,
}

#[derive(Debug, Clone)]
pub struct StructLiteral {
    pub ty: NodeId,
    pub fields: Vec<(Option<Symbol>, NodeId)>,
    pub token: Span,
}

#[derive(Debug, Clone)]
pub struct IntLiteral {
    pub value: i64,
    pub token: Span,
}

#[derive(Debug, Clone)]
pub struct FloatLiteral {
    pub value: f64,
    pub token: Span,
}

#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub value: Symbol,
    pub token: Span,
}

#[derive(Debug, Clone)]
pub struct BoolLiteral {
    pub value: bool,
    pub token: Span,
}

#[derive(Debug, Clone)]
pub struct NullLiteral {
    pub token: Span,
}

/// A scope: linearly holds an ordered statement list that
/// `addBeforeInScope` can splice siblings into.
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<NodeId>,
    pub token: Span,
}

/// The synthetic body spliced in by the inlining rewrite (§4.8 step 1).
#[derive(Debug, Clone)]
pub struct InlineContext {
    pub stmts: Vec<NodeId>,
    pub return_args: Vec<NodeId>,
    pub token: Span,
}

#[derive(Debug, Clone)]
pub struct Return {
    pub value: Option<NodeId>,
    pub token: Span,
}

/// An expression that denotes a type itself (e.g. a bare `Foo` used as a
/// value, for passing types as generic arguments).
#[derive(Debug, Clone)]
pub struct TypeAccess {
    pub ty: NodeId,
    pub token: Span,
}
