//! emberc-ast - AST node model
//!
//! Defines the sum-typed `Node` the resolver core operates over: a flat
//! arena (`Ast`) of `Expr` / `Decl` / `TypeExpr` nodes addressed by
//! `NodeId`, so back-references (`FunctionCall.reference -> FunctionDecl`,
//! `TypeDecl.meta <-> TypeDecl`) are plain indices rather than owning
//! pointers.
//!
//! Lexing and parsing that produce an `Ast` from source text are external
//! collaborators (`emberc-lex` supplies tokens); this crate only defines
//! the tree shape the resolver consumes and mutates.

mod ast;
mod expr;
mod items;
mod types;

#[cfg(test)]
mod edge_cases;

pub use ast::{Ast, Node, NodeId};
pub use expr::{
    AddressOf, BinOpKind, BinaryOp, Block, BoolLiteral, Cast, CommaSequence, Expr, FloatLiteral,
    FunctionCall, InlineContext, IntLiteral, NullLiteral, Return, StringLiteral, StructLiteral,
    TypeAccess, VariableAccess, VariableDecl,
};
pub use items::{
    Argument, Decl, FunctionDecl, ImplicitConvDecl, InterfaceDecl, NamespaceDecl, TypeDecl,
    VarArgDecl,
};
pub use types::{AnonStructField, AnonymousStructType, BaseType, FuncType, SugarKind, SugarType, TypeExpr, TypeList};
