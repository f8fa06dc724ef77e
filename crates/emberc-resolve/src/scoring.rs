//! Type scoring (§4.5): how well a call-site argument type matches a
//! declared parameter type, and the implicit-conversion table that backs
//! the `UnresolvedCall` "implicit as" hint.

use std::collections::HashMap;

use emberc_ast::{Ast, ImplicitConvDecl, Node, NodeId, SugarKind, TypeExpr};
use emberc_util::Symbol;

/// Types are incompatible outright.
pub const NOLUCK_SCORE: i64 = -1_000_000;

/// Unit score for "strong" feature matches (arity, ownership, suffix).
/// Implementation-defined beyond the >= 1024 floor the scoring space requires.
pub const SCORE_SEED: i64 = 1024;

/// Resolve every occurrence of a generic type parameter in `ty` using the
/// substitution `subst` (formal name -> concrete `NodeId`), returning a new
/// type id if any substitution applied, or `ty` unchanged otherwise.
///
/// Mirrors `realTypize`: after generic inference fills in `typeArgs`, any
/// remaining bare references to a type parameter inside a candidate's
/// signature must be rewritten to the concrete type before scoring.
pub fn real_typize(ast: &Ast, ty: NodeId, subst: &HashMap<Symbol, NodeId>) -> NodeId {
    let Some(name) = ast.get(ty).as_type().and_then(TypeExpr::as_bare_name) else {
        return ty;
    };
    subst.get(&name).copied().unwrap_or(ty)
}

/// Strip `SugarType` reference wrappers (not pointer/array) `n` times,
/// returning the innermost type id reached and how many layers were peeled.
fn strip_references(ast: &Ast, mut ty: NodeId, max: usize) -> (NodeId, usize) {
    let mut peeled = 0;
    while peeled < max {
        match ast.get(ty).as_type() {
            Some(TypeExpr::Sugar(s)) if s.kind == SugarKind::Reference => {
                ty = s.inner;
                peeled += 1;
            }
            _ => break,
        }
    }
    (ty, peeled)
}

/// `callType.getScore(declType)`: how well `call_ty` (the argument's actual
/// type) satisfies `decl_ty` (the declared parameter type).
pub fn get_score(ast: &Ast, call_ty: NodeId, decl_ty: NodeId) -> i64 {
    if call_ty == decl_ty {
        return SCORE_SEED;
    }

    let decl_is_pointer = matches!(
        ast.get(decl_ty).as_type(),
        Some(TypeExpr::Sugar(s)) if s.kind == SugarKind::Pointer
    );
    // Reference collapsing: a reference is transparent against its pointee
    // when the decl side expects a pointer.
    let (call_inner, _) = if decl_is_pointer {
        strip_references(ast, call_ty, 1)
    } else {
        (call_ty, 0)
    };

    let call_node = ast.get(call_inner).as_type();
    let decl_node = ast.get(decl_ty).as_type();

    match (call_node, decl_node) {
        (Some(TypeExpr::Base(c)), Some(TypeExpr::Base(d))) => {
            if c.name == d.name {
                if c.type_args.len() == d.type_args.len() {
                    SCORE_SEED
                } else {
                    // Same base name, arity of type args differs: still a
                    // plausible but narrowing match.
                    -(SCORE_SEED / 4)
                }
            } else {
                NOLUCK_SCORE
            }
        }
        (Some(TypeExpr::Sugar(c)), Some(TypeExpr::Sugar(d))) if c.kind == d.kind => {
            get_score(ast, c.inner, d.inner)
        }
        (Some(TypeExpr::Func(_)), Some(TypeExpr::Func(_))) => SCORE_SEED / 2,
        (Some(TypeExpr::AnonStruct(_)), Some(TypeExpr::AnonStruct(_))) => SCORE_SEED / 2,
        _ => NOLUCK_SCORE,
    }
}

/// Does `type_decl` carry an implicit conversion whose declared function
/// returns exactly `target`? Returns the matching `ImplicitConvDecl`'s
/// function id if so.
pub fn find_implicit_conversion(
    ast: &Ast,
    type_decl_id: NodeId,
    target: NodeId,
) -> Option<NodeId> {
    let Node::Decl(emberc_ast::Decl::Type(td)) = ast.get(type_decl_id) else {
        return None;
    };
    td.implicit_conversions.iter().find_map(|conv: &ImplicitConvDecl| {
        let Node::Decl(emberc_ast::Decl::Function(f)) = ast.get(conv.f_decl) else {
            return None;
        };
        if f.return_type == Some(target) {
            Some(conv.f_decl)
        } else {
            None
        }
    })
}

/// Whether an implicit conversion found via `find_implicit_conversion` is
/// eligible to be *applied* (wrapped in a `Cast`) rather than merely noted
/// for a helpful error: only when the receiving declaration is extern,
/// unless the implementation is configured to allow it everywhere.
pub fn implicit_conversion_applies(decl_is_extern: bool, implicit_as_external_only: bool) -> bool {
    !implicit_as_external_only || decl_is_extern
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberc_ast::BaseType;
    use emberc_util::Span;

    fn base(ast: &mut Ast, name: &str) -> NodeId {
        ast.alloc(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern(name),
            type_args: Vec::new(),
            token: Span::DUMMY,
        })))
    }

    #[test]
    fn identity_scores_seed() {
        let mut ast = Ast::new(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern("Int"),
            type_args: Vec::new(),
            token: Span::DUMMY,
        })));
        let int_ty = ast.root;
        assert_eq!(get_score(&ast, int_ty, int_ty), SCORE_SEED);
    }

    #[test]
    fn mismatched_base_types_are_noluck() {
        let mut ast = Ast::new(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern("Int"),
            type_args: Vec::new(),
            token: Span::DUMMY,
        })));
        let int_ty = ast.root;
        let str_ty = base(&mut ast, "String");
        assert_eq!(get_score(&ast, int_ty, str_ty), NOLUCK_SCORE);
    }

    #[test]
    fn reference_collapses_against_pointer_decl() {
        let mut ast = Ast::new(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern("Int"),
            type_args: Vec::new(),
            token: Span::DUMMY,
        })));
        let int_ty = ast.root;
        let reference = ast.alloc(Node::Type(TypeExpr::Sugar(emberc_ast::SugarType {
            kind: SugarKind::Reference,
            inner: int_ty,
            token: Span::DUMMY,
        })));
        let pointer_decl = ast.alloc(Node::Type(TypeExpr::Sugar(emberc_ast::SugarType {
            kind: SugarKind::Pointer,
            inner: int_ty,
            token: Span::DUMMY,
        })));
        assert_eq!(get_score(&ast, reference, pointer_decl), SCORE_SEED);
    }

    #[test]
    fn implicit_conversion_requires_extern_by_default() {
        assert!(implicit_conversion_applies(true, true));
        assert!(!implicit_conversion_applies(false, true));
        assert!(implicit_conversion_applies(false, false));
    }
}
