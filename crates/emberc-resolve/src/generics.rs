//! Generic type-argument inference (§4.7): given a formal type-parameter
//! name and the trail, resolve it to a concrete type.

use emberc_ast::{Ast, Decl, Expr, FuncType, Node, NodeId, SugarKind, TypeExpr};
use emberc_util::Symbol;

use crate::trail::Trail;

/// Outcome of a single `resolve_type_arg` search. Replaces the source's
/// overloaded `-1` sentinel with a distinct "try again next pass" variant,
/// per the documented fix to the `finalScore == -1` typo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgResolution {
    Resolved(NodeId),
    NeedsAnotherPass,
}

impl TypeArgResolution {
    pub fn resolved(self) -> Option<NodeId> {
        match self {
            TypeArgResolution::Resolved(ty) => Some(ty),
            TypeArgResolution::NeedsAnotherPass => None,
        }
    }
}

/// Strip `SugarType` wrappers (any kind) from `ty`, `depth` times, returning
/// the remaining type id and how many layers were actually peeled.
fn strip_wrappers(ast: &Ast, mut ty: NodeId, depth: usize) -> (NodeId, usize) {
    let mut peeled = 0;
    while peeled < depth {
        match ast.get(ty).as_type() {
            Some(TypeExpr::Sugar(s)) => {
                ty = s.inner;
                peeled += 1;
            }
            _ => break,
        }
    }
    (ty, peeled)
}

fn wrapper_depth(ast: &Ast, mut ty: NodeId) -> usize {
    let mut depth = 0;
    while let Some(TypeExpr::Sugar(s)) = ast.get(ty).as_type() {
        ty = s.inner;
        depth += 1;
    }
    depth
}

/// Search a constructed type's own `typeArgs` for `param`, recursing through
/// `OtherType<P>`-shaped declared types.
fn search_type_arg_in(ast: &Ast, ty: NodeId, param: Symbol) -> Option<NodeId> {
    match ast.get(ty).as_type()? {
        TypeExpr::Base(b) => b.type_args.iter().find_map(|&arg| {
            if ast.get(arg).as_type().and_then(TypeExpr::as_bare_name) == Some(param) {
                Some(arg)
            } else {
                search_type_arg_in(ast, arg, param)
            }
        }),
        TypeExpr::Sugar(s) => search_type_arg_in(ast, s.inner, param),
        TypeExpr::List(l) => l.items.iter().find_map(|&i| search_type_arg_in(ast, i, param)),
        _ => None,
    }
}

/// `resolveTypeArg`: resolve formal type parameter `param` of the function
/// declaration `decl_id` (the resolved candidate `ref`) against the live
/// call `call_id`, per the search order in §4.7.
pub fn resolve_type_arg(
    ast: &Ast,
    trail: &Trail,
    decl_id: NodeId,
    call_id: NodeId,
    param: Symbol,
) -> TypeArgResolution {
    let Node::Decl(Decl::Function(decl)) = ast.get(decl_id) else {
        return TypeArgResolution::NeedsAnotherPass;
    };

    // 1. Explicit generic constraint on the candidate.
    if let Some(constraints) = &decl.generic_constraints {
        if let Some(&ty) = constraints.get(&param) {
            return TypeArgResolution::Resolved(ty);
        }
    }

    // 2. Declared on the candidate's own formal typeArgs: scan args in order.
    if decl.type_args.contains(&param) {
        let Node::Expr(Expr::FunctionCall(call)) = ast.get(call_id) else {
            return TypeArgResolution::NeedsAnotherPass;
        };
        for (i, &decl_arg_id) in decl.args.iter().enumerate() {
            let Some(decl_arg_ty) = declared_arg_type(ast, decl_arg_id) else {
                continue;
            };
            let depth = wrapper_depth(ast, decl_arg_ty);
            let (inner_decl_ty, _) = strip_wrappers(ast, decl_arg_ty, depth);

            if ast.get(inner_decl_ty).as_type().and_then(TypeExpr::as_bare_name) == Some(param) {
                let Some(&call_arg_id) = call.args.get(i) else {
                    continue;
                };
                let Some(call_arg_ty) = expr_type(ast, call_arg_id) else {
                    return TypeArgResolution::NeedsAnotherPass;
                };
                let (call_inner, call_peeled) = strip_wrappers(ast, call_arg_ty, depth);
                if call_peeled == depth {
                    return TypeArgResolution::Resolved(call_inner);
                }
                continue;
            }

            if let Some(TypeExpr::Func(FuncType { return_type: Some(ret), .. })) =
                ast.get(decl_arg_ty).as_type()
            {
                if ast.get(*ret).as_type().and_then(TypeExpr::as_bare_name) == Some(param) {
                    let Some(&call_arg_id) = call.args.get(i) else {
                        continue;
                    };
                    if let Node::Decl(Decl::Function(callee_fn)) = ast.get(call_arg_id) {
                        if let Some(inferred) = callee_fn.inferred_return_type {
                            return TypeArgResolution::Resolved(inferred);
                        }
                    }
                    return TypeArgResolution::NeedsAnotherPass;
                }
            }

            if arg_name(ast, decl_arg_id) == Some(param) && is_class_typed(ast, decl_arg_ty) {
                let Some(&call_arg_id) = call.args.get(i) else {
                    continue;
                };
                if let Some(ty) = type_valued_arg(ast, call_arg_id) {
                    return TypeArgResolution::Resolved(ty);
                }
                return TypeArgResolution::NeedsAnotherPass;
            }

            if let Some(found) = search_type_arg_in(ast, decl_arg_ty, param) {
                return TypeArgResolution::Resolved(found);
            }
        }
    }

    // 3. Receiver-based inference. The receiver's static type carries the
    // concrete type arguments the call inherits; match `param` against the
    // owning `TypeDecl`'s own formal `typeArgs` by position to translate a
    // literal `T` into the concrete type the receiver was instantiated with.
    if let Node::Expr(Expr::FunctionCall(call)) = ast.get(call_id) {
        if let Some(recv) = call.expr {
            if let Some(recv_ty) = expr_type(ast, recv) {
                if let Some(found) = search_type_arg_in(ast, recv_ty, param) {
                    return TypeArgResolution::Resolved(found);
                }
                if let Some(TypeExpr::Base(b)) = ast.get(recv_ty).as_type() {
                    if let Some(owner_id) = decl.owner {
                        if let Node::Decl(Decl::Type(owner_td)) = ast.get(owner_id) {
                            if let Some(pos) = owner_td.type_args.iter().position(|&p| p == param) {
                                if let Some(&concrete) = b.type_args.get(pos) {
                                    return TypeArgResolution::Resolved(concrete);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    // 4. Walk the trail upward: nearest TypeDecl, then enclosing FunctionDecls.
    for idx in trail.iter().collect::<Vec<_>>().into_iter().rev() {
        match ast.get(idx) {
            Node::Decl(Decl::Type(td)) => {
                if td.type_args.contains(&param) {
                    if let Some(inst) = td.instance_type {
                        if let Some(found) = search_type_arg_in(ast, inst, param) {
                            return TypeArgResolution::Resolved(found);
                        }
                    }
                }
            }
            Node::Decl(Decl::Function(fd)) => {
                if let Some(constraints) = &fd.generic_constraints {
                    if let Some(&ty) = constraints.get(&param) {
                        return TypeArgResolution::Resolved(ty);
                    }
                }
            }
            _ => {}
        }
    }

    TypeArgResolution::NeedsAnotherPass
}

fn declared_arg_type(ast: &Ast, arg_id: NodeId) -> Option<NodeId> {
    match ast.get(arg_id) {
        Node::Decl(Decl::Argument(a)) => Some(a.ty),
        Node::Decl(Decl::VarArg(v)) => v.elem_type,
        _ => None,
    }
}

fn arg_name(ast: &Ast, arg_id: NodeId) -> Option<Symbol> {
    match ast.get(arg_id) {
        Node::Decl(Decl::Argument(a)) => Some(a.name),
        Node::Decl(Decl::VarArg(v)) => Some(v.name),
        _ => None,
    }
}

fn is_class_typed(ast: &Ast, ty: NodeId) -> bool {
    matches!(ast.get(ty).as_type(), Some(TypeExpr::Base(b)) if b.name.as_str() == "Class")
}

/// A call argument used as a type value: a bare `VariableAccess` whose
/// referent is a `TypeDecl`, a `TypeAccess`, or a type node directly.
fn type_valued_arg(ast: &Ast, expr_id: NodeId) -> Option<NodeId> {
    match ast.get(expr_id) {
        Node::Expr(Expr::VariableAccess(va)) => va.reference,
        Node::Expr(Expr::TypeAccess(ta)) => Some(ta.ty),
        Node::Type(_) => Some(expr_id),
        _ => None,
    }
}

/// Best-effort static type of an expression, used by inference to compare
/// against declared parameter types. Resolution-complete expressions carry
/// their type directly; this only covers the shapes §4.7 needs.
pub fn expr_type(ast: &Ast, expr_id: NodeId) -> Option<NodeId> {
    match ast.get(expr_id) {
        Node::Expr(Expr::FunctionCall(call)) => call.return_type,
        Node::Expr(Expr::VariableAccess(va)) => va.reference.and_then(|r| match ast.get(r) {
            Node::Decl(Decl::Argument(a)) => Some(a.ty),
            Node::Expr(Expr::VariableDecl(vd)) => vd.ty,
            _ => None,
        }),
        Node::Expr(Expr::TypeAccess(ta)) => Some(ta.ty),
        Node::Expr(Expr::Cast(c)) => Some(c.ty),
        _ => None,
    }
}

/// Every declared type argument on `call` has been filled (§4.8 step 2's
/// stopping condition).
pub fn generics_fully_inferred(ast: &Ast, decl_id: NodeId, call_id: NodeId) -> bool {
    let (Node::Decl(Decl::Function(decl)), Node::Expr(Expr::FunctionCall(call))) =
        (ast.get(decl_id), ast.get(call_id))
    else {
        return true;
    };
    call.type_args.len() >= decl.type_args.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberc_ast::{Argument, BaseType, FunctionCall, FunctionDecl, VariableAccess};
    use emberc_util::Span;
    use indexmap::IndexMap;

    #[test]
    fn explicit_constraint_wins_first() {
        let mut ast = Ast::new(Node::Decl(Decl::Function(FunctionDecl::new(
            Symbol::intern("f"),
            Span::DUMMY,
        ))));
        let int_ty = ast.alloc(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern("Int"),
            type_args: Vec::new(),
            token: Span::DUMMY,
        })));
        let mut constraints = IndexMap::new();
        constraints.insert(Symbol::intern("T"), int_ty);
        if let Node::Decl(Decl::Function(f)) = ast.get_mut(ast.root) {
            f.type_args.push(Symbol::intern("T"));
            f.generic_constraints = Some(constraints);
        }
        let call = ast.alloc(Node::Expr(Expr::FunctionCall(FunctionCall::new(
            Symbol::intern("f"),
            Span::DUMMY,
        ))));
        let trail = Trail::new();
        let resolution = resolve_type_arg(&ast, &trail, ast.root, call, Symbol::intern("T"));
        assert_eq!(resolution, TypeArgResolution::Resolved(int_ty));
    }

    #[test]
    fn inference_from_matching_arg_type() {
        let mut ast = Ast::new(Node::Decl(Decl::Function(FunctionDecl::new(
            Symbol::intern("identity"),
            Span::DUMMY,
        ))));
        let t_ty = ast.alloc(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern("T"),
            type_args: Vec::new(),
            token: Span::DUMMY,
        })));
        let arg_decl = ast.alloc(Node::Decl(Decl::Argument(Argument {
            name: Symbol::intern("x"),
            ty: t_ty,
            default: None,
            token: Span::DUMMY,
        })));
        if let Node::Decl(Decl::Function(f)) = ast.get_mut(ast.root) {
            f.type_args.push(Symbol::intern("T"));
            f.args.push(arg_decl);
        }

        let int_ty = ast.alloc(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern("Int"),
            type_args: Vec::new(),
            token: Span::DUMMY,
        })));
        let param_decl = ast.alloc(Node::Decl(Decl::Argument(Argument {
            name: Symbol::intern("x"),
            ty: int_ty,
            default: None,
            token: Span::DUMMY,
        })));
        let call_arg = ast.alloc(Node::Expr(Expr::VariableAccess(VariableAccess {
            name: Some(Symbol::intern("v")),
            reference: Some(param_decl),
            token: Span::DUMMY,
        })));
        let mut call = FunctionCall::new(Symbol::intern("identity"), Span::DUMMY);
        call.args.push(call_arg);
        let call_id = ast.alloc(Node::Expr(Expr::FunctionCall(call)));

        let trail = Trail::new();
        let resolution = resolve_type_arg(&ast, &trail, ast.root, call_id, Symbol::intern("T"));
        assert_eq!(resolution, TypeArgResolution::Resolved(int_ty));
    }

    #[test]
    fn unfindable_param_needs_another_pass() {
        let mut ast = Ast::new(Node::Decl(Decl::Function(FunctionDecl::new(
            Symbol::intern("f"),
            Span::DUMMY,
        ))));
        let call_id = ast.alloc(Node::Expr(Expr::FunctionCall(FunctionCall::new(
            Symbol::intern("f"),
            Span::DUMMY,
        ))));
        let trail = Trail::new();
        let resolution = resolve_type_arg(&ast, &trail, ast.root, call_id, Symbol::intern("U"));
        assert_eq!(resolution, TypeArgResolution::NeedsAnotherPass);
    }
}
