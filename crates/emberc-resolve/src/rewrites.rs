//! Call-site desugaring (§4.8): once a call's `ref_score > 0` and its return
//! type is resolved, rewrite the AST into the shape the backend expects.
//! Rewrites are applied in the fixed order below; each one that fires marks
//! the pass unstable so a later pass can observe its result.

use std::collections::HashMap;

use emberc_ast::{
    AddressOf, Ast, BaseType, CommaSequence, Decl, Expr, FunctionCall, IntLiteral, Node, NodeId,
    NullLiteral, StructLiteral, TypeAccess, TypeExpr, VariableAccess, VariableDecl,
};
use emberc_util::Symbol;

use crate::generics::{generics_fully_inferred, resolve_type_arg, TypeArgResolution};
use crate::names::NameGen;
use crate::response::Response;
use crate::scoring::real_typize;
use crate::trail::Trail;

/// §4.8 step 2: hoist non-generic-typed call args into `AddressOf(for_generics)`
/// wrappers for each generic decl parameter, then fill missing `typeArgs` via
/// §4.7 until the call carries as many as the candidate declares.
pub fn handle_generics(
    ast: &mut Ast,
    trail: &Trail,
    names: &NameGen,
    call_id: NodeId,
    decl_id: NodeId,
) -> Response {
    let Node::Decl(Decl::Function(decl)) = ast.get(decl_id) else {
        return Response::Ok;
    };
    if decl.type_args.is_empty() {
        return Response::Ok;
    }
    let decl_args = decl.args.clone();
    let type_param_names: Vec<Symbol> = decl.type_args.clone();

    let Node::Expr(Expr::FunctionCall(call)) = ast.get(call_id) else {
        return Response::Ok;
    };
    let call_args = call.args.clone();

    for (i, &decl_arg_id) in decl_args.iter().enumerate() {
        let Some(&call_arg_id) = call_args.get(i) else {
            continue;
        };
        let declared_generic = matches!(
            ast.get(decl_arg_id).as_decl(),
            Some(Decl::Argument(a)) if ast.get(a.ty).as_type().and_then(TypeExpr::as_bare_name).is_some()
        );
        if !declared_generic {
            continue;
        }
        let already_hoisted = matches!(
            ast.get(call_arg_id).as_expr(),
            Some(Expr::AddressOf(a)) if a.for_generics
        );
        if already_hoisted {
            continue;
        }
        let referencable = matches!(
            ast.get(call_arg_id).as_expr(),
            Some(Expr::VariableAccess(_))
        );
        let target = if referencable {
            call_arg_id
        } else {
            let tmp_name = names.fresh("generic_arg");
            let tmp_decl = ast.alloc(Node::Expr(Expr::VariableDecl(VariableDecl {
                name: tmp_name,
                ty: None,
                init: Some(call_arg_id),
                is_const: true,
                token: ast.token(call_arg_id),
            })));
            if !trail.add_before_in_scope(ast, call_id, tmp_decl) {
                return Response::Loop;
            }
            let access = ast.alloc(Node::Expr(Expr::VariableAccess(VariableAccess {
                name: Some(tmp_name),
                reference: Some(tmp_decl),
                token: ast.token(call_arg_id),
            })));
            access
        };
        let wrapped = ast.alloc(Node::Expr(Expr::AddressOf(AddressOf {
            target,
            for_generics: true,
            token: ast.token(call_arg_id),
        })));
        ast.get_mut(call_id).replace(call_arg_id, wrapped);
    }

    let mut response = Response::Ok;
    loop {
        if generics_fully_inferred(ast, decl_id, call_id) {
            break;
        }
        let Some(next_param) = type_param_names
            .get(
                match ast.get(call_id).as_expr() {
                    Some(Expr::FunctionCall(c)) => c.type_args.len(),
                    _ => break,
                },
            )
            .copied()
        else {
            break;
        };
        match resolve_type_arg(ast, trail, decl_id, call_id, next_param) {
            TypeArgResolution::Resolved(ty) => {
                let is_func = matches!(ast.get(ty).as_type(), Some(TypeExpr::Func(_)));
                let node = if is_func {
                    Node::Expr(Expr::TypeAccess(TypeAccess {
                        ty,
                        token: ast.token(ty),
                    }))
                } else {
                    Node::Expr(Expr::VariableAccess(VariableAccess {
                        name: None,
                        reference: Some(ty),
                        token: ast.token(ty),
                    }))
                };
                let wrapped = ast.alloc(node);
                if let Node::Expr(Expr::FunctionCall(c)) = ast.get_mut(call_id) {
                    c.type_args.push(wrapped);
                }
            }
            TypeArgResolution::NeedsAnotherPass => {
                response = Response::Loop;
                break;
            }
        }
    }
    response
}

/// §4.8 step 3: append default expressions for every declared optional
/// argument the call omitted.
pub fn handle_optargs(ast: &mut Ast, call_id: NodeId, decl_id: NodeId) {
    let Node::Decl(Decl::Function(decl)) = ast.get(decl_id) else {
        return;
    };
    let decl_args = decl.args.clone();
    let Node::Expr(Expr::FunctionCall(call)) = ast.get(call_id) else {
        return;
    };
    let start = call.args.len();

    let mut to_append = Vec::new();
    for &arg_id in decl_args.iter().skip(start) {
        if let Node::Decl(Decl::Argument(a)) = ast.get(arg_id) {
            if let Some(default) = a.default {
                to_append.push(default);
            }
        }
    }

    if let Node::Expr(Expr::FunctionCall(c)) = ast.get_mut(call_id) {
        c.args.extend(to_append);
    }
}

/// §4.8 step 4: box trailing call args destined for a `VarArg` parameter
/// into an `AnonymousStructType` literal plus a `VarArgs` wrapper struct.
pub fn handle_varargs(
    ast: &mut Ast,
    trail: &Trail,
    names: &NameGen,
    call_id: NodeId,
    decl_id: NodeId,
) -> bool {
    let Node::Decl(Decl::Function(decl)) = ast.get(decl_id) else {
        return false;
    };
    let Some(&last_decl_arg) = decl.args.last() else {
        return false;
    };
    if !matches!(ast.get(last_decl_arg), Node::Decl(Decl::VarArg(_))) {
        return false;
    }
    let required = decl.args.len() - 1;

    let Node::Expr(Expr::FunctionCall(call)) = ast.get(call_id) else {
        return false;
    };
    if call.args.len() == required + 1 {
        if let Some(&only) = call.args.last() {
            if let Node::Expr(Expr::VariableAccess(va)) = ast.get(only) {
                if let Some(r) = va.reference {
                    if let Node::Expr(Expr::VariableDecl(vd)) = ast.get(r) {
                        if let Some(ty) = vd.ty {
                            if matches!(
                                ast.get(ty).as_type(),
                                Some(TypeExpr::Base(b)) if b.name.as_str() == "VarArgs"
                            ) {
                                return false;
                            }
                        }
                    }
                }
            }
        }
    }

    let trailing: Vec<NodeId> = call.args[required..].to_vec();
    let n = trailing.len();
    let token = call.token;

    let mut fields = Vec::with_capacity(n);
    let mut struct_values = Vec::with_capacity(n);
    for &arg_id in &trailing {
        let arg_ty = crate::generics::expr_type(ast, arg_id).unwrap_or(arg_id);
        let type_access = ast.alloc(Node::Expr(Expr::TypeAccess(TypeAccess {
            ty: arg_ty,
            token,
        })));
        fields.push(emberc_ast::AnonStructField {
            type_access,
            field_type: arg_ty,
        });
        struct_values.push((None, arg_id));
    }
    let anon_struct_ty = ast.alloc(Node::Type(TypeExpr::AnonStruct(emberc_ast::AnonymousStructType {
        fields,
        token,
    })));

    let args_struct_lit = ast.alloc(Node::Expr(Expr::StructLiteral(StructLiteral {
        ty: anon_struct_ty,
        fields: struct_values,
        token,
    })));
    let args_decl_name = names.fresh("va_args");
    let args_decl = ast.alloc(Node::Expr(Expr::VariableDecl(VariableDecl {
        name: args_decl_name,
        ty: Some(anon_struct_ty),
        init: Some(args_struct_lit),
        is_const: true,
        token,
    })));
    if !trail.add_before_in_scope(ast, call_id, args_decl) {
        return false;
    }

    let args_access = ast.alloc(Node::Expr(Expr::VariableAccess(VariableAccess {
        name: Some(args_decl_name),
        reference: Some(args_decl),
        token,
    })));
    let addr_of_args = ast.alloc(Node::Expr(Expr::AddressOf(AddressOf {
        target: args_access,
        for_generics: false,
        token,
    })));
    let null_lit = ast.alloc(Node::Expr(Expr::NullLiteral(NullLiteral { token })));
    let count_lit = ast.alloc(Node::Expr(Expr::IntLiteral(IntLiteral {
        value: n as i64,
        token,
    })));

    let vararg_ty = ast.alloc(Node::Type(TypeExpr::Base(BaseType {
        name: Symbol::intern("VarArgs"),
        type_args: Vec::new(),
        token,
    })));
    let va_struct_lit = ast.alloc(Node::Expr(Expr::StructLiteral(StructLiteral {
        ty: vararg_ty,
        fields: vec![(None, addr_of_args), (None, null_lit), (None, count_lit)],
        token,
    })));
    let va_decl_name = names.fresh("va");
    let va_decl = ast.alloc(Node::Expr(Expr::VariableDecl(VariableDecl {
        name: va_decl_name,
        ty: Some(vararg_ty),
        init: Some(va_struct_lit),
        is_const: true,
        token,
    })));
    if !trail.add_before_in_scope(ast, call_id, va_decl) {
        return false;
    }
    let va_access = ast.alloc(Node::Expr(Expr::VariableAccess(VariableAccess {
        name: Some(va_decl_name),
        reference: Some(va_decl),
        token,
    })));

    if let Node::Expr(Expr::FunctionCall(c)) = ast.get_mut(call_id) {
        c.args.truncate(required);
        c.args.push(va_access);
    }
    true
}

/// §4.8 step 5: wrap each call arg whose declared parameter type references
/// an interface in a `Cast` to that interface type, unless already equal.
pub fn handle_interfaces(ast: &mut Ast, call_id: NodeId, decl_id: NodeId, interfaces: &[NodeId]) {
    let Node::Decl(Decl::Function(decl)) = ast.get(decl_id) else {
        return;
    };
    let decl_args = decl.args.clone();
    let Node::Expr(Expr::FunctionCall(call)) = ast.get(call_id) else {
        return;
    };
    let call_args = call.args.clone();
    let token = call.token;

    for (i, &decl_arg_id) in decl_args.iter().enumerate() {
        let Some(&call_arg_id) = call_args.get(i) else {
            continue;
        };
        let Node::Decl(Decl::Argument(a)) = ast.get(decl_arg_id) else {
            continue;
        };
        let decl_ty = a.ty;
        let targets_interface = match ast.get(decl_ty).as_type() {
            Some(TypeExpr::Base(b)) => interfaces.iter().any(|&i| {
                matches!(ast.get(i), Node::Decl(Decl::Interface(id)) if id.name == b.name)
            }),
            _ => false,
        };
        if !targets_interface {
            continue;
        }
        let Some(call_arg_ty) = crate::generics::expr_type(ast, call_arg_id) else {
            continue;
        };
        if call_arg_ty == decl_ty {
            continue;
        }
        let cast = ast.alloc(Node::Expr(Expr::Cast(emberc_ast::Cast {
            expr: call_arg_id,
            ty: decl_ty,
            token,
        })));
        if let Node::Expr(Expr::FunctionCall(c)) = ast.get_mut(call_id) {
            c.args[i] = cast;
        }
    }
}

fn node_is_friendly_host(node: &Node) -> bool {
    matches!(
        node,
        Node::Expr(Expr::Block(_))
            | Node::Expr(Expr::InlineContext(_))
            | Node::Expr(Expr::CommaSequence(_))
            | Node::Expr(Expr::VariableDecl(_))
    ) || matches!(
        node,
        Node::Expr(Expr::BinaryOp(b)) if b.op == emberc_ast::BinOpKind::Assign
    )
}

/// §4.8 step 6: if the call returns multiple values and its parent isn't a
/// scope/comma-sequence/let/assignment-rhs, splice a local out of the call
/// and rewrite the call site to a `CommaSequence(call, access)`.
pub fn unwrap_if_needed(
    ast: &mut Ast,
    trail: &Trail,
    names: &NameGen,
    call_id: NodeId,
) -> Response {
    let Node::Expr(Expr::FunctionCall(call)) = ast.get(call_id) else {
        return Response::Ok;
    };
    if call.return_args.is_empty() {
        return Response::Ok;
    }
    let Some(parent_id) = trail.peek(2) else {
        return Response::Ok;
    };
    if node_is_friendly_host(ast.get(parent_id)) {
        return Response::Ok;
    }

    let token = call.token;
    let ret_ty = call.return_type;
    let v_name = names.fresh("ret");
    let v_decl = ast.alloc(Node::Expr(Expr::VariableDecl(VariableDecl {
        name: v_name,
        ty: ret_ty,
        init: None,
        is_const: false,
        token,
    })));
    if !trail.add_before_in_scope(ast, call_id, v_decl) {
        return Response::Loop;
    }
    let access = ast.alloc(Node::Expr(Expr::VariableAccess(VariableAccess {
        name: Some(v_name),
        reference: Some(v_decl),
        token,
    })));
    let comma = ast.alloc(Node::Expr(Expr::CommaSequence(CommaSequence {
        first: call_id,
        second: access,
        token,
    })));
    if !ast.get_mut(parent_id).replace(call_id, comma) {
        return Response::Loop;
    }
    if let Node::Expr(Expr::FunctionCall(c)) = ast.get_mut(call_id) {
        c.return_args.push(Some(access));
    }
    Response::Loop
}

/// §4.8 step 9: `resolveReturnType`. Substitutes free generic parameters in
/// the candidate's declared return type via §4.7, then `realTypize`s any
/// remaining generic `typeArgs`. Returns `None` while more inference is needed.
pub fn resolve_return_type(
    ast: &mut Ast,
    trail: &Trail,
    call_id: NodeId,
    decl_id: NodeId,
) -> Option<NodeId> {
    let Node::Decl(Decl::Function(decl)) = ast.get(decl_id) else {
        return None;
    };
    let declared = decl.return_type?;
    let type_params = decl.type_args.clone();

    let mut subst = HashMap::new();
    for param in &type_params {
        match resolve_type_arg(ast, trail, decl_id, call_id, *param) {
            TypeArgResolution::Resolved(ty) => {
                subst.insert(*param, ty);
            }
            TypeArgResolution::NeedsAnotherPass => return None,
        }
    }
    let resolved = real_typize(ast, declared, &subst);
    if let Node::Expr(Expr::FunctionCall(c)) = ast.get_mut(call_id) {
        c.return_type = Some(resolved);
    }
    Some(resolved)
}

/// §4.8 step 8: expand `super(...)` calls: bind the receiver to `this` and,
/// if the caller omitted arguments, forward the enclosing function's own
/// parameters.
pub fn expand_super(
    ast: &mut Ast,
    trail: &Trail,
    call_id: NodeId,
    this_decl: NodeId,
    super_fn_id: NodeId,
) {
    let this_access = ast.alloc(Node::Expr(Expr::VariableAccess(VariableAccess {
        name: Some(Symbol::intern("this")),
        reference: Some(this_decl),
        token: ast.token(call_id),
    })));

    let mut forwarded = Vec::new();
    if let Some(enclosing_idx) = trail.find(None, ast, |n| {
        matches!(n, Node::Decl(Decl::Function(_)))
    }) {
        if let Some(enclosing_id) = trail.get(enclosing_idx) {
            if let Node::Decl(Decl::Function(enclosing)) = ast.get(enclosing_id) {
                for &param_id in &enclosing.args {
                    if let Node::Decl(Decl::Argument(a)) = ast.get(param_id) {
                        forwarded.push((a.name, param_id));
                    }
                }
            }
        }
    }

    let needs_forward = matches!(
        ast.get(call_id).as_expr(),
        Some(Expr::FunctionCall(c)) if c.args.is_empty()
    );

    if let Node::Expr(Expr::FunctionCall(c)) = ast.get_mut(call_id) {
        c.expr = Some(this_access);
        c.reference = Some(super_fn_id);
        c.ref_score = crate::scoring::SCORE_SEED;
    }

    if needs_forward {
        for (name, param_id) in forwarded {
            let access = ast.alloc(Node::Expr(Expr::VariableAccess(VariableAccess {
                name: Some(name),
                reference: Some(param_id),
                token: ast.token(call_id),
            })));
            if let Node::Expr(Expr::FunctionCall(c)) = ast.get_mut(call_id) {
                c.args.push(access);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberc_ast::{Argument, FunctionDecl, VarArgDecl};
    use emberc_util::Span;

    #[test]
    fn optargs_fills_missing_trailing_default() {
        let mut ast = Ast::new(Node::Decl(Decl::Function(FunctionDecl::new(
            Symbol::intern("g"),
            Span::DUMMY,
        ))));
        let int_ty = ast.alloc(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern("Int"),
            type_args: Vec::new(),
            token: Span::DUMMY,
        })));
        let default_val = ast.alloc(Node::Expr(Expr::IntLiteral(IntLiteral {
            value: 7,
            token: Span::DUMMY,
        })));
        let req_arg = ast.alloc(Node::Decl(Decl::Argument(Argument {
            name: Symbol::intern("x"),
            ty: int_ty,
            default: None,
            token: Span::DUMMY,
        })));
        let opt_arg = ast.alloc(Node::Decl(Decl::Argument(Argument {
            name: Symbol::intern("y"),
            ty: int_ty,
            default: Some(default_val),
            token: Span::DUMMY,
        })));
        if let Node::Decl(Decl::Function(f)) = ast.get_mut(ast.root) {
            f.args.push(req_arg);
            f.args.push(opt_arg);
        }
        let arg3 = ast.alloc(Node::Expr(Expr::IntLiteral(IntLiteral {
            value: 3,
            token: Span::DUMMY,
        })));
        let mut call = FunctionCall::new(Symbol::intern("g"), Span::DUMMY);
        call.args.push(arg3);
        let call_id = ast.alloc(Node::Expr(Expr::FunctionCall(call)));

        handle_optargs(&mut ast, call_id, ast.root);

        if let Node::Expr(Expr::FunctionCall(c)) = ast.get(call_id) {
            assert_eq!(c.args.len(), 2);
            assert_eq!(c.args[1], default_val);
        } else {
            panic!("expected call");
        }
    }

    #[test]
    fn varargs_boxing_produces_alternating_pairs() {
        let mut ast = Ast::new(Node::Decl(Decl::Function(FunctionDecl::new(
            Symbol::intern("h"),
            Span::DUMMY,
        ))));
        let va_arg = ast.alloc(Node::Decl(Decl::VarArg(VarArgDecl {
            name: Symbol::intern("args"),
            elem_type: None,
            token: Span::DUMMY,
        })));
        if let Node::Decl(Decl::Function(f)) = ast.get_mut(ast.root) {
            f.args.push(va_arg);
        }
        let block_id = ast.alloc(Node::Expr(Expr::Block(emberc_ast::Block {
            stmts: Vec::new(),
            token: Span::DUMMY,
        })));

        let a1 = ast.alloc(Node::Expr(Expr::IntLiteral(IntLiteral {
            value: 1,
            token: Span::DUMMY,
        })));
        let a2 = ast.alloc(Node::Expr(Expr::StringLiteral(emberc_ast::StringLiteral {
            value: Symbol::intern("a"),
            token: Span::DUMMY,
        })));
        let a3 = ast.alloc(Node::Expr(Expr::FloatLiteral(emberc_ast::FloatLiteral {
            value: 2.0,
            token: Span::DUMMY,
        })));
        let mut call = FunctionCall::new(Symbol::intern("h"), Span::DUMMY);
        call.args.extend([a1, a2, a3]);
        let call_id = ast.alloc(Node::Expr(Expr::FunctionCall(call)));
        if let Node::Expr(Expr::Block(b)) = ast.get_mut(block_id) {
            b.stmts.push(call_id);
        }

        let mut trail = Trail::new();
        trail.push(block_id);
        trail.push(call_id);
        let names = NameGen::new();

        assert!(handle_varargs(&mut ast, &trail, &names, call_id, ast.root));

        if let Node::Expr(Expr::FunctionCall(c)) = ast.get(call_id) {
            assert_eq!(c.args.len(), 1);
        } else {
            panic!("expected call");
        }
        if let Node::Expr(Expr::Block(b)) = ast.get(block_id) {
            assert_eq!(b.stmts.len(), 3);
            if let Node::Expr(Expr::VariableDecl(vd)) = ast.get(b.stmts[0]) {
                if let Some(ty) = vd.ty {
                    if let Node::Type(TypeExpr::AnonStruct(s)) = ast.get(ty) {
                        assert_eq!(s.fields.len(), 3);
                    } else {
                        panic!("expected anon struct type");
                    }
                }
            } else {
                panic!("expected variable decl");
            }
        } else {
            panic!("expected block");
        }
    }
}
