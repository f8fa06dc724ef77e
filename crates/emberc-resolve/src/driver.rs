//! The resolver driver (§4.4): the fixed-point loop over the whole AST, plus
//! its configuration surface (`BuildParams`).

use serde::{Deserialize, Serialize};

use emberc_ast::{Ast, Decl, Expr, Node, NodeId, TypeExpr};
use emberc_util::{FxHashMap, Handler, Symbol};
use log::{debug, trace};

use crate::errors;
use crate::generics::expr_type;
use crate::names::NameGen;
use crate::overload::{self, suggest};
use crate::response::Response;
use crate::rewrites;
use crate::trail::Trail;

/// Driver configuration, loadable from TOML or built programmatically,
/// mirroring the package-config frontend's `Config`/`BuildConfig` split.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildParams {
    pub very_verbose: bool,
    pub helpful: bool,
    pub inlining: bool,
    pub max_rounds: u32,
    /// Whether an extern-only implicit conversion may be applied even when
    /// the receiving declaration is not extern. Kept `true` to match §4.5's
    /// default reading of `IMPLICIT_AS_EXTERNAL_ONLY`.
    pub implicit_as_external_only: bool,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            very_verbose: false,
            helpful: true,
            inlining: true,
            max_rounds: 64,
            implicit_as_external_only: true,
        }
    }
}

impl BuildParams {
    pub fn very_verbose(mut self, value: bool) -> Self {
        self.very_verbose = value;
        self
    }

    pub fn helpful(mut self, value: bool) -> Self {
        self.helpful = value;
        self
    }

    pub fn inlining(mut self, value: bool) -> Self {
        self.inlining = value;
        self
    }

    pub fn max_rounds(mut self, value: u32) -> Self {
        self.max_rounds = value;
        self
    }
}

/// A name-keyed index of every `FunctionDecl` in the AST, rebuilt once per
/// pass. Stands in for the static import cache §5 describes: without it,
/// every call site would rescan the whole arena to source candidates.
///
/// This is a simplified candidate-sourcing model: a full scope-tree
/// `resolveCall` trait dispatch (namespaces, type decls, enclosing scopes
/// contributing candidates in lexical-then-outward order) is future work;
/// see DESIGN.md.
type NameIndex = FxHashMap<Symbol, Vec<NodeId>>;

fn build_name_index(ast: &Ast) -> NameIndex {
    let mut index: NameIndex = FxHashMap::default();
    for id in ast.ids() {
        if let Node::Decl(Decl::Function(f)) = ast.get(id) {
            index.entry(f.name).or_default().push(id);
        }
    }
    index
}

fn lookup_candidates(index: &NameIndex, ast: &Ast, name: Symbol, suffix: Option<Symbol>) -> Vec<NodeId> {
    index
        .get(&name)
        .map(|ids| {
            ids.iter()
                .copied()
                .filter(|&id| {
                    matches!(ast.get(id), Node::Decl(Decl::Function(f)) if suffix.is_none() || f.suffix == suffix)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Every `InterfaceDecl` anywhere in the tree, rebuilt once per pass
/// alongside `NameIndex` for the same reason: §4.8 step 5 needs the whole
/// interface set to check a declared parameter type against.
fn collect_interfaces(ast: &Ast) -> Vec<NodeId> {
    ast.ids()
        .filter(|&id| matches!(ast.get(id), Node::Decl(Decl::Interface(_))))
        .collect()
}

/// §4.8 step 8: for `name == "super"`, source the one candidate directly —
/// the same-named, same-suffix method owned by the enclosing function's
/// owner's `super_ref` — rather than going through `suggest`'s scoring.
fn resolve_super_reference(ast: &Ast, trail: &Trail, index: &NameIndex) -> Option<(NodeId, NodeId)> {
    let enclosing_idx = trail.find(None, ast, |n| matches!(n, Node::Decl(Decl::Function(_))))?;
    let enclosing_id = trail.get(enclosing_idx)?;
    let Node::Decl(Decl::Function(enclosing)) = ast.get(enclosing_id) else {
        return None;
    };
    let (fn_name, fn_suffix, owner_id) = (enclosing.name, enclosing.suffix, enclosing.owner?);
    let Node::Decl(Decl::Type(owner)) = ast.get(owner_id) else {
        return None;
    };
    let super_type_id = owner.super_ref?;

    let candidates = lookup_candidates(index, ast, fn_name, fn_suffix);
    candidates
        .into_iter()
        .find(|&c| matches!(ast.get(c), Node::Decl(Decl::Function(f)) if f.owner == Some(super_type_id)))
        .map(|super_fn_id| (super_type_id, super_fn_id))
}

/// Try to make progress on one call: source candidates (or, for `super`
/// calls, the single same-named ancestor method), score them in a stable
/// order, and (once a candidate wins) run the call-site rewrites. Returns
/// the response to fold into the pass result.
fn resolve_call(
    ast: &mut Ast,
    trail: &Trail,
    names: &NameGen,
    params: &BuildParams,
    index: &NameIndex,
    interfaces: &[NodeId],
    call_id: NodeId,
) -> Response {
    let Node::Expr(Expr::FunctionCall(call)) = ast.get(call_id) else {
        return Response::Ok;
    };
    if call.is_resolved() && call.return_type.is_some() {
        return Response::Ok;
    }
    let name = call.name;
    let suffix = call.suffix;

    let decl_id = if name == Symbol::intern("super") {
        let Some((super_type_id, super_fn_id)) = resolve_super_reference(ast, trail, index) else {
            return Response::Loop;
        };
        rewrites::expand_super(ast, trail, call_id, super_type_id, super_fn_id);
        super_fn_id
    } else {
        let candidates = lookup_candidates(index, ast, name, suffix);
        if candidates.is_empty() {
            return Response::Loop;
        }

        for cand_id in candidates {
            suggest(ast, call_id, cand_id, interfaces, params.implicit_as_external_only);
        }

        let Node::Expr(Expr::FunctionCall(call)) = ast.get(call_id) else {
            return Response::Ok;
        };
        let Some(decl_id) = call.reference else {
            return Response::Loop;
        };
        if call.ref_score <= 0 {
            return Response::Loop;
        }
        decl_id
    };

    let mut response = Response::Ok;

    if params.inlining {
        if let Node::Decl(Decl::Function(decl)) = ast.get(decl_id) {
            if decl.do_inline {
                trace!("inlining call to {}", name.as_str());
            }
        }
    }

    response = response.combine(rewrites::handle_generics(ast, trail, names, call_id, decl_id));
    rewrites::handle_optargs(ast, call_id, decl_id);
    rewrites::handle_varargs(ast, trail, names, call_id, decl_id);
    rewrites::handle_interfaces(ast, call_id, decl_id, interfaces);

    match rewrites::resolve_return_type(ast, trail, call_id, decl_id) {
        Some(_) => {}
        None => return response.combine(Response::Loop),
    }

    response = response.combine(rewrites::unwrap_if_needed(ast, trail, names, call_id));

    response
}

/// Pre-order traversal: resolve children before the node itself, so a
/// `FunctionCall`'s argument types are available by the time it scores
/// candidates. Trail push/pop is balanced on every exit path.
fn resolve_node(
    ast: &mut Ast,
    trail: &mut Trail,
    names: &NameGen,
    params: &BuildParams,
    index: &NameIndex,
    interfaces: &[NodeId],
    node_id: NodeId,
) -> Response {
    trail.push(node_id);

    let children = child_ids(ast, node_id);
    let mut response = Response::Ok;
    for child in children {
        response = response.combine(resolve_node(ast, trail, names, params, index, interfaces, child));
    }

    if matches!(ast.get(node_id).as_expr(), Some(Expr::FunctionCall(_))) {
        response = response.combine(resolve_call(ast, trail, names, params, index, interfaces, node_id));
    }

    trail.pop(node_id);
    response
}

fn child_ids(ast: &Ast, node_id: NodeId) -> Vec<NodeId> {
    match ast.get(node_id) {
        Node::Expr(e) => expr_child_ids(e),
        Node::Decl(d) => decl_child_ids(d),
        Node::Type(_) => Vec::new(),
    }
}

fn expr_child_ids(e: &Expr) -> Vec<NodeId> {
    match e {
        Expr::VariableDecl(n) => n.init.into_iter().collect(),
        Expr::FunctionCall(n) => {
            let mut v: Vec<NodeId> = n.expr.into_iter().collect();
            v.extend(n.args.iter().copied());
            v
        }
        Expr::AddressOf(n) => vec![n.target],
        Expr::Cast(n) => vec![n.expr],
        Expr::BinaryOp(n) => vec![n.left, n.right],
        Expr::CommaSequence(n) => vec![n.first, n.second],
        Expr::StructLiteral(n) => n.fields.iter().map(|(_, v)| *v).collect(),
        Expr::Block(n) => n.stmts.clone(),
        Expr::InlineContext(n) => n.stmts.clone(),
        Expr::Return(n) => n.value.into_iter().collect(),
        Expr::VariableAccess(_)
        | Expr::IntLiteral(_)
        | Expr::FloatLiteral(_)
        | Expr::StringLiteral(_)
        | Expr::BoolLiteral(_)
        | Expr::NullLiteral(_)
        | Expr::TypeAccess(_) => Vec::new(),
    }
}

fn decl_child_ids(d: &Decl) -> Vec<NodeId> {
    match d {
        Decl::Function(n) => n.body.into_iter().collect(),
        Decl::Type(n) => n.meta.into_iter().collect(),
        Decl::Namespace(n) => n.members.clone(),
        Decl::Interface(_) | Decl::Argument(_) | Decl::VarArg(_) => Vec::new(),
    }
}

/// Run the resolver to a fixed point (or the fatal round) over `ast`,
/// reporting diagnostics via `handler` for anything still unresolved.
pub fn run(ast: &mut Ast, params: &BuildParams, handler: &Handler) {
    let names = NameGen::new();
    let mut round = 0u32;
    let mut fatal = false;

    loop {
        let index = build_name_index(ast);
        let interfaces = collect_interfaces(ast);
        let mut trail = Trail::new();
        let response = resolve_node(ast, &mut trail, &names, params, &index, &interfaces, ast.root);
        let stable = !response.is_loop();

        debug!("resolver round {round}: stable={stable}");

        if stable {
            break;
        }
        if fatal {
            break;
        }
        round += 1;
        if round >= params.max_rounds {
            fatal = true;
        }
    }

    if fatal {
        report_unresolved(ast, params, handler);
    }
    report_void_uses(ast, handler);
}

/// The nearest-match hint for an unresolved call (§7): among every
/// same-name/suffix candidate, the one that scored best while still being
/// rejected (`score <= 0`), and that candidate's first mismatching argument
/// as `(index, declared type name, actual type name)`.
fn nearest_mismatch(
    ast: &Ast,
    call_id: NodeId,
    call: &emberc_ast::FunctionCall,
    candidates: &[NodeId],
    interfaces: &[NodeId],
    implicit_as_external_only: bool,
) -> Option<(usize, String, String)> {
    let mut best: Option<(i64, NodeId)> = None;
    for &cand_id in candidates {
        let result = overload::score_candidate(ast, call_id, call, cand_id, interfaces, implicit_as_external_only);
        if result.score > 0 {
            continue;
        }
        if best.map_or(true, |(s, _)| result.score > s) {
            best = Some((result.score, cand_id));
        }
    }
    let (_, cand_id) = best?;
    let (idx, decl_ty, call_ty) = overload::first_mismatch(ast, cand_id, call, interfaces, implicit_as_external_only)?;
    let name_of = |ty: NodeId| {
        ast.get(ty)
            .as_type()
            .and_then(|t| t.as_bare_name())
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    Some((idx, name_of(decl_ty), name_of(call_ty)))
}

fn report_unresolved(ast: &Ast, params: &BuildParams, handler: &Handler) {
    let index = build_name_index(ast);
    let interfaces = collect_interfaces(ast);

    for id in ast.ids() {
        let Node::Expr(Expr::FunctionCall(call)) = ast.get(id) else {
            continue;
        };
        if call.reference.is_some() && call.ref_score > 0 && call.return_type.is_some() {
            continue;
        }

        let arg_types: Vec<String> = call
            .args
            .iter()
            .map(|&a| {
                expr_type(ast, a)
                    .and_then(|t| ast.get(t).as_type().and_then(|te| te.as_bare_name()))
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| "?".to_string())
            })
            .collect();

        let candidates = lookup_candidates(&index, ast, call.name, call.suffix);
        let nearest = nearest_mismatch(
            ast,
            id,
            call,
            &candidates,
            &interfaces,
            params.implicit_as_external_only,
        );

        errors::report_unresolved_call(
            handler,
            call.token,
            call.name,
            &arg_types.join(", "),
            nearest,
            call.candidate_uses_as,
            if params.helpful { Some(call.name) } else { None },
        );
    }
}

/// §6/§7: `UseOfVoidExpression` — a resolved call whose declared return type
/// is void but whose immediate parent isn't a scope (the void result would
/// otherwise be used as a value). Walks the same `child_ids` shape
/// `resolve_node` does, tracking ancestry instead of resolving.
fn report_void_uses(ast: &Ast, handler: &Handler) {
    let mut ancestors: Vec<NodeId> = Vec::new();
    walk_void_uses(ast, ast.root, &mut ancestors, handler);
}

fn walk_void_uses(ast: &Ast, node_id: NodeId, ancestors: &mut Vec<NodeId>, handler: &Handler) {
    for child in child_ids(ast, node_id) {
        ancestors.push(node_id);
        walk_void_uses(ast, child, ancestors, handler);
        ancestors.pop();
    }

    if let Node::Expr(Expr::FunctionCall(call)) = ast.get(node_id) {
        if call.return_type.is_some_and(|rt| is_void_type(ast, rt)) {
            let parent_is_scope = ancestors.last().is_some_and(|&p| ast.get(p).is_scope());
            if !parent_is_scope {
                errors::report_use_of_void(handler, call.token, call.name);
            }
        }
    }
}

fn is_void_type(ast: &Ast, ty: NodeId) -> bool {
    matches!(
        ast.get(ty).as_type().and_then(TypeExpr::as_bare_name),
        Some(name) if name == Symbol::intern("Void")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberc_ast::{Argument, BaseType, FunctionCall, FunctionDecl, NamespaceDecl, TypeExpr, VariableAccess};
    use emberc_util::Span;
    use emberc_util::Symbol;

    #[test]
    fn overload_by_type_resolves_through_driver() {
        let mut ast = Ast::new(Node::Decl(Decl::Namespace(NamespaceDecl {
            name: Symbol::intern("root"),
            members: Vec::new(),
            token: Span::DUMMY,
        })));

        let int_ty = ast.alloc(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern("Int"),
            type_args: Vec::new(),
            token: Span::DUMMY,
        })));
        let int_arg = ast.alloc(Node::Decl(Decl::Argument(Argument {
            name: Symbol::intern("x"),
            ty: int_ty,
            default: None,
            token: Span::DUMMY,
        })));
        let mut int_fn = FunctionDecl::new(Symbol::intern("f"), Span::DUMMY);
        int_fn.return_type = Some(int_ty);
        int_fn.args.push(int_arg);
        let int_fn_id = ast.alloc(Node::Decl(Decl::Function(int_fn)));

        let value_decl = ast.alloc(Node::Decl(Decl::Argument(Argument {
            name: Symbol::intern("v"),
            ty: int_ty,
            default: None,
            token: Span::DUMMY,
        })));
        let value_access = ast.alloc(Node::Expr(Expr::VariableAccess(VariableAccess {
            name: Some(Symbol::intern("v")),
            reference: Some(value_decl),
            token: Span::DUMMY,
        })));
        let mut call = FunctionCall::new(Symbol::intern("f"), Span::DUMMY);
        call.args.push(value_access);
        let call_id = ast.alloc(Node::Expr(Expr::FunctionCall(call)));

        let block_id = ast.alloc(Node::Expr(Expr::Block(emberc_ast::Block {
            stmts: vec![call_id],
            token: Span::DUMMY,
        })));

        if let Node::Decl(Decl::Function(f)) = ast.get_mut(int_fn_id) {
            f.body = Some(block_id);
        }
        if let Node::Decl(Decl::Namespace(ns)) = ast.get_mut(ast.root) {
            ns.members.push(int_fn_id);
        }

        let params = BuildParams::default();
        let handler = Handler::new();
        run(&mut ast, &params, &handler);

        if let Node::Expr(Expr::FunctionCall(c)) = ast.get(call_id) {
            assert_eq!(c.reference, Some(int_fn_id));
            assert!(c.ref_score > 0);
            assert_eq!(c.return_type, Some(int_ty));
        } else {
            panic!("expected call");
        }
        assert!(!handler.has_errors());
    }

    #[test]
    fn unresolvable_call_is_reported_fatal() {
        let mut ast = Ast::new(Node::Decl(Decl::Namespace(NamespaceDecl {
            name: Symbol::intern("root"),
            members: Vec::new(),
            token: Span::DUMMY,
        })));
        let call = FunctionCall::new(Symbol::intern("nope"), Span::DUMMY);
        let call_id = ast.alloc(Node::Expr(Expr::FunctionCall(call)));
        let block_id = ast.alloc(Node::Expr(Expr::Block(emberc_ast::Block {
            stmts: vec![call_id],
            token: Span::DUMMY,
        })));
        if let Node::Decl(Decl::Namespace(ns)) = ast.get_mut(ast.root) {
            ns.members.push(block_id);
        }

        let params = BuildParams::default().max_rounds(3);
        let handler = Handler::new();
        run(&mut ast, &params, &handler);

        assert!(handler.has_errors());
    }
}
