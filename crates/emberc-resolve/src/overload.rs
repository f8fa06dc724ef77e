//! Overload resolution (§4.6): scoring and selecting the best `FunctionDecl`
//! candidate for a `FunctionCall`.

use std::collections::BTreeMap;

use emberc_ast::{Ast, Cast, Decl, Expr, FunctionCall, Node, NodeId, TypeExpr};

use crate::scoring::{find_implicit_conversion, get_score, implicit_conversion_applies, NOLUCK_SCORE, SCORE_SEED};

/// The `TypeDecl` named `name`, found by a whole-arena scan. Type-expression
/// nodes (`BaseType`) only carry a type's bare name, never a direct link to
/// its declaration, so resolving "does this type have an implicit
/// conversion" has to go through a name lookup the same way candidate
/// lookup does in `driver::build_name_index`.
fn find_type_decl_by_name(ast: &Ast, name: emberc_util::Symbol) -> Option<NodeId> {
    ast.ids()
        .find(|&id| matches!(ast.get(id), Node::Decl(Decl::Type(td)) if td.name == name))
}

/// Whether `cand`'s argument list can be satisfied by `call`'s argument
/// count, accounting for optional arguments (a declared arg with a default)
/// and variadics (a trailing `VarArg` parameter swallows any remaining
/// count including zero).
pub fn matches_args(ast: &Ast, cand_id: NodeId, call: &FunctionCall) -> bool {
    let Node::Decl(Decl::Function(cand)) = ast.get(cand_id) else {
        return false;
    };

    let has_vararg = cand
        .args
        .last()
        .map(|&a| matches!(ast.get(a), Node::Decl(Decl::VarArg(_))))
        .unwrap_or(false);

    if has_vararg {
        // Every required (non-vararg) argument must be present; the vararg
        // slot consumes everything after that, including nothing at all.
        let required = cand.args.len() - 1;
        return call.args.len() >= required;
    }

    if call.args.len() > cand.args.len() {
        return false;
    }

    // Every argument beyond what the call supplied must carry a default.
    cand.args[call.args.len()..].iter().all(|&a| match ast.get(a) {
        Node::Decl(Decl::Argument(arg)) => arg.default.is_some(),
        _ => false,
    })
}

/// Declared parameter type for positional argument `idx` of candidate
/// `cand_id`, accounting for the variadic slot reusing its element type
/// for every trailing call argument.
fn declared_param_type(ast: &Ast, cand: &emberc_ast::FunctionDecl, idx: usize) -> Option<NodeId> {
    let last = cand.args.len().checked_sub(1)?;
    let arg_id = if idx < cand.args.len() {
        cand.args[idx]
    } else {
        cand.args[last]
    };
    match ast.get(arg_id) {
        Node::Decl(Decl::Argument(a)) => Some(a.ty),
        Node::Decl(Decl::VarArg(v)) => v.elem_type,
        _ => None,
    }
}

fn targets_known_interface(ast: &Ast, decl_ty: NodeId, interfaces: &[NodeId]) -> bool {
    matches!(
        ast.get(decl_ty).as_type(),
        Some(TypeExpr::Base(b)) if interfaces.iter().any(|&i| {
            matches!(ast.get(i), Node::Decl(Decl::Interface(id)) if id.name == b.name)
        })
    )
}

/// One positional argument's score against one declared parameter type,
/// trying in order: a direct type match, an interface coercion, then an
/// applicable implicit conversion. `inapplicable_conversion` is set when a
/// conversion exists but is gated out under the current extern-only policy
/// (§4.5's `IMPLICIT_AS_EXTERNAL_ONLY`), so the caller can still surface the
/// "implicit as" hint even though the argument itself scores no luck.
struct ArgScore {
    score: i64,
    is_conversion: bool,
    inapplicable_conversion: bool,
}

fn score_arg(
    ast: &Ast,
    call_ty: NodeId,
    decl_ty: NodeId,
    cand_is_extern: bool,
    interfaces: &[NodeId],
    implicit_as_external_only: bool,
) -> ArgScore {
    let direct = get_score(ast, call_ty, decl_ty);
    if direct != NOLUCK_SCORE {
        return ArgScore {
            score: direct,
            is_conversion: false,
            inapplicable_conversion: false,
        };
    }
    if targets_known_interface(ast, decl_ty, interfaces) {
        // Any concrete type is accepted where an interface is declared;
        // `handle_interfaces` inserts the coercing cast once this
        // candidate wins (§4.8 step 5).
        return ArgScore {
            score: SCORE_SEED / 8,
            is_conversion: false,
            inapplicable_conversion: false,
        };
    }
    if let Some(TypeExpr::Base(b)) = ast.get(call_ty).as_type() {
        if let Some(source_decl) = find_type_decl_by_name(ast, b.name) {
            if find_implicit_conversion(ast, source_decl, decl_ty).is_some() {
                return if implicit_conversion_applies(cand_is_extern, implicit_as_external_only) {
                    ArgScore {
                        score: SCORE_SEED / 8,
                        is_conversion: true,
                        inapplicable_conversion: false,
                    }
                } else {
                    ArgScore {
                        score: NOLUCK_SCORE,
                        is_conversion: false,
                        inapplicable_conversion: true,
                    }
                };
            }
        }
    }
    ArgScore {
        score: NOLUCK_SCORE,
        is_conversion: false,
        inapplicable_conversion: false,
    }
}

/// The result of scoring one candidate: the total score (§4.6 step 2), the
/// positional args that matched only via an implicit conversion (to be
/// wrapped in a `Cast` once this candidate wins), and whether any argument
/// was blocked by an implicit conversion that exists but doesn't apply here.
pub struct CandidateScore {
    pub score: i64,
    pub conversions: Vec<(usize, NodeId)>,
    pub inapplicable_conversion: bool,
}

impl CandidateScore {
    fn noluck(inapplicable_conversion: bool) -> Self {
        Self {
            score: NOLUCK_SCORE,
            conversions: Vec::new(),
            inapplicable_conversion,
        }
    }
}

/// One candidate's total score against a call, implementing the weighted
/// sum from §4.6 step 2. Does not mutate the AST; implicit-conversion and
/// interface-cast rewrites are applied by the caller once a candidate wins.
pub fn score_candidate(
    ast: &Ast,
    call_id: NodeId,
    call: &FunctionCall,
    cand_id: NodeId,
    interfaces: &[NodeId],
    implicit_as_external_only: bool,
) -> CandidateScore {
    let Node::Decl(Decl::Function(cand)) = ast.get(cand_id) else {
        return CandidateScore::noluck(false);
    };

    if call.is_member() && cand.owner.is_none() {
        return CandidateScore::noluck(false);
    }

    if !matches_args(ast, cand_id, call) {
        return CandidateScore::noluck(false);
    }
    let mut score = SCORE_SEED / 4;

    if cand.owner.is_some() && call.is_member() {
        score += SCORE_SEED / 4;
    }

    if call.suffix.is_none() && cand.suffix.is_none() && !cand.is_static {
        score += SCORE_SEED / 4;
    }

    let mut conversions = Vec::new();
    let mut inapplicable_conversion = false;

    for (i, &arg_id) in call.args.iter().enumerate() {
        let Some(decl_ty) = declared_param_type(ast, cand, i) else {
            continue;
        };
        let Some(call_ty) = crate::generics::expr_type(ast, arg_id) else {
            continue;
        };
        let arg = score_arg(ast, call_ty, decl_ty, cand.is_extern, interfaces, implicit_as_external_only);
        if arg.inapplicable_conversion {
            inapplicable_conversion = true;
        }
        if arg.score == NOLUCK_SCORE {
            return CandidateScore::noluck(inapplicable_conversion);
        }
        if arg.is_conversion {
            conversions.push((i, decl_ty));
        }
        score += arg.score;
    }

    let _ = call_id;
    CandidateScore {
        score,
        conversions,
        inapplicable_conversion,
    }
}

/// First call argument that fails to score against `cand`'s declared
/// parameter — the "nearest candidate" diagnostic hint (§4.6/§7) names this
/// argument's declared vs. actual type. `None` if `cand` isn't a function or
/// every argument scores (i.e. arity, not a type, is what rejected it).
pub fn first_mismatch(
    ast: &Ast,
    cand_id: NodeId,
    call: &FunctionCall,
    interfaces: &[NodeId],
    implicit_as_external_only: bool,
) -> Option<(usize, NodeId, NodeId)> {
    let Node::Decl(Decl::Function(cand)) = ast.get(cand_id) else {
        return None;
    };
    for (i, &arg_id) in call.args.iter().enumerate() {
        let decl_ty = declared_param_type(ast, cand, i)?;
        let call_ty = crate::generics::expr_type(ast, arg_id)?;
        let arg = score_arg(ast, call_ty, decl_ty, cand.is_extern, interfaces, implicit_as_external_only);
        if arg.score == NOLUCK_SCORE {
            return Some((i, decl_ty, call_ty));
        }
    }
    None
}

/// Apply the side effects of a candidate winning: undo any prior
/// implicit-conversion casts, apply and snapshot `cand`'s own (§4.6 step 3),
/// mark `cand` as the new reference, and record the new score. Returns
/// whether `cand` is a candidate worth keeping (`score > 0`).
pub fn suggest(
    ast: &mut Ast,
    call_id: NodeId,
    cand_id: NodeId,
    interfaces: &[NodeId],
    implicit_as_external_only: bool,
) -> bool {
    let Node::Expr(Expr::FunctionCall(call)) = ast.get(call_id) else {
        return false;
    };
    let call_snapshot = call.clone();
    let result = score_candidate(ast, call_id, &call_snapshot, cand_id, interfaces, implicit_as_external_only);

    if result.inapplicable_conversion {
        if let Node::Expr(Expr::FunctionCall(call_mut)) = ast.get_mut(call_id) {
            call_mut.candidate_uses_as = true;
        }
    }

    if result.score > call_snapshot.ref_score {
        let mut args = call_snapshot.args.clone();
        if let Some(prior) = call_snapshot.args_before_conversion {
            for (idx, original) in prior {
                if let Some(slot) = args.get_mut(idx) {
                    *slot = original;
                }
            }
        }

        let mut args_before_conversion = BTreeMap::new();
        for (idx, target_ty) in result.conversions {
            if let Some(&original) = args.get(idx) {
                let cast = ast.alloc(Node::Expr(Expr::Cast(Cast {
                    expr: original,
                    ty: target_ty,
                    token: call_snapshot.token,
                })));
                args[idx] = cast;
                args_before_conversion.insert(idx, original);
            }
        }

        if let Node::Expr(Expr::FunctionCall(call_mut)) = ast.get_mut(call_id) {
            call_mut.args = args;
            call_mut.args_before_conversion = if args_before_conversion.is_empty() {
                None
            } else {
                Some(args_before_conversion)
            };
            call_mut.reference = Some(cand_id);
            call_mut.ref_score = result.score;
        }
    }

    result.score > 0
}
