//! Error taxonomy. User-facing failures go through `emberc_util::Handler` as
//! `Diagnostic`s; programmer-error invariant violations that no malformed
//! input could trigger are `ResolverBug`, matching the split `emberc-util`
//! already draws between its diagnostic model and its own `thiserror`
//! error enums.

use emberc_ast::NodeId;
use emberc_util::diagnostic::{DiagnosticBuilder, DiagnosticCode};
use emberc_util::{Handler, Span, Symbol};
use thiserror::Error;

pub const E_UNRESOLVED_CALL: DiagnosticCode = DiagnosticCode::new("E", 4001);
pub const E_USE_OF_VOID: DiagnosticCode = DiagnosticCode::new("E", 4002);
pub const E_INTERNAL: DiagnosticCode = DiagnosticCode::new("E", 4003);

/// A programmer-error invariant violation: something the resolver itself
/// promises never to do, independent of how malformed the input program is.
#[derive(Debug, Error)]
pub enum ResolverBug {
    #[error("trail imbalance: expected to pop {expected:?}, found {found:?}")]
    TrailImbalance {
        expected: NodeId,
        found: Option<NodeId>,
    },

    #[error("node index {0:?} has no backing node")]
    DanglingNodeId(NodeId),

    #[error("addBeforeInScope failed: no scope ancestor found for anchor {anchor:?}")]
    CouldntAddBeforeInScope { anchor: NodeId },

    #[error("replace({old:?}, {new:?}) found no matching child on node {on:?}")]
    CouldntReplace {
        on: NodeId,
        old: NodeId,
        new: NodeId,
    },
}

/// Report that `call` (source location `token`) has no candidate with a
/// positive score. `nearest` is the first mismatching argument of the
/// best-scoring (but still rejected) candidate, if any; `implicit_as_hint`
/// is set when an extern-only implicit conversion would have applied under
/// different circumstances; `import_hint` is a same-named decl found in an
/// import when `helpful` diagnostics are enabled.
#[allow(clippy::too_many_arguments)]
pub fn report_unresolved_call(
    handler: &Handler,
    token: Span,
    callee: Symbol,
    arg_types_repr: &str,
    nearest: Option<(usize, String, String)>,
    implicit_as_hint: bool,
    import_hint: Option<Symbol>,
) {
    let mut builder = DiagnosticBuilder::error(format!(
        "no matching overload for call to `{}` with argument types ({arg_types_repr})",
        callee.as_str()
    ))
    .code(E_UNRESOLVED_CALL)
    .span(token);

    if let Some((idx, expected, actual)) = nearest {
        builder = builder.note(format!(
            "nearest candidate: argument {idx} expected `{expected}`, found `{actual}`"
        ));
    }
    if implicit_as_hint {
        builder = builder.help(format!(
            "`{}` has an implicit conversion that applies only to extern functions",
            callee.as_str()
        ));
    }
    if let Some(name) = import_hint {
        builder = builder.help(format!(
            "a declaration named `{}` exists in an imported namespace",
            name.as_str()
        ));
    }
    builder.emit(handler);
}

pub fn report_use_of_void(handler: &Handler, token: Span, callee: Symbol) {
    DiagnosticBuilder::error(format!(
        "`{}` returns void and cannot be used as a value here",
        callee.as_str()
    ))
    .code(E_USE_OF_VOID)
    .span(token)
    .emit(handler);
}

pub fn report_internal_error(handler: &Handler, token: Span, message: impl Into<String>) {
    DiagnosticBuilder::error(message)
        .code(E_INTERNAL)
        .span(token)
        .emit(handler);
}
