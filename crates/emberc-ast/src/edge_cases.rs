//! Edge case tests for emberc-ast

#[cfg(test)]
mod tests {
    use crate::{Ast, Argument, Decl, Expr, FunctionCall, FunctionDecl, Node, NullLiteral};
    use emberc_util::{Span, Symbol};

    fn dummy() -> Span {
        Span::DUMMY
    }

    /// EDGE CASE: a single-node arena has exactly one id, the root.
    #[test]
    fn test_edge_single_node_arena() {
        let ast = Ast::new(Node::Expr(Expr::NullLiteral(NullLiteral { token: dummy() })));
        assert_eq!(ast.len(), 1);
        assert_eq!(ast.ids().count(), 1);
    }

    /// EDGE CASE: replace() on a node with no matching child returns false
    /// and leaves the node untouched.
    #[test]
    fn test_edge_replace_no_match_is_noop() {
        let mut ast = Ast::new(Node::Expr(Expr::NullLiteral(NullLiteral { token: dummy() })));
        let a = ast.alloc(Node::Expr(Expr::NullLiteral(NullLiteral { token: dummy() })));
        let b = ast.alloc(Node::Expr(Expr::NullLiteral(NullLiteral { token: dummy() })));
        let replaced = ast.get_mut(a).replace(b, b);
        assert!(!replaced);
    }

    /// EDGE CASE: a FunctionCall with zero args is still a valid, unresolved call.
    #[test]
    fn test_edge_zero_arg_call_is_unresolved() {
        let call = FunctionCall::new(Symbol::intern("main"), dummy());
        assert!(call.args.is_empty());
        assert!(!call.is_resolved());
    }

    /// EDGE CASE: a FunctionDecl with no args and no return type (a `void` proc).
    #[test]
    fn test_edge_void_no_arg_function_decl() {
        let decl = FunctionDecl::new(Symbol::intern("run"), dummy());
        assert!(decl.args.is_empty());
        assert!(decl.return_type.is_none());
    }

    /// ERROR CASE: an Argument always carries a type; there is no bare-name
    /// argument variant to misuse as a placeholder.
    #[test]
    fn test_error_argument_requires_type() {
        let mut ast = Ast::new(Node::Expr(Expr::NullLiteral(NullLiteral { token: dummy() })));
        let ty = ast.alloc(Node::Type(crate::TypeExpr::Base(crate::BaseType {
            name: Symbol::intern("Int"),
            type_args: Vec::new(),
            token: dummy(),
        })));
        let arg = Argument {
            name: Symbol::intern("x"),
            ty,
            default: None,
            token: dummy(),
        };
        assert_eq!(arg.ty, ty);
        let _ = Decl::Argument(arg);
    }
}
