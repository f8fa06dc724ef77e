//! Boundary and error-path tests for the resolver core.

#[cfg(test)]
mod tests {
    use emberc_ast::{
        Argument, Ast, BaseType, Decl, Expr, FunctionCall, FunctionDecl, NamespaceDecl, Node,
        TypeExpr, VarArgDecl, VariableAccess,
    };
    use emberc_util::{Handler, Span, Symbol};

    use crate::driver::{run, BuildParams};
    use crate::overload::matches_args;
    use crate::scoring::{get_score, NOLUCK_SCORE, SCORE_SEED};

    fn dummy() -> Span {
        Span::DUMMY
    }

    /// EDGE CASE: a zero-arg call against a vararg-only function still matches.
    #[test]
    fn test_edge_vararg_matches_zero_args() {
        let mut ast = Ast::new(Node::Decl(Decl::Function(FunctionDecl::new(
            Symbol::intern("h"),
            dummy(),
        ))));
        let va = ast.alloc(Node::Decl(Decl::VarArg(VarArgDecl {
            name: Symbol::intern("args"),
            elem_type: None,
            token: dummy(),
        })));
        if let Node::Decl(Decl::Function(f)) = ast.get_mut(ast.root) {
            f.args.push(va);
        }
        let call = FunctionCall::new(Symbol::intern("h"), dummy());
        assert!(matches_args(&ast, ast.root, &call));
    }

    /// ERROR CASE: a call with too many required args never matches.
    #[test]
    fn test_error_too_many_required_args_rejected() {
        let mut ast = Ast::new(Node::Decl(Decl::Function(FunctionDecl::new(
            Symbol::intern("f"),
            dummy(),
        ))));
        let int_ty = ast.alloc(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern("Int"),
            type_args: Vec::new(),
            token: dummy(),
        })));
        let arg = ast.alloc(Node::Decl(Decl::Argument(Argument {
            name: Symbol::intern("x"),
            ty: int_ty,
            default: None,
            token: dummy(),
        })));
        if let Node::Decl(Decl::Function(f)) = ast.get_mut(ast.root) {
            f.args.push(arg);
        }
        let extra = ast.alloc(Node::Expr(Expr::IntLiteral(emberc_ast::IntLiteral {
            value: 1,
            token: dummy(),
        })));
        let mut call = FunctionCall::new(Symbol::intern("f"), dummy());
        call.args.push(extra);
        call.args.push(extra);
        assert!(!matches_args(&ast, ast.root, &call));
    }

    /// EDGE CASE: identical types score exactly `SCORE_SEED`, never higher.
    #[test]
    fn test_edge_identity_score_is_exactly_seed() {
        let ast = Ast::new(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern("Int"),
            type_args: Vec::new(),
            token: dummy(),
        })));
        assert_eq!(get_score(&ast, ast.root, ast.root), SCORE_SEED);
    }

    /// ERROR CASE: incompatible base types score exactly `NOLUCK_SCORE`, not
    /// some other negative value.
    #[test]
    fn test_error_incompatible_types_score_noluck() {
        let mut ast = Ast::new(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern("Int"),
            type_args: Vec::new(),
            token: dummy(),
        })));
        let other = ast.alloc(Node::Type(TypeExpr::Base(BaseType {
            name: Symbol::intern("Bool"),
            type_args: Vec::new(),
            token: dummy(),
        })));
        assert_eq!(get_score(&ast, ast.root, other), NOLUCK_SCORE);
    }

    /// ERROR CASE: a call to a name with no declaration anywhere in the AST
    /// is reported as an unresolved call in the fatal round, not silently
    /// dropped.
    #[test]
    fn test_error_unknown_name_reaches_fatal_round() {
        let mut ast = Ast::new(Node::Decl(Decl::Namespace(NamespaceDecl {
            name: Symbol::intern("root"),
            members: Vec::new(),
            token: dummy(),
        })));
        let call = FunctionCall::new(Symbol::intern("ghost"), dummy());
        let call_id = ast.alloc(Node::Expr(Expr::FunctionCall(call)));
        let block_id = ast.alloc(Node::Expr(Expr::Block(emberc_ast::Block {
            stmts: vec![call_id],
            token: dummy(),
        })));
        if let Node::Decl(Decl::Namespace(ns)) = ast.get_mut(ast.root) {
            ns.members.push(block_id);
        }

        let params = BuildParams::default().max_rounds(2);
        let handler = Handler::new();
        run(&mut ast, &params, &handler);
        assert!(handler.has_errors());
    }

    /// EDGE CASE: a receiver-less `VariableAccess` with no reference never
    /// yields a type, so callers fall back to treating it as unknown rather
    /// than panicking.
    #[test]
    fn test_edge_unbound_variable_access_has_no_type() {
        let ast = Ast::new(Node::Expr(Expr::VariableAccess(VariableAccess {
            name: Some(Symbol::intern("x")),
            reference: None,
            token: dummy(),
        })));
        assert_eq!(crate::generics::expr_type(&ast, ast.root), None);
    }
}
