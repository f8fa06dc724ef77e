//! Declaration node variants: functions, classes (`TypeDecl`), interfaces,
//! namespaces, and the argument forms a `FunctionDecl` can declare.

use indexmap::IndexMap;

use emberc_util::Symbol;

use crate::ast::NodeId;
use emberc_util::Span;

#[derive(Debug, Clone)]
pub enum Decl {
    Function(FunctionDecl),
    Type(TypeDecl),
    Interface(InterfaceDecl),
    Namespace(NamespaceDecl),
    Argument(Argument),
    VarArg(VarArgDecl),
}

impl Decl {
    pub fn token(&self) -> Span {
        match self {
            Decl::Function(n) => n.token,
            Decl::Type(n) => n.token,
            Decl::Interface(n) => n.token,
            Decl::Namespace(n) => n.token,
            Decl::Argument(n) => n.token,
            Decl::VarArg(n) => n.token,
        }
    }

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
            Decl::Function(n) => {
                swap_vec(&mut n.args, old, new)
                    || swap_opt(&mut n.return_type, old, new)
                    || swap_opt(&mut n.owner, old, new)
                    || swap_opt(&mut n.inline_copy, old, new)
                    || swap_opt(&mut n.inferred_return_type, old, new)
                    || swap_opt(&mut n.body, old, new)
            }
            Decl::Type(n) => {
                swap_opt(&mut n.super_ref, old, new)
                    || swap_opt(&mut n.meta, old, new)
                    || swap_opt(&mut n.instance_type, old, new)
                    || n.implicit_conversions
                        .iter_mut()
                        .any(|c| swap(&mut c.f_decl, old, new))
            }
            Decl::Interface(n) => swap_vec(&mut n.methods, old, new),
            Decl::Namespace(n) => swap_vec(&mut n.members, old, new),
            Decl::Argument(n) => swap(&mut n.ty, old, new) || swap_opt(&mut n.default, old, new),
            Decl::VarArg(n) => swap_opt(&mut n.elem_type, old, new),
        }
    }
}

/// A function or method declaration. A candidate in overload resolution.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Symbol,
    pub suffix: Option<Symbol>,
    /// Declared parameters; the last entry may be a `Decl::VarArg`.
    pub args: Vec<NodeId>,
    pub return_type: Option<NodeId>,
    /// Formal generic parameter names, in declaration order.
    pub type_args: Vec<Symbol>,
    pub generic_constraints: Option<IndexMap<Symbol, NodeId>>,
    /// The enclosing `TypeDecl`, for methods; `None` for free functions.
    pub owner: Option<NodeId>,
    pub is_extern: bool,
    pub is_static: bool,
    pub is_anon: bool,
    pub do_inline: bool,
    /// A body clone reserved for the inlining rewrite; never re-resolved in place.
    pub inline_copy: Option<NodeId>,
    /// Set for anonymous closures whose return type was inferred rather than declared.
    pub inferred_return_type: Option<NodeId>,
    pub body: Option<NodeId>,
    pub token: Span,
}

impl FunctionDecl {
    pub fn new(name: Symbol, token: Span) -> Self {
        Self {
            name,
            suffix: None,
            args: Vec::new(),
            return_type: None,
            type_args: Vec::new(),
            generic_constraints: None,
            owner: None,
            is_extern: false,
            is_static: false,
            is_anon: false,
            do_inline: false,
            inline_copy: None,
            inferred_return_type: None,
            body: None,
            token,
        }
    }
}

/// A declared conversion from a `TypeDecl`'s instance type to another type,
/// consulted by §4.5 when direct scoring yields `NOLUCK_SCORE`.
#[derive(Debug, Clone)]
pub struct ImplicitConvDecl {
    pub f_decl: NodeId,
}

/// A class. Covers both the instance form and, via `meta`, the class-object
/// companion carrying static members.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: Symbol,
    pub type_args: Vec<Symbol>,
    pub super_ref: Option<NodeId>,
    /// The class-object companion. `None` on the meta itself.
    pub meta: Option<NodeId>,
    pub implicit_conversions: Vec<ImplicitConvDecl>,
    pub instance_type: Option<NodeId>,
    pub token: Span,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: Symbol,
    pub methods: Vec<NodeId>,
    pub token: Span,
}

#[derive(Debug, Clone)]
pub struct NamespaceDecl {
    pub name: Symbol,
    pub members: Vec<NodeId>,
    pub token: Span,
}

/// A formal function parameter.
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Symbol,
    pub ty: NodeId,
    /// Default-value expression; present iff this is an optional argument.
    pub default: Option<NodeId>,
    pub token: Span,
}

/// A declared parameter that swallows trailing call arguments.
#[derive(Debug, Clone)]
pub struct VarArgDecl {
    pub name: Symbol,
    pub elem_type: Option<NodeId>,
    pub token: Span,
}
