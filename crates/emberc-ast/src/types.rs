//! Type node variants.
//!
//! `BaseType` is a named type with optional ordered `typeArgs`; `SugarType`
//! wraps an inner type (pointer, reference, array); `FuncType` and
//! `TypeList` support function values and multi-return respectively;
//! `AnonymousStructType` is synthesized by the varargs-boxing rewrite.

use emberc_util::Symbol;

use crate::ast::NodeId;
use emberc_util::Span;

#[derive(Debug, Clone)]
pub enum TypeExpr {
    Base(BaseType),
    Sugar(SugarType),
    Func(FuncType),
    List(TypeList),
    AnonStruct(AnonymousStructType),
}

impl TypeExpr {
    pub fn token(&self) -> Span {
        match self {
            TypeExpr::Base(n) => n.token,
            TypeExpr::Sugar(n) => n.token,
            TypeExpr::Func(n) => n.token,
            TypeExpr::List(n) => n.token,
            TypeExpr::AnonStruct(n) => n.token,
        }
    }

    pub fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
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
            TypeExpr::Base(n) => swap_vec(&mut n.type_args, old, new),
            TypeExpr::Sugar(n) => {
                if n.inner == old {
                    n.inner = new;
                    true
                } else {
                    false
                }
            }
            TypeExpr::Func(n) => {
                swap_vec(&mut n.params, old, new) || swap_opt(&mut n.return_type, old, new)
            }
            TypeExpr::List(n) => swap_vec(&mut n.items, old, new),
            TypeExpr::AnonStruct(n) => n.fields.iter_mut().any(|f| {
                if f.type_access == old {
                    f.type_access = new;
                    true
                } else if f.field_type == old {
                    f.field_type = new;
                    true
                } else {
                    false
                }
            }),
        }
    }

    /// Returns the bare type-parameter name if this is a single named
    /// reference with no further structure, e.g. `T` on its own.
    pub fn as_bare_name(&self) -> Option<Symbol> {
        match self {
            TypeExpr::Base(b) if b.type_args.is_empty() => Some(b.name),
            _ => None,
        }
    }
}

/// A named type, optionally parameterized (`List<Int>`, `String`, `Url`).
#[derive(Debug, Clone)]
pub struct BaseType {
    pub name: Symbol,
    pub type_args: Vec<NodeId>,
    pub token: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SugarKind {
    Pointer,
    Reference,
    Array,
}

/// Wraps an inner type: `T*`, `T&`, `T[]`. Transparent when scoring a
/// reference against its pointee on the decl side (§4.5).
#[derive(Debug, Clone)]
pub struct SugarType {
    pub kind: SugarKind,
    pub inner: NodeId,
    pub token: Span,
}

#[derive(Debug, Clone)]
pub struct FuncType {
    pub params: Vec<NodeId>,
    pub return_type: Option<NodeId>,
    pub token: Span,
}

/// Multi-return type, e.g. the declared return of a function with out-params.
#[derive(Debug, Clone)]
pub struct TypeList {
    pub items: Vec<NodeId>,
    pub token: Span,
}

/// One `(TypeAccess(argType), argType)` pair in a synthesized anonymous
/// struct, as produced by the varargs-boxing rewrite (§4.8 step 4).
#[derive(Debug, Clone)]
pub struct AnonStructField {
    pub type_access: NodeId,
    pub field_type: NodeId,
}

/// Synthesized by `handleVarargs`: a struct type whose `fields` alternate
/// `(TypeAccess-type, arg-type)` pairs, one per boxed variadic argument.
#[derive(Debug, Clone)]
pub struct AnonymousStructType {
    pub fields: Vec<AnonStructField>,
    pub token: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy() -> Span {
        Span::DUMMY
    }

    #[test]
    fn bare_name_detects_unparameterized_base_type() {
        let t = TypeExpr::Base(BaseType {
            name: Symbol::intern("Int"),
            type_args: Vec::new(),
            token: dummy(),
        });
        assert_eq!(t.as_bare_name(), Some(Symbol::intern("Int")));
    }

    #[test]
    fn parameterized_base_type_is_not_bare() {
        use emberc_util::Idx;
        let t = TypeExpr::Base(BaseType {
            name: Symbol::intern("List"),
            type_args: vec![crate::ast::NodeId::from_usize(0)],
            token: dummy(),
        });
        assert_eq!(t.as_bare_name(), None);
    }

    #[test]
    fn anon_struct_fields_are_pairs() {
        use emberc_util::Idx;
        let s = AnonymousStructType {
            fields: vec![AnonStructField {
                type_access: crate::ast::NodeId::from_usize(0),
                field_type: crate::ast::NodeId::from_usize(1),
            }],
            token: dummy(),
        };
        assert_eq!(s.fields.len(), 1);
    }
}
