//! emberc-resolve - iterative fixed-point AST resolver
//!
//! Name resolution, type inference, overload resolution (with generics,
//! optional arguments, varargs, and interface coercions), and the call-site
//! AST rewrites that prepare a tree for code generation. Runs to a fixed
//! point over a mutable `emberc_ast::Ast`; see `driver::run`.

pub mod driver;
pub mod errors;
pub mod generics;
pub mod names;
pub mod overload;
pub mod response;
pub mod rewrites;
pub mod scoring;
pub mod trail;

#[cfg(test)]
mod edge_cases;

pub use driver::{run, BuildParams};
pub use errors::ResolverBug;
pub use generics::TypeArgResolution;
pub use response::Response;
pub use trail::Trail;
