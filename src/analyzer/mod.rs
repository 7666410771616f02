mod ty;
mod type_visitor;

pub use ty::*;
pub use type_visitor::*;
