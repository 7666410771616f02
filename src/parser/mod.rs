mod ast;
mod global_variables;
mod local_variables;
mod parser;

pub use ast::*;
pub use global_variables::*;
pub use local_variables::*;
pub use parser::*;
