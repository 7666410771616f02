pub mod analyzer;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;

use codegen::Codegen;
use lexer::Lexer;
use parser::{Parser, TopLevel};

pub use error::{CompileError, CompileResult};

/// Compiles a whole program to Intel-syntax x86-64 assembly.
///
/// Each function is type-checked and emitted as soon as it has been parsed;
/// storage for globals is appended once the input is exhausted.
pub fn compile(user_input: &str) -> CompileResult<String> {
    let tokens = Lexer::tokenize(user_input)?;

    let mut parser = Parser::new(tokens);
    let mut codegen = Codegen::new();

    while let Some(top_level) = parser.parse_top_level()? {
        match top_level {
            TopLevel::Function(mut func) => {
                analyzer::visit_function(&mut func)?;
                codegen.gen_function(&func)?;
            }
            // Storage is written once every function has been emitted.
            TopLevel::Global(_) => (),
        }
    }

    codegen.gen_globals(parser.globals_mut());
    Ok(codegen.finish())
}
