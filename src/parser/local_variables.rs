use crate::analyzer::Type;
use crate::error::{CompileError, CompileResult};

/// Locals are addressed as `[rbp-offset]` and the frame must fit a 32-bit
/// displacement. Kept a multiple of 8.
pub const MAX_FRAME_SIZE: usize = i32::MAX as usize & !7;

#[derive(Clone, Debug, PartialEq)]
pub struct LocalVar {
    pub name: String,
    pub ty: Type,
    /// Distance below the frame base.
    pub offset: usize,
}

#[derive(Debug, Default)]
pub struct LocalVariables {
    locals: Vec<LocalVar>,
    last_offset: usize,
}

impl LocalVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_last_offset(&self) -> usize {
        self.last_offset
    }

    pub fn get(&self, id: usize) -> &LocalVar {
        &self.locals[id]
    }

    /// Reserves a slot below the previous one. `loc` is the source offset of
    /// the declared name, used for diagnostics.
    pub fn declare(&mut self, name: &str, ty: Type, loc: usize) -> CompileResult<usize> {
        if self.find(name).is_some() {
            return Err(CompileError::at(loc, format!("redeclaration of '{name}'")));
        }

        let end = self
            .last_offset
            .checked_add(ty.sizeof())
            .filter(|&end| end <= MAX_FRAME_SIZE)
            .ok_or_else(|| {
                CompileError::at(loc, format!("stack frame is too large for '{name}'"))
            })?;
        self.last_offset = align_to(end, ty.align());
        self.locals.push(LocalVar {
            name: name.to_string(),
            ty,
            offset: self.last_offset,
        });
        Ok(self.locals.len() - 1)
    }

    /// Newest declaration first.
    pub fn find(&self, name: &str) -> Option<&LocalVar> {
        self.locals.iter().rev().find(|v| v.name == name)
    }
}

pub fn align_to(n: usize, align: usize) -> usize {
    (n + align - 1) / align * align
}
