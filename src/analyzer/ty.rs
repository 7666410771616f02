use std::fmt;
use std::rc::Rc;

pub const POINTER_SIZE: usize = 8;

/// Types are immutable once built; pointee and element types are shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Int,
    Char,
    Ptr(Rc<Type>),
    Array {
        elem: Rc<Type>,
        len: usize,
        size: usize,
    },
}

impl Type {
    pub fn pointer_to(ty: Type) -> Self {
        Type::Ptr(Rc::new(ty))
    }

    /// Returns `None` when the total size does not fit in a `usize`.
    pub fn array_of(elem: Type, len: usize) -> Option<Self> {
        let size = elem.sizeof().checked_mul(len)?;
        Some(Type::Array {
            elem: Rc::new(elem),
            len,
            size,
        })
    }

    pub fn sizeof(&self) -> usize {
        match self {
            Type::Int => 8,
            Type::Char => 1,
            Type::Ptr(_) => POINTER_SIZE,
            Type::Array { size, .. } => *size,
        }
    }

    pub fn align(&self) -> usize {
        match self {
            Type::Array { elem, .. } => elem.align(),
            t => t.sizeof(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }

    /// Pointers and arrays both have a pointee once arrays decay.
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Ptr(ty) => Some(ty),
            Type::Array { elem, .. } => Some(elem),
            _ => None,
        }
    }

    /// The pointer an array decays to; other types are returned unchanged.
    pub fn decay(&self) -> Type {
        match self {
            Type::Array { elem, .. } => Type::Ptr(Rc::clone(elem)),
            t => t.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Char => write!(f, "char"),
            Type::Ptr(ty) => write!(f, "{ty}*"),
            Type::Array { elem, len, .. } => write!(f, "{elem}[{len}]"),
        }
    }
}
