use crate::analyzer::Type;
use crate::error::{CompileError, CompileResult};

use super::LocalVariables;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    /// pointer + integer, the integer scaled by the pointee size
    PtrAdd,
    /// pointer - integer, the integer scaled by the pointee size
    PtrSub,
    /// pointer - pointer, the byte distance divided by the pointee size
    PtrDiff,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Num(i64),
    LocalVar { offset: usize },
    GlobalVar { name: String },
    Assign { lhs: Box<Node>, rhs: Box<Node> },
    Addr(Box<Node>),
    Deref(Box<Node>),
    Binary {
        op: BinOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Call { name: String, args: Vec<Node> },
}

/// An expression. `offset` points at the token the node was built from and
/// anchors diagnostics; `ty` is filled in by the type analyzer.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub ty: Option<Type>,
    pub offset: usize,
}

impl Node {
    pub fn new(kind: NodeKind, offset: usize) -> Self {
        Self {
            kind,
            ty: None,
            offset,
        }
    }

    pub fn new_num(value: i64, offset: usize) -> Self {
        Self {
            kind: NodeKind::Num(value),
            ty: Some(Type::Int),
            offset,
        }
    }

    pub fn new_binary(op: BinOp, lhs: Node, rhs: Node, offset: usize) -> Self {
        Self::new(
            NodeKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            offset,
        )
    }

    pub fn ty(&self) -> CompileResult<&Type> {
        self.ty
            .as_ref()
            .ok_or_else(|| CompileError::internal(format!("untyped expression: {:?}", self.kind)))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// A declaration without initializer, or an empty statement.
    Null,
    Expr(Node),
    Return(Node),
    Block(Vec<Stmt>),
    If {
        cond: Node,
        then: Box<Stmt>,
        els: Option<Box<Stmt>>,
    },
    While {
        cond: Node,
        body: Box<Stmt>,
    },
    For {
        init: Option<Node>,
        cond: Option<Node>,
        inc: Option<Node>,
        body: Box<Stmt>,
    },
}

#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub return_ty: Type,
    /// Indices into `locals`, in declaration order.
    pub params: Vec<usize>,
    pub body: Vec<Stmt>,
    pub locals: LocalVariables,
    pub frame_size: usize,
}

#[derive(Debug)]
pub enum TopLevel {
    Function(Function),
    /// Index into the parser's global table.
    Global(usize),
}
